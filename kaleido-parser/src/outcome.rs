//! Outcome of classifying the working buffer against the command in flight

/// What the device said, once a complete reply is available
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// `<ack/>`
    Ack,
    /// `<nack/>`
    Nack,
    /// A tag-wrapped payload decoded into `T`
    Payload(T),
}

impl<T> Reply<T> {
    /// Whether the device rejected the command
    pub fn is_nack(&self) -> bool {
        matches!(self, Reply::Nack)
    }

    /// Map the payload, keeping acknowledgements as they are
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Ack => Reply::Ack,
            Reply::Nack => Reply::Nack,
            Reply::Payload(value) => Reply::Payload(f(value)),
        }
    }
}

/// Result of one parse attempt over the working buffer.
///
/// `Incomplete` means the buffer must be kept and retried when more bytes
/// arrive. Both other variants carry the number of bytes the session should
/// drop from the front of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome<T> {
    Incomplete,
    Parsed { reply: Reply<T>, consumed: usize },
    Malformed { reason: String, consumed: usize },
}

impl<T> ReplyOutcome<T> {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ReplyOutcome::Incomplete)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ReplyOutcome::Malformed { .. })
    }

    /// The parsed reply, if there is one
    pub fn reply(&self) -> Option<&Reply<T>> {
        match self {
            ReplyOutcome::Parsed { reply, .. } => Some(reply),
            _ => None,
        }
    }

    /// Bytes to discard from the working buffer; zero while incomplete
    pub fn consumed(&self) -> usize {
        match self {
            ReplyOutcome::Incomplete => 0,
            ReplyOutcome::Parsed { consumed, .. } | ReplyOutcome::Malformed { consumed, .. } => *consumed,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReplyOutcome<U> {
        match self {
            ReplyOutcome::Incomplete => ReplyOutcome::Incomplete,
            ReplyOutcome::Parsed { reply, consumed } => ReplyOutcome::Parsed {
                reply: reply.map(f),
                consumed,
            },
            ReplyOutcome::Malformed { reason, consumed } => ReplyOutcome::Malformed { reason, consumed },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_acknowledgements() {
        let reply: Reply<u8> = Reply::Nack;
        assert_eq!(reply.map(|v| v + 1), Reply::Nack);

        let reply = Reply::Payload(1u8);
        assert_eq!(reply.map(|v| v + 1), Reply::Payload(2));
    }

    #[test]
    fn test_consumed() {
        let outcome: ReplyOutcome<()> = ReplyOutcome::Incomplete;
        assert_eq!(outcome.consumed(), 0);

        let outcome: ReplyOutcome<()> = ReplyOutcome::Malformed {
            reason: "bad".to_string(),
            consumed: 12,
        };
        assert_eq!(outcome.consumed(), 12);
        assert!(outcome.is_malformed());
    }
}
