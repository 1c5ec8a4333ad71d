//! Reply parsers, one per reply shape.
//!
//! Each entry point takes the whole working buffer, frames the first reply in
//! it and decodes that reply for one command family. `<nack/>` and `<ack/>`
//! are always recognised first, so a rejected query never reaches the payload
//! decoder.

pub mod ack;
pub mod current_layout;
pub mod key_value;
pub mod layout_list;
pub mod room_list;

use crate::error::{ParseError, ParseResult};
use crate::framing::{next_frame, Frame};
use crate::outcome::{Reply, ReplyOutcome};

use ack::{parse_acknowledgement, Acknowledgement};
use key_value::KeyValue;
use layout_list::LayoutEntry;

const PARAMETER_ELEMENT: &str = "kParameterInfo";

/// Frame the buffer and decode the first reply with `decode`.
pub fn classify<T>(buffer: &str, decode: impl FnOnce(&str) -> ParseResult<T>) -> ReplyOutcome<T> {
    match next_frame(buffer) {
        Frame::Incomplete => ReplyOutcome::Incomplete,
        Frame::Invalid { reason, consumed } => ReplyOutcome::Malformed { reason, consumed },
        Frame::Complete { element, consumed } => match parse_acknowledgement(element) {
            Some(Acknowledgement::Nack) => ReplyOutcome::Parsed {
                reply: Reply::Nack,
                consumed,
            },
            Some(Acknowledgement::Ack) => ReplyOutcome::Parsed {
                reply: Reply::Ack,
                consumed,
            },
            None => match decode(element) {
                Ok(value) => ReplyOutcome::Parsed {
                    reply: Reply::Payload(value),
                    consumed,
                },
                Err(e) => ReplyOutcome::Malformed {
                    reason: e.to_string(),
                    consumed,
                },
            },
        },
    }
}

/// Replies to session and mutation commands: only `<ack/>`/`<nack/>` are valid.
pub fn acknowledgement(buffer: &str) -> ReplyOutcome<()> {
    classify(buffer, |element| {
        Err(ParseError::MalformedBody(format!(
            "expected <ack/> or <nack/>, got {}",
            element
        )))
    })
}

/// Replies to `<getParameterInfo>`: `<kParameterInfo>KEY="VALUE"</kParameterInfo>`.
pub fn parameter(buffer: &str) -> ReplyOutcome<KeyValue> {
    classify(buffer, |element| {
        key_value::parse_key_value_reply(element, PARAMETER_ELEMENT)
            .ok_or_else(|| ParseError::MalformedBody(format!("not a key/value reply: {}", element)))
    })
}

/// Replies to `<getKCurrentLayout/>`, bare or `name="..."`.
pub fn current_layout(buffer: &str) -> ReplyOutcome<String> {
    classify(buffer, current_layout::parse_current_layout)
}

/// Replies to `<getKLayoutList/>` in any of the known firmware encodings.
pub fn layout_list(buffer: &str) -> ReplyOutcome<Vec<LayoutEntry>> {
    classify(buffer, layout_list::parse_layout_list)
}

/// Replies to `<getKRoomList/>`.
pub fn room_list(buffer: &str) -> ReplyOutcome<Vec<String>> {
    classify(buffer, room_list::parse_room_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nack_checked_before_payload() {
        assert_eq!(
            parameter("<nack/>"),
            ReplyOutcome::Parsed {
                reply: Reply::Nack,
                consumed: 7
            }
        );
        assert_eq!(layout_list("<nack/>\n").reply(), Some(&Reply::Nack));
    }

    #[test]
    fn test_acknowledgement_rejects_payload() {
        let outcome = acknowledgement("<kCurrentLayout>x</kCurrentLayout>");
        assert!(outcome.is_malformed());
        assert_eq!(outcome.consumed(), "<kCurrentLayout>x</kCurrentLayout>".len());
    }

    #[test]
    fn test_parameter_malformed_when_complete() {
        // Complete element but unterminated quote in the body.
        let outcome = parameter(r#"<kParameterInfo>foo="bar</kParameterInfo>"#);
        assert!(outcome.is_malformed());
    }

    #[test]
    fn test_payload_under_wrong_name_is_malformed() {
        assert!(parameter(r#"<kCurrentLayout>name="x"</kCurrentLayout>"#).is_malformed());
        assert!(current_layout(r#"<kParameterInfo>name="x"</kParameterInfo>"#).is_malformed());
        assert!(layout_list("<kRoomList></kRoomList>").is_malformed());
        assert!(room_list("<kLayoutList/>").is_malformed());
    }

    #[test]
    fn test_parameter_incomplete_without_closing_bracket() {
        let outcome = parameter(r#"<kParameterInfo>foo="bar"</kParameterInfo"#);
        assert!(outcome.is_incomplete());
    }
}
