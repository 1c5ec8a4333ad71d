//! `<ack/>` / `<nack/>`

/// Positive or negative acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Ack,
    Nack,
}

/// Recognise a buffer that trims to exactly `<ack/>` or `<nack/>`.
pub fn parse_acknowledgement(input: &str) -> Option<Acknowledgement> {
    match input.trim() {
        "<ack/>" => Some(Acknowledgement::Ack),
        "<nack/>" => Some(Acknowledgement::Nack),
        _ => None,
    }
}
