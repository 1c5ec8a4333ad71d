//! Reply framing for the working buffer.
//!
//! The protocol has no length prefix and no terminator, so a reply is
//! considered finished once it forms one balanced top-level element. Two
//! layers decide that:
//!
//! - [`may_be_complete`] is the cheap gate the device protocol itself relies
//!   on: a reply cannot be complete before a `/` has arrived (every closing
//!   tag and every self-closed tag carries one).
//! - [`next_frame`] walks the buffer with `quick-xml` and returns the byte
//!   range of the first balanced element.
//!
//! Swapping the gate for a real terminator or length-based framer only means
//! replacing these two functions; the reply parsers only ever see one
//! complete element.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Heuristic end-of-reply gate: a reply cannot be complete without a `/`.
pub fn may_be_complete(buffer: &str) -> bool {
    buffer.contains('/')
}

/// Result of looking for one complete reply at the front of the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    /// More bytes are needed before the first reply is balanced
    Incomplete,

    /// One complete top-level element
    Complete {
        /// The element text, leading whitespace removed
        element: &'a str,
        /// Bytes of the buffer this frame accounts for, leading whitespace included
        consumed: usize,
    },

    /// The front of the buffer can never become a valid reply
    Invalid {
        /// Human-readable description for logs
        reason: String,
        /// Bytes that should be discarded
        consumed: usize,
    },
}

/// Find the first complete top-level element in `buffer`.
pub fn next_frame(buffer: &str) -> Frame<'_> {
    let Some(start) = buffer.find(|c: char| !c.is_whitespace()) else {
        return Frame::Incomplete;
    };
    let rest = &buffer[start..];

    if !rest.starts_with('<') {
        let junk = rest.find('<').unwrap_or(rest.len());
        return Frame::Invalid {
            reason: format!("unexpected text outside of a reply: {:?}", &rest[..junk]),
            consumed: start + junk,
        };
    }

    if !may_be_complete(rest) {
        return Frame::Incomplete;
    }

    let mut reader = Reader::from_str(rest);
    let mut open: Vec<Vec<u8>> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => open.push(tag.name().as_ref().to_vec()),
            Ok(Event::End(tag)) => {
                let position = reader.buffer_position();
                if !rest[..position].ends_with('>') {
                    return Frame::Incomplete;
                }
                match open.pop() {
                    Some(name) if name == tag.name().as_ref() => {
                        if open.is_empty() {
                            return Frame::Complete {
                                element: &rest[..position],
                                consumed: start + position,
                            };
                        }
                    }
                    Some(name) => {
                        return Frame::Invalid {
                            reason: format!(
                                "closing tag </{}> does not match <{}>",
                                String::from_utf8_lossy(tag.name().as_ref()),
                                String::from_utf8_lossy(&name)
                            ),
                            consumed: start + position,
                        };
                    }
                    None => {
                        return Frame::Invalid {
                            reason: format!(
                                "closing tag </{}> without an opening tag",
                                String::from_utf8_lossy(tag.name().as_ref())
                            ),
                            consumed: start + position,
                        };
                    }
                }
            }
            Ok(Event::Empty(_)) if open.is_empty() => {
                let position = reader.buffer_position();
                if !rest[..position].ends_with('>') {
                    return Frame::Incomplete;
                }
                return Frame::Complete {
                    element: &rest[..position],
                    consumed: start + position,
                };
            }
            Ok(Event::Eof) => return Frame::Incomplete,
            Ok(_) => {}
            Err(err) => {
                // A tag cut in half by the transport reads as a mismatch or
                // an early EOF. Only errors followed by a finished tag are real.
                let position = reader.buffer_position();
                if ends_inside_tag(rest, position) {
                    return Frame::Incomplete;
                }
                return Frame::Invalid {
                    reason: err.to_string(),
                    consumed: start + position.max(1),
                };
            }
        }
    }
}

/// True when the error at `position` is the last tag of the buffer, still
/// waiting for its `>`
fn ends_inside_tag(rest: &str, position: usize) -> bool {
    let Some(last) = rest.rfind('<') else {
        return false;
    };
    rest.get(position.min(last)..)
        .is_some_and(|tail| !tail.contains('>'))
}
