//! # kaleido-parser
//!
//! Framing and parsing for the replies a Kaleido multiviewer writes back over
//! its telnet-style control session. The device has no length prefixes and
//! no request identifiers, so this crate answers two questions for whoever
//! owns the session:
//!
//! 1. Is there a complete reply in the bytes received so far? ([`framing`])
//! 2. What does that reply say, given the kind of command that is waiting
//!    for it? ([`replies`])
//!
//! Every parser is a pure function over `&str`.
//!
//! ## Usage
//!
//! ```rust
//! use kaleido_parser::{replies, Reply, ReplyOutcome};
//!
//! let outcome = replies::layout_list("<kLayoutList>Layout1.kg2 Layout2.kg2</kLayoutList>");
//! match outcome {
//!     ReplyOutcome::Parsed { reply: Reply::Payload(layouts), .. } => {
//!         assert_eq!(layouts[0].label, "Layout1");
//!     }
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//!
//! // A fragment is reported as incomplete, never as an empty list.
//! assert!(replies::layout_list("<kLayoutList>Layout1.kg2").is_incomplete());
//! ```

pub mod common;
pub mod error;
pub mod framing;
pub mod outcome;
pub mod replies;

// Re-export error types for convenient top-level access
pub use error::{ParseError, ParseResult};

pub use framing::{may_be_complete, next_frame, Frame};
pub use outcome::{Reply, ReplyOutcome};
pub use replies::ack::Acknowledgement;
pub use replies::key_value::KeyValue;
pub use replies::layout_list::{LayoutEntry, LayoutListFormat};
