//! Command queue, reply dispatch and TCP driver for Kaleido multiviewers
//!
//! The device answers one request at a time with no request identifiers, so
//! a [`Session`] keeps a strict FIFO of commands with only the head in
//! flight, reassembles replies in a working buffer, parses them against the
//! head's [`CommandKind`](kaleido_api::CommandKind) and writes the results
//! into a shared [`DeviceState`](kaleido_state::DeviceState).
//!
//! [`Session`] is sans-IO and can be driven by hand:
//!
//! ```rust
//! use kaleido_api::{Command, Scope};
//! use kaleido_session::{Outbox, Session, SessionConfig};
//! use kaleido_state::DeviceState;
//!
//! let mut outbox = Outbox::new();
//! outbox.set_connected(true);
//! let mut session = Session::new(SessionConfig::new("10.0.0.5"), outbox, DeviceState::new());
//!
//! session.enqueue(Command::get_current_layout());
//! assert_eq!(session.transport_mut().take(), vec!["<getKCurrentLayout/>\n"]);
//!
//! session.on_data(br#"<kCurrentLayout>name="Main.kg2"</kCurrentLayout>"#);
//! assert_eq!(session.state().current_layout(&Scope::Root), "Main.kg2");
//! assert_eq!(session.queue_len(), 0);
//! ```
//!
//! [`KaleidoClient`] runs a session over TCP on the tokio runtime.

pub mod buffer;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod queue;
pub mod session;
pub mod transport;

pub use client::KaleidoClient;
pub use config::{ClientConfig, SessionConfig};
pub use error::{Result, SessionError};
pub use event::{DeviceStatus, SessionEvent};
pub use session::Session;
pub use transport::{Outbox, Transport};
