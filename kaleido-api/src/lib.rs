//! Typed commands and the data model for Kaleido multiviewer control
//!
//! The device speaks a line-oriented pseudo-XML protocol. This crate turns
//! intents into the exact request text the device expects and tags every
//! request with a [`CommandKind`] once, at construction, so the session can
//! dispatch replies with a `match` instead of re-inspecting strings.
//!
//! ```rust
//! use kaleido_api::{Command, CommandKind, StatusLevel, TallyColor};
//!
//! let recall = Command::set_layout("ROOM1/Layout1.kg2")?;
//! assert!(recall.room_qualified().is_some());
//!
//! let tally = Command::tally(TallyColor::Red, true);
//! assert_eq!(tally.text(), r#"<setKStatusMessage>set id="1" status="MINOR"</setKStatusMessage>"#);
//!
//! let raw = Command::raw("<getKRoomList/>");
//! assert_eq!(raw.kind(), &CommandKind::GetRoomList);
//! # let _ = StatusLevel::Normal;
//! # Ok::<(), kaleido_api::ApiError>(())
//! ```

pub mod command;
pub mod error;
pub mod model;
pub mod status;

pub use command::{Command, CommandKind, Parameter};
pub use error::{ApiError, Result};
pub use model::{Context, Layout, Room, RoomId, Scope};
pub use status::{StatusLevel, TallyColor};

/// TCP port the device listens on for the control protocol
pub const DEFAULT_PORT: u16 = 13000;
