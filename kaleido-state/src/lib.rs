//! Derived state for Kaleido multiviewers
//!
//! Holds the facts the device reports (software version, system name,
//! rooms, layouts, current layout per scope) with change detection and
//! blocking iteration over changes.
//!
//! ```rust
//! use kaleido_api::{RoomId, Scope};
//! use kaleido_state::{CurrentLayout, DeviceState};
//!
//! let state = DeviceState::new();
//! state.watch::<CurrentLayout>();
//!
//! let room = Scope::Room(RoomId::new("ROOM1"));
//! state.set_current_layout(&room, "Quad.kg2");
//!
//! assert_eq!(state.current_layout(&room), "Quad.kg2");
//! assert_eq!(state.current_layout(&Scope::Root), "unknown");
//!
//! let event = state.iter().try_recv().unwrap();
//! assert_eq!(event.scope, room);
//! assert!(event.is::<CurrentLayout>());
//! ```
//!
//! # Architecture
//!
//! ```text
//! DeviceState
//!     │
//!     └── StateStore
//!             ├── values:    (Scope, property type) -> value
//!             ├── interests: property everywhere | property on one scope
//!             └── mpsc channel ──► ChangeIterator
//! ```

pub mod device;
pub mod event;
pub mod iter;
pub mod property;
pub mod snapshot;
pub mod store;

pub use device::{DeviceState, UNKNOWN_LAYOUT};
pub use event::ChangeEvent;
pub use iter::ChangeIterator;
pub use property::{CurrentLayout, LayoutList, Property, RoomList, SoftwareVersion, SystemName};
pub use snapshot::{CurrentLayouts, DeviceSnapshot};
pub use store::StateStore;
