//! Rooms, layouts and the device's navigation context

use std::fmt;

use kaleido_parser::replies::layout_list::split_room;
use kaleido_parser::LayoutEntry;
use serde::Serialize;

/// Suffix the device expects after the host when reopening the root context
pub const ROOT_SUFFIX: &str = "_0_4_0_0";

/// Device-native room identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A room reported by `<kRoomList>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub label: String,
}

impl Room {
    /// Rooms carry no separate display name on the wire, so the label is the id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id: RoomId(id),
        }
    }
}

/// A recallable layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Device-native name, possibly `room/name.ext`
    pub id: String,
    pub label: String,
}

impl Layout {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Room this layout belongs to, if the id carries a `room/` prefix
    pub fn room(&self) -> Option<RoomId> {
        split_room(&self.id).0.map(RoomId::new)
    }

    /// The id without its room prefix
    pub fn name(&self) -> &str {
        split_room(&self.id).1
    }

    /// Scope whose current layout this layout replaces when recalled
    pub fn scope(&self) -> Scope {
        self.room().map(Scope::Room).unwrap_or(Scope::Root)
    }
}

impl From<LayoutEntry> for Layout {
    fn from(entry: LayoutEntry) -> Self {
        Self {
            id: entry.id,
            label: entry.label,
        }
    }
}

/// Entity a current-layout value belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The device as a whole
    Root,
    Room(RoomId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Root => f.write_str("root"),
            Scope::Room(room) => write!(f, "room {}", room),
        }
    }
}

/// Where the device's protocol session currently points.
///
/// Queries are answered relative to this context, so the session tracks it
/// and only changes it when the device acknowledges an open or close.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    #[default]
    Root,
    InRoom(RoomId),
    /// The root context was closed; only a host-level open leaves this state
    Closed,
}

impl Context {
    /// Scope that query replies received in this context belong to
    pub fn scope(&self) -> Option<Scope> {
        match self {
            Context::Root => Some(Scope::Root),
            Context::InRoom(room) => Some(Scope::Room(room.clone())),
            Context::Closed => None,
        }
    }

    /// Context after the device acknowledged opening `scope`
    pub fn opened(&self, scope: &Scope) -> Context {
        match scope {
            Scope::Root => Context::Root,
            Scope::Room(room) => Context::InRoom(room.clone()),
        }
    }

    /// Context after the device acknowledged a close.
    ///
    /// Closing a room returns to the root; closing the root leaves nothing open.
    pub fn closed(&self) -> Context {
        match self {
            Context::InRoom(_) => Context::Root,
            Context::Root | Context::Closed => Context::Closed,
        }
    }
}
