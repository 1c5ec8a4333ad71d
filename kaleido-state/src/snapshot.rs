//! Serializable snapshot of derived device state

use std::collections::BTreeMap;

use kaleido_api::{Layout, Room, RoomId, Scope};
use serde::Serialize;

use crate::device::UNKNOWN_LAYOUT;

/// Current layout per scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrentLayouts {
    pub root: Option<String>,
    pub rooms: BTreeMap<RoomId, String>,
}

/// Every value the device has reported, detached from the live store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub software_version: Option<String>,
    pub system_name: Option<String>,
    pub rooms: Vec<Room>,
    pub layouts: Vec<Layout>,
    pub current_layouts: CurrentLayouts,
}

impl DeviceSnapshot {
    /// Current layout of `scope`, or `"unknown"`
    pub fn current_layout(&self, scope: &Scope) -> &str {
        let known = match scope {
            Scope::Root => self.current_layouts.root.as_deref(),
            Scope::Room(room) => self.current_layouts.rooms.get(room).map(String::as_str),
        };
        known.unwrap_or(UNKNOWN_LAYOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_json() {
        let mut snapshot = DeviceSnapshot {
            software_version: Some("8.40".to_string()),
            system_name: None,
            rooms: vec![Room::new("A")],
            layouts: vec![Layout::new("A/Quad.kg2", "Quad")],
            current_layouts: CurrentLayouts::default(),
        };
        snapshot
            .current_layouts
            .rooms
            .insert(RoomId::new("A"), "Quad.kg2".to_string());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["software_version"], "8.40");
        assert!(json["system_name"].is_null());
        assert_eq!(json["rooms"][0]["id"], "A");
        assert_eq!(json["layouts"][0]["label"], "Quad");
        assert_eq!(json["current_layouts"]["rooms"]["A"], "Quad.kg2");
    }

    #[test]
    fn test_current_layout_fallback() {
        let snapshot = DeviceSnapshot::default();
        assert_eq!(snapshot.current_layout(&Scope::Root), "unknown");
    }
}
