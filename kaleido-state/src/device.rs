//! Derived device state
//!
//! [`DeviceState`] is the typed face of a [`StateStore`]: the session writes reply outcomes into it and every other
//! layer reads from it. Values persist across reconnects until overwritten.

use kaleido_api::{Layout, Room, Scope};
use tracing::debug;

use crate::iter::ChangeIterator;
use crate::property::{CurrentLayout, LayoutList, Property, RoomList, SoftwareVersion, SystemName};
use crate::snapshot::{CurrentLayouts, DeviceSnapshot};
use crate::store::StateStore;

/// Placeholder reported for a scope whose current layout is not known yet
pub const UNKNOWN_LAYOUT: &str = "unknown";

/// Shared handle to everything the device has reported
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    store: StateStore,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying store, for generic property access and watching
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn software_version(&self) -> Option<String> {
        self.store.get::<SoftwareVersion>(&Scope::Root).map(|v| v.0)
    }

    pub fn system_name(&self) -> Option<String> {
        self.store.get::<SystemName>(&Scope::Root).map(|v| v.0)
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.store
            .get::<RoomList>(&Scope::Root)
            .map(|v| v.0)
            .unwrap_or_default()
    }

    pub fn layouts(&self) -> Vec<Layout> {
        self.store
            .get::<LayoutList>(&Scope::Root)
            .map(|v| v.0)
            .unwrap_or_default()
    }

    /// Current layout of `scope`, if one has been reported
    pub fn known_current_layout(&self, scope: &Scope) -> Option<String> {
        self.store.get::<CurrentLayout>(scope).map(|v| v.0)
    }

    /// Current layout of `scope`, or `"unknown"`
    pub fn current_layout(&self, scope: &Scope) -> String {
        self.known_current_layout(scope)
            .unwrap_or_else(|| UNKNOWN_LAYOUT.to_string())
    }

    pub fn set_software_version(&self, version: impl Into<String>) -> bool {
        self.set(&Scope::Root, SoftwareVersion(version.into()))
    }

    pub fn set_system_name(&self, name: impl Into<String>) -> bool {
        self.set(&Scope::Root, SystemName(name.into()))
    }

    pub fn set_rooms(&self, rooms: Vec<Room>) -> bool {
        self.set(&Scope::Root, RoomList(rooms))
    }

    pub fn set_layouts(&self, layouts: Vec<Layout>) -> bool {
        self.set(&Scope::Root, LayoutList(layouts))
    }

    pub fn set_current_layout(&self, scope: &Scope, layout: impl Into<String>) -> bool {
        self.set(scope, CurrentLayout(layout.into()))
    }

    /// Empty the room list (a root-only device rejects the room query)
    pub fn clear_rooms(&self) -> bool {
        self.set(&Scope::Root, RoomList::default())
    }

    pub fn clear_layouts(&self) -> bool {
        self.set(&Scope::Root, LayoutList::default())
    }

    /// Watch one property on every scope
    pub fn watch<P: Property>(&self) {
        self.store.watch::<P>();
    }

    pub fn iter(&self) -> ChangeIterator {
        self.store.iter()
    }

    /// Point-in-time copy of every value
    pub fn snapshot(&self) -> DeviceSnapshot {
        let mut current = CurrentLayouts::default();
        for (scope, layout) in self.store.entries::<CurrentLayout>() {
            match scope {
                Scope::Root => current.root = Some(layout.0),
                Scope::Room(room) => {
                    current.rooms.insert(room, layout.0);
                }
            }
        }

        DeviceSnapshot {
            software_version: self.software_version(),
            system_name: self.system_name(),
            rooms: self.rooms(),
            layouts: self.layouts(),
            current_layouts: current,
        }
    }

    fn set<P: Property + std::fmt::Debug>(&self, scope: &Scope, value: P) -> bool {
        let changed = self.store.set(scope, value.clone());
        if changed {
            debug!(scope = %scope, property = P::KEY, value = ?value, "Device state changed");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaleido_api::RoomId;

    #[test]
    fn test_empty_state() {
        let state = DeviceState::new();
        assert_eq!(state.software_version(), None);
        assert!(state.rooms().is_empty());
        assert!(state.layouts().is_empty());
        assert_eq!(state.current_layout(&Scope::Root), "unknown");
        assert_eq!(state.known_current_layout(&Scope::Root), None);
    }

    #[test]
    fn test_root_only_and_rooms_are_both_valid() {
        let state = DeviceState::new();
        state.set_current_layout(&Scope::Root, "Main.kg2");
        state.clear_rooms();
        assert!(state.rooms().is_empty());
        assert_eq!(state.current_layout(&Scope::Root), "Main.kg2");

        let a = Scope::Room(RoomId::new("A"));
        state.set_rooms(vec![Room::new("A"), Room::new("B")]);
        state.set_current_layout(&a, "Quad.kg2");
        assert_eq!(state.current_layout(&a), "Quad.kg2");
        assert_eq!(state.current_layout(&Scope::Room(RoomId::new("B"))), "unknown");
        assert_eq!(state.current_layout(&Scope::Root), "Main.kg2");
    }

    #[test]
    fn test_clear_lists() {
        let state = DeviceState::new();
        state.set_layouts(vec![Layout::new("A.kg2", "A")]);
        assert!(state.clear_layouts());
        assert!(state.layouts().is_empty());
        assert!(!state.clear_layouts());
    }

    #[test]
    fn test_watch_reports_changes() {
        let state = DeviceState::new();
        state.watch::<CurrentLayout>();
        state.set_current_layout(&Scope::Root, "A");
        state.set_current_layout(&Scope::Root, "A");
        state.set_system_name("unwatched");
        let events: Vec<_> = state.iter().try_iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].scope, Scope::Root);
    }

    #[test]
    fn test_snapshot() {
        let state = DeviceState::new();
        state.set_software_version("8.40");
        state.set_system_name("Cougar");
        state.set_current_layout(&Scope::Root, "Main.kg2");
        state.set_current_layout(&Scope::Room(RoomId::new("A")), "Quad.kg2");

        let snapshot = state.snapshot();
        assert_eq!(snapshot.software_version.as_deref(), Some("8.40"));
        assert_eq!(snapshot.current_layouts.root.as_deref(), Some("Main.kg2"));
        assert_eq!(
            snapshot.current_layouts.rooms.get(&RoomId::new("A")).map(String::as_str),
            Some("Quad.kg2")
        );
    }
}
