//! Consumers on other threads observe state written by the session thread

use std::thread;
use std::time::Duration;

use kaleido_api::{Layout, Room, RoomId, Scope};
use kaleido_state::{CurrentLayout, DeviceState, LayoutList, Property, RoomList};

#[test]
fn test_blocking_consumer_sees_room_discovery() {
    let state = DeviceState::new();
    state.watch::<RoomList>();
    state.watch::<CurrentLayout>();

    let writer = state.clone();
    let handle = thread::spawn(move || {
        writer.set_rooms(vec![Room::new("A"), Room::new("B")]);
        writer.set_current_layout(&Scope::Room(RoomId::new("A")), "Quad.kg2");
        writer.set_current_layout(&Scope::Room(RoomId::new("B")), "Dual.kg2");
    });

    let iter = state.iter();
    let keys: Vec<_> = (0..3)
        .filter_map(|_| iter.recv_timeout(Duration::from_secs(1)))
        .map(|event| event.property)
        .collect();
    handle.join().unwrap();

    assert_eq!(keys, vec![RoomList::KEY, CurrentLayout::KEY, CurrentLayout::KEY]);
    assert_eq!(state.rooms().len(), 2);
}

#[test]
fn test_unchanged_lists_are_silent() {
    let state = DeviceState::new();
    state.watch::<LayoutList>();

    let layouts = vec![Layout::new("A.kg2", "A"), Layout::new("B.kg2", "B")];
    assert!(state.set_layouts(layouts.clone()));
    assert!(!state.set_layouts(layouts));

    assert_eq!(state.iter().try_iter().count(), 1);
}

#[test]
fn test_snapshot_is_detached() {
    let state = DeviceState::new();
    state.set_system_name("Cougar");
    let snapshot = state.snapshot();
    state.set_system_name("Renamed");
    assert_eq!(snapshot.system_name.as_deref(), Some("Cougar"));
    assert_eq!(state.system_name().as_deref(), Some("Renamed"));
}
