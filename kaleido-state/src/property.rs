//! Typed, watchable state values
//!
//! Every value the device reports is one [`Property`] type. Device-wide
//! values are stored against [`Scope::Root`](kaleido_api::Scope::Root);
//! [`CurrentLayout`] is stored against the root or the room it belongs to.

use kaleido_api::{Layout, Room};

/// Marker trait for values that can be stored and watched
///
/// `PartialEq` drives change detection: setting an equal value is not a change.
pub trait Property: Clone + Send + Sync + PartialEq + 'static {
    /// Unique key, used for watching and in change events
    const KEY: &'static str;
}

/// Firmware version string from `softwareVersion`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareVersion(pub String);

impl Property for SoftwareVersion {
    const KEY: &'static str = "software_version";
}

/// Device name from `systemName`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemName(pub String);

impl Property for SystemName {
    const KEY: &'static str = "system_name";
}

/// Rooms from the last room list reply, in device order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomList(pub Vec<Room>);

impl Property for RoomList {
    const KEY: &'static str = "rooms";
}

/// Layouts from the last layout list reply, in device order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutList(pub Vec<Layout>);

impl Property for LayoutList {
    const KEY: &'static str = "layouts";
}

/// Layout currently shown by the root or by one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentLayout(pub String);

impl Property for CurrentLayout {
    const KEY: &'static str = "current_layout";
}
