//! Notifications for watched state values

use std::time::Instant;

use kaleido_api::Scope;

/// A watched value changed on `scope`
///
/// The event names what changed, not the new value. Read the value from
/// [`DeviceState`](crate::DeviceState) when handling it.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub scope: Scope,
    /// [`Property::KEY`](crate::Property::KEY) of the value
    pub property: &'static str,
    pub at: Instant,
}

impl ChangeEvent {
    pub fn new(scope: Scope, property: &'static str) -> Self {
        Self {
            scope,
            property,
            at: Instant::now(),
        }
    }

    /// True for events about property `P`
    pub fn is<P: crate::Property>(&self) -> bool {
        self.property == P::KEY
    }
}

// Two reports of the same change compare equal whenever they were made
impl PartialEq for ChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.property == other.property
    }
}

impl Eq for ChangeEvent {}
