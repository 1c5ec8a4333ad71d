//! Recallable layout presets
//!
//! One preset per layout the device reported. A preset carries everything a
//! control surface needs to draw a button and recall the layout later.

use kaleido_api::{Layout, RoomId, Scope};
use serde::Serialize;

/// A layout presented as a recallable preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPreset {
    /// Full layout id as sent in a set command, e.g. `ROOM1/Quad.kg2`
    pub id: String,
    /// Display name without room prefix or extension
    pub label: String,
    /// Room the layout belongs to, `None` for root layouts
    pub room: Option<RoomId>,
    /// Layout file name inside its room
    pub layout_name: String,
}

impl LayoutPreset {
    /// Where recalling this preset changes the current layout
    pub fn scope(&self) -> Scope {
        match &self.room {
            Some(room) => Scope::Room(room.clone()),
            None => Scope::Root,
        }
    }
}

impl From<&Layout> for LayoutPreset {
    fn from(layout: &Layout) -> Self {
        Self {
            id: layout.id.clone(),
            label: layout.label.clone(),
            room: layout.room(),
            layout_name: layout.name().to_string(),
        }
    }
}

/// Presets for `layouts`, in the same order
pub fn layout_presets(layouts: &[Layout]) -> Vec<LayoutPreset> {
    layouts.iter().map(LayoutPreset::from).collect()
}
