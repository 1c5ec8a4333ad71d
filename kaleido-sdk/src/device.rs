//! KaleidoDevice - main entry point for the SDK

use std::time::Duration;

use kaleido_api::{Command, Layout, Room, RoomId, Scope, StatusLevel, TallyColor};
use kaleido_session::{ClientConfig, DeviceStatus, KaleidoClient, SessionEvent};
use kaleido_state::{ChangeIterator, DeviceSnapshot, DeviceState, Property};
use tokio::sync::broadcast;

use crate::error::{Result, SdkError};
use crate::presets::{layout_presets, LayoutPreset};

/// One multiviewer, controlled through intents
///
/// Intent methods only queue commands and return at once. The device's
/// answers land in the derived state, which every query method reads.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use kaleido_sdk::{ClientConfig, KaleidoDevice, Scope, TallyColor};
///
/// # async fn example() -> Result<(), kaleido_sdk::SdkError> {
/// let device = KaleidoDevice::connect(ClientConfig::new("10.0.0.5"))?;
/// device.wait_until_ready(Duration::from_secs(5)).await?;
///
/// device.recall_layout("ROOM1/Quad.kg2")?;
/// device.set_tally(TallyColor::Red, true)?;
///
/// for preset in device.presets() {
///     println!("{} -> {}", preset.label, preset.id);
/// }
/// println!("root shows {}", device.current_layout(&Scope::Root));
///
/// device.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct KaleidoDevice {
    client: KaleidoClient,
}

impl KaleidoDevice {
    /// Start a session for `config`. Must be called inside a tokio runtime.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let client = KaleidoClient::start(config)?;
        Ok(Self { client })
    }

    /// Wrap a client that is already running
    pub fn from_client(client: KaleidoClient) -> Self {
        Self { client }
    }

    /// Wait until the session reports a working connection
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.client.wait_for_status(DeviceStatus::Ok)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SdkError::NotReady {
                timeout,
                status: self.client.status(),
            }),
        }
    }

    /// Wait until everything queued so far has been answered
    pub async fn wait_until_idle(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.client.wait_until_idle()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SdkError::NotReady {
                timeout,
                status: self.client.status(),
            }),
        }
    }

    pub fn status(&self) -> DeviceStatus {
        self.client.status()
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Recall a layout by its device id.
    ///
    /// A `room/name` id is recalled inside that room.
    pub fn recall_layout(&self, layout: &str) -> Result<()> {
        tracing::info!(layout, "Recalling layout");
        self.send(Command::set_layout(layout)?)
    }

    /// Recall `layout` inside `room`
    pub fn recall_layout_in_room(&self, room: &RoomId, layout: &str) -> Result<()> {
        tracing::info!(%room, layout, "Recalling layout in room");
        self.send(Command::set_layout_in_room(room, layout)?)
    }

    pub fn recall_preset(&self, preset: &LayoutPreset) -> Result<()> {
        self.recall_layout(&preset.id)
    }

    /// Recall a layout that the device listed, by id or label
    pub fn recall_known_layout(&self, id_or_label: &str) -> Result<()> {
        let layout = self
            .find_layout(id_or_label)
            .ok_or_else(|| SdkError::LayoutNotFound(id_or_label.to_string()))?;
        self.recall_layout(&layout.id)
    }

    /// Light or clear a tally border
    pub fn set_tally(&self, color: TallyColor, active: bool) -> Result<()> {
        self.send(Command::tally(color, active))
    }

    pub fn set_alarm(&self, level: StatusLevel) -> Result<()> {
        self.send(Command::alarm(level))
    }

    /// Set the under-monitor-display text
    pub fn set_umd_text(&self, text: &str) -> Result<()> {
        self.send(Command::umd_text(text)?)
    }

    /// Send a command line as-is
    pub fn send_raw(&self, text: &str) -> Result<()> {
        self.send(Command::raw(text))
    }

    /// Ask the device for its rooms, layouts and current layouts again
    pub fn refresh(&self) -> Result<()> {
        self.send(Command::get_room_list())?;
        self.send(Command::get_layout_list())?;
        self.send(Command::get_current_layout())
    }

    pub fn send(&self, command: Command) -> Result<()> {
        tracing::debug!(command = %command, "Queueing command");
        Ok(self.client.enqueue(command)?)
    }

    // ========================================================================
    // Derived state
    // ========================================================================

    pub fn state(&self) -> &DeviceState {
        self.client.state()
    }

    pub fn software_version(&self) -> Option<String> {
        self.state().software_version()
    }

    pub fn system_name(&self) -> Option<String> {
        self.state().system_name()
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.state().rooms()
    }

    pub fn layouts(&self) -> Vec<Layout> {
        self.state().layouts()
    }

    /// Current layout of the root or a room, `"unknown"` until reported
    pub fn current_layout(&self, scope: &Scope) -> String {
        self.state().current_layout(scope)
    }

    /// True when `scope` is known to show exactly `layout`
    pub fn layout_matches(&self, scope: &Scope, layout: &str) -> bool {
        self.state()
            .known_current_layout(scope)
            .is_some_and(|current| current == layout)
    }

    /// Whether recalling `preset` would change nothing
    pub fn preset_active(&self, preset: &LayoutPreset) -> bool {
        self.layout_matches(&preset.scope(), &preset.layout_name)
    }

    pub fn presets(&self) -> Vec<LayoutPreset> {
        layout_presets(&self.layouts())
    }

    /// Find a listed layout by id, or failing that by label
    pub fn find_layout(&self, id_or_label: &str) -> Option<Layout> {
        let layouts = self.layouts();
        layouts
            .iter()
            .find(|l| l.id == id_or_label)
            .or_else(|| layouts.iter().find(|l| l.label == id_or_label))
            .cloned()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.state().snapshot()
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Session events (status changes, rejected and timed out commands)
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.client.subscribe()
    }

    /// Start reporting changes of `P` through [`iter`](Self::iter)
    pub fn watch<P: Property>(&self) {
        self.state().watch::<P>();
    }

    /// Blocking iterator over changes of watched properties
    pub fn iter(&self) -> ChangeIterator {
        self.state().iter()
    }

    /// Close the device context and stop the session
    pub async fn shutdown(self) -> Result<()> {
        Ok(self.client.shutdown().await?)
    }
}
