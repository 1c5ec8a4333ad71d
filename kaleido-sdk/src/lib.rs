//! # Kaleido SDK - intent level control of Kaleido multiviewers
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use kaleido_sdk::{ClientConfig, KaleidoDevice, Scope, StatusLevel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kaleido_sdk::SdkError> {
//!     kaleido_sdk::logging::init_logging_from_env()?;
//!
//!     let device = KaleidoDevice::connect(ClientConfig::new("10.0.0.5"))?;
//!     device.wait_until_ready(Duration::from_secs(5)).await?;
//!
//!     device.recall_known_layout("Quad")?;
//!     device.set_alarm(StatusLevel::Minor)?;
//!
//!     let showing = device.layout_matches(&Scope::Root, "Quad.kg2");
//!     println!("Quad on screen: {}", showing);
//!
//!     device.shutdown().await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! kaleido-sdk      (KaleidoDevice intents, presets, logging, kaleidoctl)
//!     ↓
//! kaleido-session  (command queue, reply dispatch, TCP driver)
//!     ↓                      ↓
//! kaleido-api      kaleido-state  (typed commands / derived state)
//!     ↓
//! kaleido-parser   (reply framing and parsing)
//! ```

mod device;
mod error;
pub mod logging;
pub mod presets;

pub use device::KaleidoDevice;
pub use error::{Result, SdkError};
pub use presets::{layout_presets, LayoutPreset};

// Re-export the pieces callers need without naming the lower crates
pub use kaleido_api::{Command, Layout, Room, RoomId, Scope, StatusLevel, TallyColor};
pub use kaleido_session::{ClientConfig, DeviceStatus, SessionEvent};
pub use kaleido_state::{DeviceSnapshot, UNKNOWN_LAYOUT};
