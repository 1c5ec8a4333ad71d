//! kaleidoctl - drive a Kaleido multiviewer from the command line
//!
//! Connects, waits for the startup queries to finish, performs one action and
//! prints the resulting device snapshot as JSON on stdout. Logs go to stderr.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kaleido_sdk::logging::{self, LoggingMode};
use kaleido_sdk::{
    ClientConfig, DeviceStatus, KaleidoDevice, SessionEvent, StatusLevel, TallyColor,
};

#[derive(Parser, Debug)]
#[command(name = "kaleidoctl", version, about = "Control a Kaleido multiviewer")]
struct Cli {
    /// Device address
    #[arg(long, env = "KALEIDO_HOST")]
    host: String,

    /// Control protocol port
    #[arg(long, env = "KALEIDO_PORT", default_value_t = kaleido_api::DEFAULT_PORT)]
    port: u16,

    /// Seconds to wait for the connection and for replies
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// silent, development or debug
    #[arg(long, env = "KALEIDO_LOG_MODE", default_value = "development")]
    log_mode: LoggingMode,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Print the device snapshot
    Status,
    /// List the recallable layout presets
    Presets,
    /// Recall a layout by id (`ROOM/name.kg2`) or by label
    Recall { layout: String },
    /// Set a tally border
    Tally {
        color: TallyColor,
        /// Clear the border instead of lighting it
        #[arg(long)]
        clear: bool,
    },
    /// Set the alarm border level (normal, minor, error)
    Alarm { level: StatusLevel },
    /// Set the under-monitor-display text
    Umd { text: String },
    /// Send one raw protocol line
    Raw { line: String },
    /// Print session events until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_mode).context("Failed to initialize logging")?;

    let timeout = Duration::from_secs(cli.timeout);
    let config = ClientConfig::new(cli.host.as_str())
        .with_port(cli.port)
        .with_connect_timeout(timeout)
        .with_reconnect_interval(None);

    let device = KaleidoDevice::connect(config).context("Invalid connection settings")?;
    let outcome = run(&device, cli.action, timeout).await;

    device.shutdown().await.context("Failed to close the session")?;
    outcome
}

async fn run(device: &KaleidoDevice, action: Action, timeout: Duration) -> Result<()> {
    device
        .wait_until_ready(timeout)
        .await
        .context("Device did not come online")?;
    device
        .wait_until_idle(timeout)
        .await
        .context("Device did not finish answering the startup queries")?;

    match action {
        Action::Status => {}
        Action::Presets => {
            println!("{}", serde_json::to_string_pretty(&device.presets())?);
            return Ok(());
        }
        Action::Recall { layout } => match device.find_layout(&layout) {
            Some(known) => device.recall_layout(&known.id)?,
            None => {
                tracing::warn!(layout = %layout, "Layout not in the device list, sending as given");
                device.recall_layout(&layout)?;
            }
        },
        Action::Tally { color, clear } => device.set_tally(color, !clear)?,
        Action::Alarm { level } => device.set_alarm(level)?,
        Action::Umd { text } => device.set_umd_text(&text)?,
        Action::Raw { line } => device.send_raw(&line)?,
        Action::Watch => return watch(device).await,
    }

    device
        .wait_until_idle(timeout)
        .await
        .context("Device did not answer")?;
    println!("{}", serde_json::to_string_pretty(&device.snapshot())?);
    Ok(())
}

async fn watch(device: &KaleidoDevice) -> Result<()> {
    let mut events = device.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            event = events.recv() => match event {
                Ok(SessionEvent::Status { status, message }) => {
                    println!("status {} {}", status, message.unwrap_or_default());
                    if status == DeviceStatus::Disconnected {
                        return Ok(());
                    }
                }
                Ok(SessionEvent::StateChanged { scope, property }) => {
                    println!("changed {} on {}", property, scope);
                }
                Ok(SessionEvent::CommandRejected { command, context }) => {
                    println!("rejected {} in {:?}", command, context);
                }
                Ok(SessionEvent::CommandTimedOut { command }) => {
                    println!("timed out {}", command);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event stream lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return Ok(()),
            },
        }
    }
}
