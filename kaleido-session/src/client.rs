//! Tokio driver for a [`Session`]
//!
//! One task owns the socket and the session. Inbound chunks, queued commands
//! and timeout ticks all arrive through a single `select!`, so replies are
//! processed strictly in order. Callers talk to the task through a command
//! channel and hear back through a broadcast channel of [`SessionEvent`]s.

use std::time::Instant;

use kaleido_api::Command;
use kaleido_state::DeviceState;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{Result, SessionError};
use crate::event::{DeviceStatus, SessionEvent};
use crate::session::Session;
use crate::transport::Outbox;

const READ_CHUNK: usize = 4096;

/// Requests from client handles to the session task
#[derive(Debug)]
enum Request {
    Enqueue(Command),
    /// Answered once the command queue is empty
    Idle(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// How a connection ended
enum Exit {
    Disconnected,
    Shutdown(Option<oneshot::Sender<()>>),
}

/// Handle to a running device session
///
/// Dropping every handle shuts the session down.
#[derive(Debug)]
pub struct KaleidoClient {
    requests: mpsc::UnboundedSender<Request>,
    events: broadcast::Sender<SessionEvent>,
    status: watch::Receiver<DeviceStatus>,
    state: DeviceState,
    task: JoinHandle<()>,
}

impl KaleidoClient {
    /// Validate `config` and start the session task.
    ///
    /// Connecting happens in the background; watch [`subscribe`](Self::subscribe)
    /// for `DeviceStatus::Ok`. Commands enqueued before the connection is up
    /// are sent after the startup sequence.
    pub fn start(config: ClientConfig) -> Result<Self> {
        Self::start_with_state(config, DeviceState::new())
    }

    /// Like [`start`](Self::start), writing into an existing state handle
    pub fn start_with_state(config: ClientConfig, state: DeviceState) -> Result<Self> {
        config.validate()?;

        let (requests, request_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_buffer_size);
        let (status_tx, status) = watch::channel(DeviceStatus::Connecting);

        let session = Session::new(config.session_config(), Outbox::new(), state.clone());
        let worker = Worker {
            config,
            session,
            requests: request_rx,
            events: events.clone(),
            status: status_tx,
            idle_waiters: Vec::new(),
        };
        let task = tokio::spawn(worker.run());

        Ok(Self {
            requests,
            events,
            status,
            state,
            task,
        })
    }

    /// Queue a command for the device
    pub fn enqueue(&self, command: Command) -> Result<()> {
        self.requests
            .send(Request::Enqueue(command))
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Wait until every command enqueued so far has been answered,
    /// timed out or dropped by a disconnect.
    pub async fn wait_until_idle(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.requests
            .send(Request::Idle(ack))
            .map_err(|_| SessionError::ChannelClosed)?;
        done.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Receive session events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Last reported connection status
    pub fn status(&self) -> DeviceStatus {
        *self.status.borrow()
    }

    /// Wait until the session reports `wanted`.
    ///
    /// Returns immediately if that is already the current status.
    pub async fn wait_for_status(&self, wanted: DeviceStatus) -> Result<()> {
        let mut status = self.status.clone();
        status
            .wait_for(|current| *current == wanted)
            .await
            .map(|_| ())
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Derived device state, updated as replies arrive
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Close the device context, drop the connection and wait for the task
    pub async fn shutdown(self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        if self.requests.send(Request::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
        self.task
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))
    }
}

struct Worker {
    config: ClientConfig,
    session: Session<Outbox>,
    requests: mpsc::UnboundedReceiver<Request>,
    events: broadcast::Sender<SessionEvent>,
    status: watch::Sender<DeviceStatus>,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl Worker {
    async fn run(mut self) {
        tracing::info!(address = %self.config.address(), "Session worker started");

        loop {
            self.emit(SessionEvent::status(DeviceStatus::Connecting, None));

            let exit = match self.connect().await {
                Ok(stream) => self.run_connection(stream).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Connection failed");
                    self.emit(SessionEvent::status(
                        DeviceStatus::ConnectionFailure,
                        Some(e.to_string()),
                    ));
                    Exit::Disconnected
                }
            };

            match exit {
                Exit::Shutdown(ack) => {
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                    break;
                }
                Exit::Disconnected => {
                    if let Exit::Shutdown(ack) = self.wait_for_reconnect().await {
                        if let Some(ack) = ack {
                            let _ = ack.send(());
                        }
                        break;
                    }
                }
            }
        }

        tracing::info!("Session worker shut down");
    }

    async fn connect(&self) -> Result<TcpStream> {
        let address = (self.config.host.as_str(), self.config.port);
        match tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(address)).await {
            Ok(Ok(stream)) => {
                let _ = stream.set_nodelay(true);
                Ok(stream)
            }
            Ok(Err(e)) => Err(SessionError::Io(e)),
            Err(_) => Err(SessionError::ConnectTimeout {
                address: self.config.address(),
                timeout: self.config.connect_timeout,
            }),
        }
    }

    /// Keep accepting commands while disconnected, until it is time to retry.
    ///
    /// Returns `Exit::Disconnected` when a reconnect is due.
    async fn wait_for_reconnect(&mut self) -> Exit {
        let Some(interval) = self.config.reconnect_interval else {
            tracing::info!("Reconnect disabled, stopping");
            return Exit::Shutdown(None);
        };
        let deadline = tokio::time::sleep(interval);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return Exit::Disconnected,
                request = self.requests.recv() => match request {
                    Some(Request::Enqueue(command)) => {
                        self.session.enqueue(command);
                        self.publish();
                    }
                    Some(Request::Idle(ack)) => {
                        self.idle_waiters.push(ack);
                        self.publish();
                    }
                    Some(Request::Shutdown(ack)) => return Exit::Shutdown(Some(ack)),
                    None => return Exit::Shutdown(None),
                },
            }
        }
    }

    async fn run_connection(&mut self, stream: TcpStream) -> Exit {
        let (mut reader, mut writer) = stream.into_split();
        self.session.transport_mut().set_connected(true);
        self.session.on_connected();

        let mut exit = match self.flush(&mut writer).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Write failed");
                Some(Exit::Disconnected)
            }
        };
        self.publish();

        let mut ticker = tokio::time::interval(self.config.timeout_check_interval);
        let mut chunk = vec![0u8; READ_CHUNK];

        while exit.is_none() {
            tokio::select! {
                read = reader.read(&mut chunk) => match read {
                    Ok(0) => {
                        tracing::info!("Device closed the connection");
                        exit = Some(Exit::Disconnected);
                    }
                    Ok(n) => self.session.on_data(&chunk[..n]),
                    Err(e) => {
                        tracing::warn!(error = %e, "Read failed");
                        exit = Some(Exit::Disconnected);
                    }
                },

                request = self.requests.recv() => match request {
                    Some(Request::Enqueue(command)) => self.session.enqueue(command),
                    Some(Request::Idle(ack)) => self.idle_waiters.push(ack),
                    Some(Request::Shutdown(ack)) => {
                        self.session.shutdown();
                        exit = Some(Exit::Shutdown(Some(ack)));
                    }
                    None => {
                        self.session.shutdown();
                        exit = Some(Exit::Shutdown(None));
                    }
                },

                _ = ticker.tick() => {
                    self.session.poll_timeout(Instant::now());
                }
            }

            if let Err(e) = self.flush(&mut writer).await {
                tracing::warn!(error = %e, "Write failed");
                if exit.is_none() {
                    exit = Some(Exit::Disconnected);
                }
            }
            self.publish();
        }

        let _ = writer.shutdown().await;
        self.session.transport_mut().set_connected(false);
        if let Some(Exit::Disconnected) = exit {
            self.session.on_disconnected();
        }
        self.publish();

        exit.unwrap_or(Exit::Disconnected)
    }

    async fn flush(&mut self, writer: &mut OwnedWriteHalf) -> std::io::Result<()> {
        for line in self.session.transport_mut().take() {
            writer.write_all(line.as_bytes()).await?;
        }
        writer.flush().await
    }

    fn publish(&mut self) {
        for event in self.session.drain_events() {
            self.emit(event);
        }
        if self.session.queue_len() == 0 {
            for waiter in self.idle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // Warnings about single replies leave the connection status alone
        if let SessionEvent::Status { status, .. } = &event {
            if matches!(
                status,
                DeviceStatus::Connecting
                    | DeviceStatus::Ok
                    | DeviceStatus::Disconnected
                    | DeviceStatus::ConnectionFailure
            ) {
                self.status.send_replace(*status);
            }
        }
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
