//! The protocol engine
//!
//! [`Session`] owns everything that lives for one connection: the command
//! queue, the working buffer and the navigation context. It performs no I/O
//! of its own. The driver feeds it connection changes, inbound bytes and
//! clock ticks; the session writes outbound lines to its [`Transport`],
//! updates the shared [`DeviceState`] and records [`SessionEvent`]s.
//!
//! Every inbound chunk is processed to completion before the call returns,
//! including any follow-up commands it appends, so a driver that calls in
//! from a single task can never interleave two replies.

use std::time::Instant;

use kaleido_api::{Command, CommandKind, Context, Layout, Parameter, Room, RoomId, Scope};
use kaleido_parser::{replies, KeyValue, Reply, ReplyOutcome};
use kaleido_state::{CurrentLayout, DeviceState, LayoutList, Property, RoomList, SoftwareVersion, SystemName};
use tracing::{debug, error, info, warn};

use crate::buffer::WorkingBuffer;
use crate::config::SessionConfig;
use crate::event::{DeviceStatus, SessionEvent};
use crate::queue::{expand, CommandQueue};
use crate::transport::Transport;

/// How far one parse attempt got
enum Step {
    /// Keep the buffer and wait for more bytes
    Incomplete,
    /// The head is resolved; `consumed` bytes belonged to its reply
    Resolved { consumed: usize, rejected: bool },
    /// The head is resolved with an error; the buffer is discarded
    Malformed { reason: String },
}

/// Sans-IO protocol session for one device connection
pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: T,
    queue: CommandQueue,
    buffer: WorkingBuffer,
    context: Context,
    state: DeviceState,
    events: Vec<SessionEvent>,
}

impl<T: Transport> Session<T> {
    pub fn new(config: SessionConfig, transport: T, state: DeviceState) -> Self {
        let buffer = WorkingBuffer::new(config.max_buffer_len);
        Self {
            config,
            transport,
            queue: CommandQueue::new(),
            buffer,
            context: Context::default(),
            state,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Commands waiting for a reply, head first
    pub fn pending(&self) -> impl Iterator<Item = &Command> {
        self.queue.commands()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Bytes received but not yet attributed to a reply
    pub fn buffered(&self) -> &str {
        self.buffer.as_str()
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Append a command; it is sent at once if nothing else is outstanding.
    ///
    /// Room-qualified layout recalls are expanded into open, set, close.
    pub fn enqueue(&mut self, command: Command) {
        for command in expand(command) {
            debug!(command = %command, "Queued");
            if self.queue.push(command) {
                self.process_queue();
            }
        }
    }

    /// Send the head of the queue unless it is already in flight.
    ///
    /// Sending while disconnected is logged and otherwise a no-op; the head
    /// stays queued until the next call.
    pub fn process_queue(&mut self) {
        let Some(head) = self.queue.head_mut() else {
            return;
        };
        if head.sent_at.is_some() {
            return;
        }

        if !self.transport.is_connected() {
            error!(command = %head.command, "Cannot send, not connected");
            return;
        }

        debug!(command = %head.command, "Sending");
        let line = format!("{}\n", head.command.text());
        match self.transport.send(&line) {
            Ok(()) => head.sent_at = Some(Instant::now()),
            Err(e) => error!(command = %head.command, error = %e, "Failed to send command"),
        }
    }

    /// The transport is up: start a fresh protocol session.
    ///
    /// The startup sequence goes first; commands queued while disconnected
    /// follow it.
    pub fn on_connected(&mut self) {
        info!(host = %self.config.host, "Connected");
        self.context = Context::Root;
        self.buffer.clear();

        let leftover = self.queue.drain();
        if !leftover.is_empty() {
            debug!(count = leftover.len(), "Re-queuing commands issued while disconnected");
        }

        self.events.push(SessionEvent::status(DeviceStatus::Ok, None));

        let startup = [
            Command::open_host(&self.config.host),
            Command::get_parameter(Parameter::SoftwareVersion),
            Command::get_parameter(Parameter::SystemName),
            Command::get_room_list(),
            Command::get_layout_list(),
            Command::get_current_layout(),
        ];
        for command in startup.into_iter().chain(leftover) {
            self.enqueue(command);
        }
    }

    /// The transport went away: drop everything tied to the connection.
    ///
    /// Derived state is kept; it is stale but still the best known.
    pub fn on_disconnected(&mut self) {
        if !self.queue.is_empty() {
            debug!(count = self.queue.len(), "Dropping outstanding commands");
        }
        self.queue.clear();
        self.buffer.clear();
        self.context = Context::Root;
        self.events.push(SessionEvent::status(DeviceStatus::Disconnected, None));
    }

    /// Close the device context before the connection is dropped
    pub fn shutdown(&mut self) {
        self.queue.clear();
        self.buffer.clear();
        if self.transport.is_connected() {
            let close = Command::close();
            debug!(command = %close, "Sending on shutdown");
            if let Err(e) = self.transport.send(&format!("{}\n", close.text())) {
                warn!(error = %e, "Failed to close device session");
            }
        }
    }

    /// Feed bytes received from the transport
    pub fn on_data(&mut self, chunk: &[u8]) {
        debug!(received = %String::from_utf8_lossy(chunk), "Received");
        self.buffer.push(chunk);

        // One buffer may hold several replies; resolve them one at a time.
        while !self.buffer.is_blank() {
            let Some(head) = self.queue.head() else {
                self.orphan_data();
                return;
            };
            if head.sent_at.is_none() {
                self.orphan_data();
                return;
            }

            let kind = head.command.kind().clone();
            match self.classify(&kind) {
                Step::Incomplete => {
                    if self.buffer.is_over_limit() {
                        self.malformed(format!(
                            "reply exceeded {} bytes without completing",
                            self.config.max_buffer_len
                        ));
                    }
                    return;
                }
                Step::Resolved { consumed, .. } => {
                    self.buffer.consume(consumed);
                    self.complete_head();
                }
                Step::Malformed { reason } => {
                    self.malformed(reason);
                    return;
                }
            }
        }
    }

    /// Resolve the head with an error if its reply is overdue.
    ///
    /// Returns whether a command timed out.
    pub fn poll_timeout(&mut self, now: Instant) -> bool {
        let Some(sent_at) = self.queue.head().and_then(|head| head.sent_at) else {
            return false;
        };
        if now.saturating_duration_since(sent_at) < self.config.command_timeout {
            return false;
        }

        let command = self
            .queue
            .head()
            .map(|head| head.command.text().to_string())
            .unwrap_or_default();
        warn!(command = %command, timeout = ?self.config.command_timeout, "Command timed out");
        self.events.push(SessionEvent::CommandTimedOut { command });
        self.buffer.clear();
        self.complete_head();
        true
    }

    fn complete_head(&mut self) {
        if let Some(done) = self.queue.pop() {
            debug!(command = %done.command, remaining = self.queue.len(), "Command resolved");
        }
        self.process_queue();
    }

    fn orphan_data(&mut self) {
        error!(data = %self.buffer.as_str(), "Received data with no command outstanding");
        self.events.push(SessionEvent::status(
            DeviceStatus::UnknownError,
            Some("Received unexpected data".to_string()),
        ));
        self.buffer.clear();
    }

    fn malformed(&mut self, reason: String) {
        let command = self
            .queue
            .head()
            .map(|head| head.command.text().to_string())
            .unwrap_or_default();
        warn!(command = %command, reason = %reason, data = %self.buffer.as_str(), "Malformed reply");
        self.events.push(SessionEvent::status(
            DeviceStatus::UnknownWarning,
            Some(format!("Malformed reply to {}: {}", command, reason)),
        ));
        self.buffer.clear();
        self.complete_head();
    }

    /// Parse the buffer as the reply to a command of `kind` and apply it
    fn classify(&mut self, kind: &CommandKind) -> Step {
        match kind {
            CommandKind::OpenSession(scope) => {
                let outcome = replies::acknowledgement(self.buffer.as_str());
                self.resolve(outcome, |session, ()| {
                    session.context = session.context.opened(scope);
                    debug!(context = ?session.context, "Context opened");
                })
            }
            CommandKind::CloseSession => {
                let outcome = replies::acknowledgement(self.buffer.as_str());
                self.resolve(outcome, |session, ()| {
                    session.context = session.context.closed();
                    if session.context == Context::Closed {
                        info!("Device session closed");
                    }
                })
            }
            CommandKind::GetParameter(parameter) => {
                let outcome = replies::parameter(self.buffer.as_str());
                self.resolve(outcome, |session, kv| session.apply_parameter(parameter, kv))
            }
            CommandKind::GetLayoutList => {
                let outcome = replies::layout_list(self.buffer.as_str());
                let step = self.resolve(outcome, |session, entries| {
                    let layouts: Vec<Layout> = entries.into_iter().map(Layout::from).collect();
                    info!(count = layouts.len(), "Received layout list");
                    if session.state.set_layouts(layouts) {
                        session.changed(Scope::Root, LayoutList::KEY);
                    }
                });
                self.clear_list_on_nack(step, |state| state.clear_layouts(), LayoutList::KEY)
            }
            CommandKind::GetRoomList => {
                let outcome = replies::room_list(self.buffer.as_str());
                let step = self.resolve(outcome, |session, ids| session.apply_room_list(ids));
                self.clear_list_on_nack(step, |state| state.clear_rooms(), RoomList::KEY)
            }
            CommandKind::GetCurrentLayout => {
                let outcome = replies::current_layout(self.buffer.as_str());
                self.resolve(outcome, |session, layout| session.apply_current_layout(layout))
            }
            CommandKind::SetLayout { room, .. } => {
                let outcome = replies::acknowledgement(self.buffer.as_str());
                self.resolve(outcome, |session, ()| session.refresh_after_set(room.as_ref()))
            }
            CommandKind::SetText | CommandKind::SetStatus => {
                let outcome = replies::acknowledgement(self.buffer.as_str());
                self.resolve(outcome, |_, ()| {})
            }
            CommandKind::Unrecognized => {
                error!(data = %self.buffer.as_str(), "No reply parser for the command in flight");
                self.events.push(SessionEvent::status(
                    DeviceStatus::UnknownError,
                    Some("Unrecognized command in queue".to_string()),
                ));
                self.buffer.clear();
                Step::Resolved {
                    consumed: 0,
                    rejected: false,
                }
            }
        }
    }

    /// Turn a parse outcome into a step, applying acknowledged payloads.
    ///
    /// `<ack/>` on an acknowledgement-only command is passed to `apply` as
    /// `()`; on a query it carries no data and is only logged.
    fn resolve<P: AckPayload>(
        &mut self,
        outcome: ReplyOutcome<P>,
        apply: impl FnOnce(&mut Self, P),
    ) -> Step {
        match outcome {
            ReplyOutcome::Incomplete => Step::Incomplete,
            ReplyOutcome::Malformed { reason, .. } => Step::Malformed { reason },
            ReplyOutcome::Parsed { reply, consumed } => {
                let rejected = reply.is_nack();
                match reply {
                    Reply::Payload(value) => apply(self, value),
                    Reply::Ack => match P::from_ack() {
                        Some(value) => apply(self, value),
                        None => warn!("Acknowledgement received where a payload was expected"),
                    },
                    Reply::Nack => self.rejected(),
                }
                Step::Resolved { consumed, rejected }
            }
        }
    }

    fn rejected(&mut self) {
        let command = self
            .queue
            .head()
            .map(|head| head.command.text().to_string())
            .unwrap_or_default();
        warn!(command = %command, context = ?self.context, "Command rejected by device");
        self.events.push(SessionEvent::CommandRejected {
            command,
            context: self.context.clone(),
        });
    }

    /// A rejected list query means the device has no such list.
    fn clear_list_on_nack(
        &mut self,
        step: Step,
        clear: impl FnOnce(&DeviceState) -> bool,
        property: &'static str,
    ) -> Step {
        if let Step::Resolved { rejected: true, .. } = step {
            if clear(&self.state) {
                self.changed(Scope::Root, property);
            }
        }
        step
    }

    fn apply_parameter(&mut self, requested: &Parameter, kv: KeyValue) {
        if kv.key != requested.key() {
            warn!(requested = requested.key(), received = %kv.key, "Parameter reply does not match the request");
        }

        let changed = match Parameter::from_key(&kv.key) {
            Parameter::SoftwareVersion => self
                .state
                .set_software_version(kv.value)
                .then_some(SoftwareVersion::KEY),
            Parameter::SystemName => self.state.set_system_name(kv.value).then_some(SystemName::KEY),
            Parameter::Other(key) => {
                debug!(key = %key, value = %kv.value, "Ignoring parameter");
                None
            }
        };
        if let Some(property) = changed {
            self.changed(Scope::Root, property);
        }
    }

    fn apply_room_list(&mut self, ids: Vec<String>) {
        let rooms: Vec<Room> = ids.into_iter().map(Room::new).collect();
        info!(count = rooms.len(), "Received room list");

        // Each room's current layout has to be read from inside the room.
        for room in &rooms {
            self.enqueue(Command::open_room(&room.id));
            self.enqueue(Command::get_current_layout());
            self.enqueue(Command::close());
        }

        if self.state.set_rooms(rooms) {
            self.changed(Scope::Root, RoomList::KEY);
        }
    }

    fn apply_current_layout(&mut self, layout: String) {
        let Some(scope) = self.context.scope() else {
            warn!(layout = %layout, "Current layout received with no context open");
            return;
        };
        debug!(scope = %scope, layout = %layout, "Current layout");
        if self.state.set_current_layout(&scope, layout) {
            self.changed(scope, CurrentLayout::KEY);
        }
    }

    /// Read back the layout the device just acknowledged
    fn refresh_after_set(&mut self, room: Option<&RoomId>) {
        match room {
            Some(room) => {
                self.enqueue(Command::open_room(room));
                self.enqueue(Command::get_current_layout());
                self.enqueue(Command::close());
            }
            None => self.enqueue(Command::get_current_layout()),
        }
    }

    fn changed(&mut self, scope: Scope, property: &'static str) {
        self.events.push(SessionEvent::StateChanged { scope, property });
    }
}

/// Payload types that an `<ack/>` can stand in for
trait AckPayload: Sized {
    fn from_ack() -> Option<Self>;
}

impl AckPayload for () {
    fn from_ack() -> Option<Self> {
        Some(())
    }
}

impl AckPayload for KeyValue {
    fn from_ack() -> Option<Self> {
        None
    }
}

impl AckPayload for String {
    fn from_ack() -> Option<Self> {
        None
    }
}

impl<T> AckPayload for Vec<T> {
    fn from_ack() -> Option<Self> {
        None
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("context", &self.context)
            .field("queued", &self.queue.len())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}
