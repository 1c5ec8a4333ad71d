//! Blocking consumption of change events
//!
//! Events travel over a `std::sync::mpsc` channel so that plain threads
//! (a UI loop, a CLI) can wait on state changes without an async runtime.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crate::event::ChangeEvent;

pub(crate) type SharedReceiver = Arc<Mutex<mpsc::Receiver<ChangeEvent>>>;

/// Consumer end of a state's change channel
///
/// All iterators of one [`DeviceState`](crate::DeviceState) share a single
/// receiver: an event goes to whichever consumer takes it first.
pub struct ChangeIterator {
    rx: SharedReceiver,
}

impl ChangeIterator {
    pub(crate) fn new(rx: SharedReceiver) -> Self {
        Self { rx }
    }

    fn with_rx<T>(
        &self,
        f: impl FnOnce(&mpsc::Receiver<ChangeEvent>) -> Option<T>,
    ) -> Option<T> {
        let rx = self.rx.lock().ok()?;
        f(&rx)
    }

    /// Block until the next event; `None` once every writer is gone
    pub fn recv(&self) -> Option<ChangeEvent> {
        self.with_rx(|rx| rx.recv().ok())
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ChangeEvent> {
        self.with_rx(|rx| rx.recv_timeout(timeout).ok())
    }

    pub fn try_recv(&self) -> Option<ChangeEvent> {
        self.with_rx(|rx| rx.try_recv().ok())
    }

    /// Events already waiting, without blocking
    pub fn try_iter(&self) -> impl Iterator<Item = ChangeEvent> + '_ {
        std::iter::from_fn(move || self.try_recv())
    }
}

impl Iterator for ChangeIterator {
    type Item = ChangeEvent;

    fn next(&mut self) -> Option<ChangeEvent> {
        self.recv()
    }
}

impl std::fmt::Debug for ChangeIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeIterator").finish_non_exhaustive()
    }
}
