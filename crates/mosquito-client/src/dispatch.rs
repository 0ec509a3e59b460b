//! One handler slot per message kind.
//!
//! The reader thread is the only caller of [`DispatchTable::dispatch`]; it
//! removes the handler from its slot under the lock and invokes it after the
//! lock is released, so handlers never run while the table is locked.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use mosquito_frame::{Direction, Frame, Message, MessageKind};
use tracing::{debug, trace};

use crate::error::{ClientError, Result};

/// Receiver of one decoded reply.
pub trait Subscriber: Send + Sync {
    /// Called with the decoded payload of a frame of the registered kind.
    fn on_update(&self, message: Message);

    /// Called instead of `on_update` when the reply cannot be delivered.
    fn on_error(&self, error: ClientError);
}

/// Why the table stopped accepting registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The host disconnected on purpose.
    Disconnected,
    /// The device closed the stream.
    Closed,
    /// Reading from the stream failed.
    ReceiveFailure(String),
}

impl CloseReason {
    /// Error handed to waiters that were pending when the table closed.
    fn pending_error(&self) -> ClientError {
        match self {
            CloseReason::Disconnected => ClientError::Disconnected,
            CloseReason::Closed => ClientError::Closed,
            CloseReason::ReceiveFailure(reason) => ClientError::ReceiveFailure(reason.clone()),
        }
    }

    /// Error for registrations attempted after the table closed.
    pub(crate) fn register_error(&self) -> ClientError {
        match self {
            CloseReason::Disconnected => ClientError::NotConnected,
            other => other.pending_error(),
        }
    }
}

/// Identifies one registration so it can be released without disturbing a
/// newer registration for the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotToken {
    kind: MessageKind,
    id: u64,
}

impl SlotToken {
    pub fn kind(&self) -> MessageKind {
        self.kind
    }
}

struct Slot {
    id: u64,
    handler: Arc<dyn Subscriber>,
}

#[derive(Default)]
struct TableState {
    slots: HashMap<MessageKind, Slot>,
    next_id: u64,
    closed: Option<CloseReason>,
}

impl TableState {
    fn insert(&mut self, kind: MessageKind, handler: Arc<dyn Subscriber>) -> SlotToken {
        self.next_id += 1;
        let id = self.next_id;
        self.slots.insert(kind, Slot { id, handler });
        SlotToken { kind, id }
    }
}

/// Mapping from message kind to the single handler waiting for it.
#[derive(Default)]
pub struct DispatchTable {
    state: Mutex<TableState>,
    slot_freed: Condvar,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `kind`, replacing any current registration.
    pub fn register(&self, kind: MessageKind, handler: Arc<dyn Subscriber>) -> Result<SlotToken> {
        let mut state = lock(&self.state);
        if let Some(reason) = &state.closed {
            return Err(reason.register_error());
        }
        if state.slots.contains_key(&kind) {
            debug!(%kind, "replacing registered handler");
        }
        Ok(state.insert(kind, handler))
    }

    /// Install `handler` once the slot for `kind` is free.
    ///
    /// Fails with `Timeout` if another registration still holds the slot at
    /// `deadline`.
    pub fn acquire(
        &self,
        kind: MessageKind,
        handler: Arc<dyn Subscriber>,
        deadline: Instant,
    ) -> Result<SlotToken> {
        let started = Instant::now();
        let mut state = lock(&self.state);
        loop {
            if let Some(reason) = &state.closed {
                return Err(reason.register_error());
            }
            if !state.slots.contains_key(&kind) {
                return Ok(state.insert(kind, handler));
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ClientError::Timeout {
                    kind,
                    after: now - started,
                });
            }
            trace!(%kind, "slot busy, waiting");
            state = self
                .slot_freed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Remove the registration identified by `token`, if it is still current.
    ///
    /// Returns `false` when the handler already fired or was replaced.
    pub fn release(&self, token: SlotToken) -> bool {
        let mut state = lock(&self.state);
        let current = state
            .slots
            .get(&token.kind)
            .is_some_and(|slot| slot.id == token.id);
        if current {
            state.slots.remove(&token.kind);
            self.slot_freed.notify_all();
        }
        current
    }

    /// Take the handler for `kind` out of its slot (one-shot).
    pub fn take(&self, kind: MessageKind) -> Option<Arc<dyn Subscriber>> {
        let slot = lock(&self.state).slots.remove(&kind);
        if slot.is_some() {
            self.slot_freed.notify_all();
        }
        slot.map(|slot| slot.handler)
    }

    /// Route a decoded frame to the handler registered for its kind.
    ///
    /// Returns `false` when nobody was waiting for the frame.
    pub fn dispatch(&self, frame: &Frame) -> bool {
        let Some(kind) = frame.message_kind() else {
            trace!(kind = frame.kind, "dropping frame of unknown kind");
            return false;
        };
        if frame.direction == Direction::ToDevice {
            trace!(%kind, "dropping host-direction frame");
            return false;
        }
        let Some(handler) = self.take(kind) else {
            trace!(%kind, "dropping unsolicited frame");
            return false;
        };

        if frame.direction == Direction::Error {
            debug!(%kind, "device rejected request");
            handler.on_error(ClientError::DeviceRejected(kind));
            return true;
        }

        match Message::decode(frame) {
            Ok(message) => handler.on_update(message),
            Err(err) => handler.on_error(ClientError::Frame(err)),
        }
        true
    }

    /// Fail every registered handler and refuse new registrations.
    ///
    /// Only the first close after a [`reopen`](Self::reopen) fails pending
    /// handlers. A later `Disconnected` still replaces the recorded reason.
    pub fn close(&self, reason: CloseReason) {
        let drained: Vec<Slot> = {
            let mut state = lock(&self.state);
            if let Some(current) = &state.closed {
                // A host disconnect outranks whatever ended the stream first.
                if reason == CloseReason::Disconnected && *current != reason {
                    debug!(previous = ?current, "marking closed table disconnected");
                    state.closed = Some(reason);
                }
                return;
            }
            state.closed = Some(reason.clone());
            state.slots.drain().map(|(_, slot)| slot).collect()
        };
        self.slot_freed.notify_all();

        if !drained.is_empty() {
            debug!(pending = drained.len(), ?reason, "failing pending waits");
        }
        for slot in drained {
            slot.handler.on_error(reason.pending_error());
        }
    }

    /// Why the table is closed, if it is.
    pub fn close_reason(&self) -> Option<CloseReason> {
        lock(&self.state).closed.clone()
    }

    /// Accept registrations again after a [`close`](Self::close).
    pub fn reopen(&self) {
        lock(&self.state).closed = None;
    }

    /// Whether a handler is currently registered for `kind`.
    pub fn is_registered(&self, kind: MessageKind) -> bool {
        lock(&self.state).slots.contains_key(&kind)
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
