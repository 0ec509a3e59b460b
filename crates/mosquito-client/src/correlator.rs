//! Blocking round-trips over the asynchronous reply stream.
//!
//! A round-trip temporarily owns the dispatch slot for its reply kind:
//! register a one-shot [`Subscription`], send the request, then block until
//! the reader fills the subscription or the deadline passes. The slot is
//! released on every exit path so a late reply can never resolve a later,
//! unrelated call.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use mosquito_frame::{Message, MessageKind, Request};
use tracing::{debug, trace};

use crate::dispatch::{lock, DispatchTable, Subscriber};
use crate::error::{ClientError, Result};

/// A pending wait for one reply.
pub struct Subscription {
    kind: MessageKind,
    started_at: Instant,
    outcome: Mutex<Option<Result<Message>>>,
    resolved: Condvar,
}

impl Subscription {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            started_at: Instant::now(),
            outcome: Mutex::new(None),
            resolved: Condvar::new(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Time since the subscription was created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_resolved(&self) -> bool {
        lock(&self.outcome).is_some()
    }

    /// Block until resolved or `deadline` passes.
    pub fn wait(&self, deadline: Instant) -> Result<Message> {
        let mut outcome = lock(&self.outcome);
        loop {
            if let Some(result) = outcome.take() {
                return result;
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ClientError::Timeout {
                    kind: self.kind,
                    after: self.elapsed(),
                });
            }
            outcome = self
                .resolved
                .wait_timeout(outcome, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn resolve(&self, result: Result<Message>) {
        let mut outcome = lock(&self.outcome);
        if outcome.is_none() {
            *outcome = Some(result);
            self.resolved.notify_all();
        }
    }
}

impl Subscriber for Subscription {
    fn on_update(&self, message: Message) {
        self.resolve(Ok(message));
    }

    fn on_error(&self, error: ClientError) {
        self.resolve(Err(error));
    }
}

/// Issues requests and matches their replies by kind.
pub struct Correlator {
    table: Arc<DispatchTable>,
    reply_timeout: Duration,
}

impl Correlator {
    pub fn new(table: Arc<DispatchTable>, reply_timeout: Duration) -> Self {
        Self {
            table,
            reply_timeout,
        }
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    /// Round-trip with the configured reply timeout.
    pub fn round_trip<S>(&self, request: &Request, send: S) -> Result<Message>
    where
        S: FnOnce(&Request) -> Result<()>,
    {
        self.round_trip_until(request, Instant::now() + self.reply_timeout, send)
    }

    /// Register for the reply to `request`, hand the request to `send`, and
    /// wait for the reply until `deadline`.
    ///
    /// A call for a kind that already has a pending round-trip waits for that
    /// one to finish first, within the same deadline.
    pub fn round_trip_until<S>(
        &self,
        request: &Request,
        deadline: Instant,
        send: S,
    ) -> Result<Message>
    where
        S: FnOnce(&Request) -> Result<()>,
    {
        let kind = request.kind();
        let subscription = Arc::new(Subscription::new(kind));
        let token = self.table.acquire(kind, subscription.clone(), deadline)?;

        if let Err(err) = send(request) {
            self.table.release(token);
            return Err(err);
        }
        trace!(%kind, "request sent, waiting for reply");

        let result = subscription.wait(deadline);
        if self.table.release(token) {
            debug!(%kind, elapsed = ?subscription.elapsed(), "abandoned pending reply");
        }
        result
    }
}
