// Rust guideline compliant 2026-03-01

//! Subscriber Registry (Connection Manager) -- the only mutable shared
//! state in the feed core.
//!
//! Tracks currently-connected, authenticated subscribers and fans each
//! event out to all of them with per-subscriber isolation: every
//! subscriber owns a bounded outbox (`tokio::sync::mpsc`), broadcast
//! enqueues without blocking, and a full or closed outbox resolves to that
//! one subscriber's removal -- never to an error for the caller or a delay
//! for the other subscribers. Per-subscriber delivery order follows
//! generation order because each outbox is a FIFO channel.
//!
//! Entry points: [`Registry::connect`], [`Registry::disconnect`], and the
//! `domain::Broadcast` impl.

use domain::{Auth, AuthError, Broadcast, Principal, Transaction};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Default per-subscriber outbox depth. Enough to absorb a short burst; a
/// subscriber that falls further behind is presumed dead and disconnected.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Subscription handle
// ---------------------------------------------------------------------------

/// Live handle returned by a successful [`Registry::connect`].
///
/// The transport task owns this handle, drains `outbox`, and calls
/// [`Registry::disconnect`] with `id` when the client goes away. No
/// subscriber outlives its registry entry's removal: once the entry is
/// gone, the outbox sender is dropped and `outbox.recv()` returns `None`.
#[derive(Debug)]
pub struct Subscription {
    /// Registry key for this subscriber.
    pub id: Uuid,
    /// Identity of the authenticated principal behind the connection.
    pub principal: Principal,
    /// Outbound stream of serialized events, one JSON document per message.
    pub outbox: mpsc::Receiver<std::sync::Arc<str>>,
}

/// Registered side of one subscriber: who they are and how to reach them.
#[derive(Debug)]
struct Entry {
    principal: Principal,
    outbox: mpsc::Sender<std::sync::Arc<str>>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owns the collection of live subscribers; the raw collection is never
/// exposed to callers.
///
/// Membership is mutated concurrently by connects, by transport-side
/// disconnects, and by broadcast-side removals of dead subscribers. All
/// mutation goes through one internal mutex; broadcast snapshots the
/// membership before fanning out, so iteration never observes a
/// half-mutated set.
#[derive(Debug)]
pub struct Registry {
    inner: Mutex<HashMap<Uuid, Entry>>,
    outbox_capacity: usize,
}

impl Registry {
    /// Create an empty registry with [`DEFAULT_OUTBOX_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_outbox_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    /// Create an empty registry with a custom per-subscriber outbox depth.
    ///
    /// A capacity of zero is clamped to one (an outbox must be able to hold
    /// at least the event being enqueued).
    #[must_use]
    pub fn with_outbox_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            outbox_capacity: capacity.max(1),
        }
    }

    /// Lock the membership map, recovering from a poisoned lock.
    ///
    /// Membership is a plain map; a panic mid-mutation cannot leave it in a
    /// state worse than a stale entry, which broadcast already tolerates.
    fn membership(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate `credential` and register a new live subscriber.
    ///
    /// A missing or invalid credential refuses the connection outright --
    /// no entry is created in any partial state.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredential`] when no credential was
    /// presented, or whatever the `Auth` collaborator reports.
    pub async fn connect<A: Auth>(
        &self,
        auth: &A,
        credential: Option<&str>,
    ) -> Result<Subscription, AuthError> {
        let credential = credential.ok_or(AuthError::MissingCredential)?;
        let principal = auth.validate(credential).await.inspect_err(|e| {
            tracing::warn!("registry.connect.refused: error={e}");
        })?;

        let (tx, rx) = mpsc::channel(self.outbox_capacity);
        let id = Uuid::new_v4();
        self.membership().insert(
            id,
            Entry { principal: principal.clone(), outbox: tx },
        );
        tracing::info!("registry.connect: id={id} principal={}", principal.email);
        Ok(Subscription { id, principal, outbox: rx })
    }

    /// Remove a subscriber. Idempotent: removing an already-removed id is a
    /// no-op, so the transport's error path and a broadcast-side removal
    /// may race freely.
    pub fn disconnect(&self, id: Uuid) {
        if self.membership().remove(&id).is_some() {
            tracing::info!("registry.disconnect: id={id}");
        }
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.membership().len()
    }

    /// `true` when no subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.membership().is_empty()
    }

    /// Enqueue `message` on every live outbox; returns the delivery count.
    ///
    /// Non-blocking per target: a full outbox (slow consumer) or a closed
    /// one (dead consumer) marks that subscriber for removal and the
    /// fan-out moves on.
    fn fan_out(&self, message: &std::sync::Arc<str>) -> usize {
        // Snapshot the membership so the lock is not held while enqueueing.
        let targets: Vec<(Uuid, mpsc::Sender<std::sync::Arc<str>>)> = self
            .membership()
            .iter()
            .map(|(id, entry)| (*id, entry.outbox.clone()))
            .collect();

        let mut delivered = 0usize;
        let mut dead: Vec<Uuid> = vec![];
        for (id, outbox) in targets {
            match outbox.try_send(std::sync::Arc::clone(message)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("registry.subscriber.lagging: id={id}, disconnecting");
                    dead.push(id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::info!("registry.subscriber.gone: id={id}, disconnecting");
                    dead.push(id);
                }
            }
        }
        for id in dead {
            self.disconnect(id);
        }
        delivered
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcast for Registry {
    /// Serialize `tx` once and fan it out to every live subscriber.
    ///
    /// Infallible for the caller by contract: per-subscriber failures
    /// resolve to that subscriber's removal inside [`fan_out`](Registry::fan_out).
    async fn broadcast(&self, tx: &Transaction) {
        let json = match serde_json::to_string(tx) {
            Ok(json) => json,
            Err(e) => {
                // Domain types serialize infallibly; this guards refactors.
                tracing::error!("registry.broadcast.serialize_failed: id={} error={e}", tx.id);
                return;
            }
        };
        let message: std::sync::Arc<str> = json.into();
        let delivered = self.fan_out(&message);
        tracing::debug!("registry.broadcast: id={} delivered={delivered}", tx.id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
