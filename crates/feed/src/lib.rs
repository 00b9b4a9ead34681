// Rust guideline compliant 2026-03-01

//! Generation Loop and Lifecycle Controller for the live transaction feed.
//!
//! [`Feed::run`] owns the cadence: synthesize -> evaluate -> persist ->
//! broadcast, then sleep for a jittered interval, until cancelled. The
//! persist step happens strictly before the broadcast step; a failed write
//! drops that one event (logged, loop continues) rather than delivering an
//! unrecorded transaction.
//!
//! [`Lifecycle`] owns the loop as an explicit cancellable task: `start`
//! spawns it, `stop` signals cooperative cancellation and awaits clean
//! termination, so no background activity survives shutdown.
//!
//! Configuration via [`FeedConfig::builder`].

use domain::{Broadcast, Evaluate, Storage, StorageError, Synthesize};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// FeedError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring or supervising the feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The supplied configuration is invalid.
    #[error("invalid feed configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The generation-loop task terminated abnormally (panic or abort).
    #[error("feed task failed: {reason}")]
    TaskFailed {
        /// Human-readable description.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// FeedState
// ---------------------------------------------------------------------------

/// Observable state machine of the generation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Created but not yet running.
    Idle,
    /// Producing events.
    Running,
    /// Cancellation observed; finishing the current iteration.
    Cancelling,
    /// Terminated; no further persistence writes or broadcasts occur.
    Stopped,
}

// ---------------------------------------------------------------------------
// FeedConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`Feed`].
///
/// Construct via [`FeedConfig::builder`].
#[derive(Debug)]
pub struct FeedConfig {
    /// Lower bound of the jittered inter-event delay.
    pub min_interval: Duration,
    /// Upper bound of the jittered inter-event delay.
    pub max_interval: Duration,
    /// Optional upper bound on the number of events. `None` means run until
    /// cancelled.
    pub iterations: Option<u64>,
    /// Optional RNG seed for reproducible jitter. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`FeedConfig`].
///
/// Obtain via [`FeedConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct FeedConfigBuilder {
    min_interval: Duration,
    max_interval: Duration,
    iterations: Option<u64>,
    seed: Option<u64>,
}

impl FeedConfig {
    /// Create a builder with the original feed's cadence: a uniform delay
    /// in `[500 ms, 3 s]` between events.
    #[must_use]
    pub fn builder() -> FeedConfigBuilder {
        FeedConfigBuilder {
            min_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(3),
            iterations: None,
            seed: None,
        }
    }
}

impl FeedConfigBuilder {
    /// Override the jitter range (both bounds inclusive). The randomized,
    /// non-fixed delay prevents lock-step bursty delivery.
    #[must_use]
    pub fn interval(mut self, min: Duration, max: Duration) -> Self {
        self.min_interval = min;
        self.max_interval = max;
        self
    }

    /// Set a finite event count. Without this the feed runs until cancelled.
    #[must_use]
    pub fn iterations(mut self, n: u64) -> Self {
        self.iterations = Some(n);
        self
    }

    /// Fix the RNG seed for deterministic jitter (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidConfig`] when `min_interval` exceeds
    /// `max_interval`.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<FeedConfig, FeedError> {
        if self.min_interval > self.max_interval {
            return Err(FeedError::InvalidConfig {
                reason: "min_interval must be <= max_interval".to_owned(),
            });
        }
        Ok(FeedConfig {
            min_interval: self.min_interval,
            max_interval: self.max_interval,
            iterations: self.iterations,
            seed: self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// FeedControls
// ---------------------------------------------------------------------------

/// Control channels handed to [`Feed::run`] by the [`Lifecycle`]: a state
/// publisher and a cancellation signal.
#[derive(Debug)]
pub struct FeedControls {
    state: watch::Sender<FeedState>,
    shutdown: watch::Receiver<bool>,
}

impl FeedControls {
    /// Standalone controls for driving [`Feed::run`] directly, without a
    /// [`Lifecycle`] (used by tests and finite demo runs). The returned
    /// sender cancels the loop; the receiver observes its state.
    #[must_use]
    pub fn standalone() -> (Self, watch::Sender<bool>, watch::Receiver<FeedState>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(FeedState::Idle);
        (
            Self { state: state_tx, shutdown: shutdown_rx },
            shutdown_tx,
            state_rx,
        )
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// The generation loop: repeatedly synthesize, score, persist, broadcast.
///
/// Generic over all four hexagonal ports for zero-cost static dispatch.
/// Holds no concrete adapter references -- dependencies are injected per
/// call.
#[derive(Debug)]
pub struct Feed {
    config: FeedConfig,
    /// Interior mutability required because all public methods take `&self`;
    /// a `Mutex` keeps the type `Sync` for use inside a spawned loop.
    rng: Mutex<StdRng>,
}

impl Feed {
    /// Create a new feed from `config`.
    ///
    /// Seeds the RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: FeedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng: Mutex::new(rng) }
    }

    /// Draw the next inter-event delay, uniform over the configured range.
    fn jitter(&self) -> Duration {
        let min = self.config.min_interval.as_millis();
        let max = self.config.max_interval.as_millis();
        let millis = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(min..=max);
        // as_millis of a valid Duration range always fits back into one.
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Produce one event: synthesize, score, persist, then broadcast.
    ///
    /// The durable write strictly precedes the broadcast; on write failure
    /// the broadcast is skipped so a transaction is never delivered without
    /// being recorded.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] of a failed write. The event is dropped;
    /// callers continue with the next iteration.
    pub async fn tick<G, E, S, B>(
        &self,
        synthesizer: &G,
        heuristic: &E,
        storage: &S,
        bus: &B,
    ) -> Result<(), StorageError>
    where
        G: Synthesize,
        E: Evaluate,
        S: Storage,
        B: Broadcast,
    {
        let draft = synthesizer.synthesize();
        let verdict = heuristic.evaluate(&draft);
        let tx = draft.into_scored(verdict);

        storage.append(&tx).await?;

        if tx.fraud_verdict.is_flagged() {
            tracing::warn!(
                "feed.flagged: id={} reason={:?} amount={}",
                tx.id,
                tx.fraud_verdict.reason().unwrap_or_default(),
                tx.details.amount,
            );
        }
        bus.broadcast(&tx).await;
        Ok(())
    }

    /// Run the generation loop until cancelled or the iteration limit is
    /// reached.
    ///
    /// Publishes `Running` on entry, `Cancelling` once the shutdown signal
    /// is observed (within at most one sleep interval), and `Stopped` on
    /// exit. A persistence failure in one iteration is logged and the loop
    /// continues; it is never fatal.
    pub async fn run<G, E, S, B>(
        &self,
        synthesizer: &G,
        heuristic: &E,
        storage: &S,
        bus: &B,
        mut controls: FeedControls,
    ) where
        G: Synthesize,
        E: Evaluate,
        S: Storage,
        B: Broadcast,
    {
        let _ = controls.state.send(FeedState::Running);
        tracing::info!("feed.run.started");

        let mut count = 0u64;
        loop {
            if *controls.shutdown.borrow() {
                tracing::info!("feed.run.cancelling: after {count} iteration(s)");
                let _ = controls.state.send(FeedState::Cancelling);
                break;
            }

            if let Err(e) = self.tick(synthesizer, heuristic, storage, bus).await {
                tracing::warn!("feed.append.failed: error={e}, event dropped");
            }
            count += 1;

            if let Some(max) = self.config.iterations
                && count >= max
            {
                tracing::info!("feed.run.stopped: iteration limit reached");
                break;
            }

            let delay = self.jitter();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                res = controls.shutdown.changed() => {
                    // A dropped sender counts as a cancellation request.
                    if res.is_err() {
                        tracing::info!("feed.run.cancelling: control channel closed");
                        let _ = controls.state.send(FeedState::Cancelling);
                        break;
                    }
                }
            }
        }

        let _ = controls.state.send(FeedState::Stopped);
        tracing::info!("feed.run.stopped: after {count} iteration(s)");
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Owns the generation loop as an explicit cancellable task handle, never
/// as an ambient fire-and-forget action.
#[derive(Debug)]
pub struct Lifecycle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<FeedState>,
    task: tokio::task::JoinHandle<()>,
}

impl Lifecycle {
    /// Spawn the generation loop at process start.
    ///
    /// `make_loop` receives the control channels and returns the loop
    /// future (typically `feed.run(..)` over owned components); the caller
    /// closes over its concrete adapters so the future stays `Send`.
    pub fn start<Mk, Fut>(make_loop: Mk) -> Self
    where
        Mk: FnOnce(FeedControls) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(FeedState::Idle);
        let task = tokio::spawn(make_loop(FeedControls {
            state: state_tx,
            shutdown: shutdown_rx,
        }));
        tracing::info!("lifecycle.start: generation loop spawned");
        Self { shutdown: shutdown_tx, state: state_rx, task }
    }

    /// Current state of the supervised loop.
    #[must_use]
    pub fn state(&self) -> FeedState {
        *self.state.borrow()
    }

    /// Watch handle onto the loop's state, usable after [`stop`](Self::stop).
    #[must_use]
    pub fn state_watch(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Request cancellation and await clean termination.
    ///
    /// Cooperative: the loop observes the signal within one sleep interval
    /// and finishes its in-flight iteration first, so a persistence write
    /// is never torn down mid-operation. When this returns, no further
    /// persistence writes or broadcasts occur.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::TaskFailed`] if the loop task panicked or was
    /// aborted externally.
    pub async fn stop(self) -> Result<(), FeedError> {
        tracing::info!("lifecycle.stop: requesting cancellation");
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| FeedError::TaskFailed { reason: e.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
