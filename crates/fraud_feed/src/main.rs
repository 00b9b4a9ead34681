// Rust guideline compliant 2026-03-01

//! Live transaction feed entry point.
//!
//! Wires the synthesizer, the fraud heuristic, SQLite persistence, and the
//! subscriber registry into one jittered generation loop, then runs until
//! CTRL+C. A demo subscriber connects through token auth and logs every
//! event it receives, standing in for an external transport.
//!
//! # Usage
//!
//! ```text
//! # Infinite mode -- press CTRL+C to stop
//! RUST_LOG=info cargo run --bin fraud_feed
//!
//! # Also show per-transaction rule evaluation
//! RUST_LOG=debug cargo run --bin fraud_feed
//! ```
//!
//! The file `fraud_feed.db` is created on first run in the working
//! directory; override the location with the `FRAUD_FEED_DB` environment
//! variable (any `sqlite:` URL).

mod adapters;

use adapters::sqlite_storage::SqliteStorage;
use adapters::static_auth::StaticTokenAuth;
use anyhow::Context as _;
use domain::Storage as _;
use feed::{Feed, FeedConfig, Lifecycle};
use heuristic::{Heuristic, HeuristicConfig};
use registry::Registry;
use std::sync::Arc;
use synthesizer::{Synthesizer, SynthesizerConfig};

/// Database created in the working directory unless `FRAUD_FEED_DB` is set.
const DEFAULT_DB_URL: &str = "sqlite:fraud_feed.db";

/// Token seeded into the static auth table for the demo subscriber.
const DEMO_TOKEN: &str = "feed-demo-token";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize the tracing subscriber before any async work.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let db_url =
        std::env::var("FRAUD_FEED_DB").unwrap_or_else(|_| DEFAULT_DB_URL.to_owned());
    // SqliteStorage: opens or creates the database and its timestamp index.
    let storage = SqliteStorage::new(&db_url)
        .await
        .context("failed to open SQLite storage")?;

    let synthesizer = Synthesizer::new(
        SynthesizerConfig::builder()
            .build()
            .context("failed to build synthesizer config")?,
    );
    let heuristic = Heuristic::new(
        HeuristicConfig::builder()
            .build()
            .context("failed to build heuristic config")?,
    );
    // Infinite mode by default; set .iterations(20) here for a finite run.
    let feed_config = FeedConfig::builder()
        .build()
        .context("failed to build feed config")?;

    let registry = Arc::new(Registry::new());
    let auth = StaticTokenAuth::new().with_token(DEMO_TOKEN, "subscriber@example.com");

    // Demo subscriber: connect through the auth port, then drain the outbox
    // until it closes. Stands in for an external transport.
    let mut subscription = registry
        .connect(&auth, Some(DEMO_TOKEN))
        .await
        .context("demo subscriber refused")?;
    let subscriber_id = subscription.id;
    tracing::info!(
        "main.subscriber: id={subscriber_id} email={}",
        subscription.principal.email
    );
    let subscriber = tokio::spawn(async move {
        while let Some(event) = subscription.outbox.recv().await {
            tracing::info!("subscriber.event: {event}");
        }
    });

    // The loop owns its components; the registry is shared with main so the
    // subscriber can be disconnected after shutdown.
    let loop_registry = Arc::clone(&registry);
    let loop_storage = storage.clone();
    let lifecycle = Lifecycle::start(move |controls| async move {
        let feed = Feed::new(feed_config);
        feed.run(&synthesizer, &heuristic, &loop_storage, &*loop_registry, controls)
            .await;
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for CTRL+C")?;
    tracing::info!("main.shutdown: ctrl_c received, stopping the feed");
    lifecycle.stop().await.context("generation loop failed")?;

    // Closing the subscription drops its outbox sender, which ends the
    // subscriber task's recv loop.
    registry.disconnect(subscriber_id);
    subscriber.await.context("subscriber task failed")?;

    // Read back the tail of the journal as a shutdown summary.
    let recent = storage
        .page(None, 5)
        .await
        .context("failed to read back recent transactions")?;
    tracing::info!("main.summary: {} most recent stored transactions", recent.len());
    for tx in recent {
        tracing::info!(
            "main.summary: id={} amount={:.2} flagged={}",
            tx.id,
            tx.details.amount,
            tx.fraud_verdict.is_flagged()
        );
    }

    Ok(())
}
