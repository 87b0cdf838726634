//! Event loop and runtime assembly.
//!
//! [`EventLoop`] drains a stream of envelopes into a [`Dispatcher`], logging
//! and counting failures without ever stopping on one. [`QbotRuntime`] wires
//! configuration, logging, the API client and the event loop together.
//!
//! ```rust,ignore
//! use qbot_runtime::QbotRuntime;
//!
//! let runtime = QbotRuntime::builder().profile("production").build()?;
//! let api = runtime.api()?;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.on_at_message(move |_, msg| { /* reply through `api` */ });
//!
//! // Runs until the source ends or Ctrl+C.
//! let stats = runtime.run(registry, envelopes).await?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{Stream, StreamExt, stream};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use qbot_core::{DispatchError, Dispatcher, Envelope, HandlerRegistry, lookup};
use qbot_openapi::HttpMessageApi;

use crate::config::{ConfigLoader, DispatchConfig, QbotConfig};
use crate::error::RuntimeResult;
use crate::logging;

// =============================================================================
// Statistics
// =============================================================================

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    unrouted: AtomicU64,
    decode_failures: AtomicU64,
    handler_failures: AtomicU64,
}

/// Snapshot of event loop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Envelopes taken from the source.
    pub dispatched: u64,
    /// Envelopes with no route (sent to `plain` or dropped).
    pub unrouted: u64,
    /// Envelopes whose body failed to decode.
    pub decode_failures: u64,
    /// Envelopes whose handler returned an error.
    pub handler_failures: u64,
}

impl RuntimeStats {
    /// Decode and handler failures together.
    pub fn failures(&self) -> u64 {
        self.decode_failures + self.handler_failures
    }
}

impl fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Envelopes: {} dispatched ({} unrouted), {} decode failures, {} handler failures",
            self.dispatched, self.unrouted, self.decode_failures, self.handler_failures
        )
    }
}

// =============================================================================
// EventLoop
// =============================================================================

/// Feeds envelopes from a source into a [`Dispatcher`].
pub struct EventLoop {
    dispatcher: Dispatcher,
    concurrency: usize,
    log_unhandled: bool,
    counters: Arc<Counters>,
    shutdown: CancellationToken,
}

impl EventLoop {
    /// Creates an event loop with the given dispatch settings.
    pub fn new(dispatcher: Dispatcher, config: &DispatchConfig) -> Self {
        Self {
            dispatcher,
            concurrency: config.concurrency.max(1),
            log_unhandled: config.log_unhandled,
            counters: Arc::new(Counters::default()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop the loop instead of the loop's own token.
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Token that stops the loop when cancelled.
    ///
    /// Envelopes already being dispatched are finished; no new ones are taken.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// The dispatcher envelopes are fed into.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Current counter values.
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            unrouted: self.counters.unrouted.load(Ordering::Relaxed),
            decode_failures: self.counters.decode_failures.load(Ordering::Relaxed),
            handler_failures: self.counters.handler_failures.load(Ordering::Relaxed),
        }
    }

    /// Dispatches every envelope of `envelopes` until it ends or the loop is
    /// shut down, then returns the counters.
    pub async fn run<S>(&self, envelopes: S) -> RuntimeStats
    where
        S: Stream<Item = Envelope>,
    {
        info!(concurrency = self.concurrency, "Event loop started");

        let envelopes = envelopes.take_until(self.shutdown.cancelled());
        if self.concurrency > 1 {
            envelopes
                .for_each_concurrent(self.concurrency, |envelope| self.handle(envelope))
                .await;
        } else {
            envelopes.for_each(|envelope| self.handle(envelope)).await;
        }

        let stats = self.stats();
        info!(%stats, "Event loop stopped");
        stats
    }

    /// Like [`EventLoop::run`], reading from a channel until every sender is
    /// dropped.
    pub async fn run_channel(&self, receiver: mpsc::Receiver<Envelope>) -> RuntimeStats {
        let envelopes = stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|envelope| (envelope, receiver))
        });
        self.run(envelopes).await
    }

    async fn handle(&self, envelope: Envelope) {
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);

        let op = envelope.op;
        let event_type = envelope.event_type.clone();
        let seq = envelope.seq;

        if lookup(op, &event_type).is_none() {
            self.counters.unrouted.fetch_add(1, Ordering::Relaxed);
            if self.log_unhandled {
                info!(%op, %event_type, ?seq, "Envelope has no route");
            }
        }

        match self.dispatcher.dispatch(envelope).await {
            Ok(()) => {}
            Err(DispatchError::Decode(e)) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(%op, %event_type, ?seq, error = %e, "Failed to decode envelope");
            }
            Err(DispatchError::Handler(e)) => {
                self.counters.handler_failures.fetch_add(1, Ordering::Relaxed);
                error!(%op, %event_type, ?seq, error = %e, "Handler failed");
            }
        }
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("dispatcher", &self.dispatcher)
            .field("concurrency", &self.concurrency)
            .field("stats", &self.stats())
            .finish()
    }
}

// =============================================================================
// QbotRuntime
// =============================================================================

/// Configuration, logging, API client and event loop in one place.
#[derive(Debug, Clone)]
pub struct QbotRuntime {
    config: QbotConfig,
}

impl QbotRuntime {
    /// Creates a runtime from the default configuration locations.
    ///
    /// Falls back to built-in defaults if loading fails.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .with_user_config_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                QbotConfig::default()
            });

        Self::from_config(config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from a loaded configuration and initializes logging.
    pub fn from_config(config: QbotConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            sandbox = config.bot.sandbox,
            "Runtime initialized from configuration"
        );

        Self { config }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &QbotConfig {
        &self.config
    }

    /// Builds the message API client from `bot` settings.
    pub fn api(&self) -> RuntimeResult<HttpMessageApi> {
        let bot = &self.config.bot;
        let api = HttpMessageApi::with_timeout(bot.credentials(), bot.timeout())?
            .sandbox(bot.sandbox);
        debug!(base_url = api.base_url(), "Message API client ready");
        Ok(api)
    }

    /// Builds an event loop over `registry` with `dispatch` settings.
    pub fn event_loop(&self, registry: HandlerRegistry) -> EventLoop {
        EventLoop::new(Dispatcher::new(registry), &self.config.dispatch)
    }

    /// Runs `registry` over `envelopes` until the source ends or Ctrl+C /
    /// SIGTERM is received.
    pub async fn run<S>(&self, registry: HandlerRegistry, envelopes: S) -> RuntimeResult<RuntimeStats>
    where
        S: Stream<Item = Envelope>,
    {
        let event_loop = self.event_loop(registry);
        let token = event_loop.shutdown_token();

        let watcher = tokio::spawn(async move {
            match wait_for_shutdown().await {
                Ok(()) => token.cancel(),
                Err(e) => warn!(error = %e, "Failed to listen for shutdown signals"),
            }
        });

        let stats = event_loop.run(envelopes).await;
        watcher.abort();
        Ok(stats)
    }
}

impl Default for QbotRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`QbotRuntime`] with custom configuration.
///
/// ```rust,ignore
/// let runtime = QbotRuntime::builder()
///     .config_file("config/qbot.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder that searches the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: QbotConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<QbotRuntime> {
        let config = self.config_loader.load()?;
        Ok(QbotRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbot_core::{EventType, OpCode};
    use std::sync::Mutex;
    use std::time::Duration;

    fn envelope(event_type: EventType, raw: &str) -> Envelope {
        Envelope::new(OpCode::Dispatch, event_type, raw.as_bytes().to_vec())
    }

    fn config(concurrency: usize) -> DispatchConfig {
        DispatchConfig {
            concurrency,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_loop_continues_past_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut registry = HandlerRegistry::new();
        registry.on_message(move |_, msg| {
            let sink = Arc::clone(&sink);
            async move {
                if msg.content == "boom" {
                    anyhow::bail!("handler refused {}", msg.id);
                }
                sink.lock().unwrap().push(msg.id);
                Ok(())
            }
        });

        let event_loop = EventLoop::new(Dispatcher::new(registry), &config(1));
        let envelopes = stream::iter(vec![
            envelope(EventType::MessageCreate, r#"{"d":{"id":"m1"}}"#),
            envelope(EventType::MessageCreate, r#"{"d":{"id":42}}"#),
            envelope(EventType::MessageCreate, r#"{"d":{"id":"m2","content":"boom"}}"#),
            envelope(EventType::Ready, r#"{"d":{}}"#),
            envelope(EventType::MessageCreate, r#"{"d":{"id":"m3"}}"#),
        ]);

        let stats = event_loop.run(envelopes).await;

        assert_eq!(*seen.lock().unwrap(), vec!["m1", "m3"]);
        assert_eq!(
            stats,
            RuntimeStats {
                dispatched: 5,
                unrouted: 1,
                decode_failures: 1,
                handler_failures: 1,
            }
        );
        assert_eq!(stats.failures(), 2);
        assert_eq!(event_loop.stats(), stats);
    }

    #[tokio::test]
    async fn test_concurrent_loop_dispatches_everything() {
        let count = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&count);

        let mut registry = HandlerRegistry::new();
        registry.on_group_at_message(move |_, _| {
            let c = Arc::clone(&c);
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let event_loop = EventLoop::new(Dispatcher::new(registry), &config(4));
        let envelopes = stream::iter(
            (0..16)
                .map(|i| {
                    envelope(
                        EventType::GroupAtMessageCreate,
                        &format!(r#"{{"d":{{"id":"m{i}"}}}}"#),
                    )
                })
                .collect::<Vec<_>>(),
        );

        let stats = event_loop.run(envelopes).await;
        assert_eq!(stats.dispatched, 16);
        assert_eq!(count.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn test_run_channel_until_senders_drop() {
        let event_loop = EventLoop::new(Dispatcher::new(HandlerRegistry::new()), &config(1));
        let (tx, rx) = mpsc::channel(8);

        tx.send(envelope(EventType::GuildCreate, r#"{"d":{"id":"g1"}}"#))
            .await
            .unwrap();
        tx.send(envelope(EventType::GuildCreate, "garbage"))
            .await
            .unwrap();
        drop(tx);

        let stats = event_loop.run_channel(rx).await;
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.decode_failures, 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let event_loop = EventLoop::new(Dispatcher::new(HandlerRegistry::new()), &config(1));
        let (tx, rx) = mpsc::channel(8);
        tx.send(envelope(EventType::Resumed, "{}")).await.unwrap();

        let token = event_loop.shutdown_token();
        let stopper = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        };

        // The sender stays alive, so only the token can end the loop.
        let (stats, ()) = tokio::join!(event_loop.run_channel(rx), stopper);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.unrouted, 1);
        drop(tx);
    }

    #[test]
    fn test_stats_display() {
        let stats = RuntimeStats {
            dispatched: 3,
            unrouted: 1,
            decode_failures: 1,
            handler_failures: 0,
        };
        assert_eq!(
            stats.to_string(),
            "Envelopes: 3 dispatched (1 unrouted), 1 decode failures, 0 handler failures"
        );
    }

    #[test]
    fn test_runtime_builds_api_client() {
        let mut config = QbotConfig::default();
        config.bot.app_id = "101".into();
        config.bot.token = "secret".into();
        config.bot.sandbox = true;

        let runtime = QbotRuntime::from_config(config);
        let api = runtime.api().unwrap();
        assert_eq!(api.base_url(), qbot_openapi::SANDBOX_BASE_URL);
    }
}
