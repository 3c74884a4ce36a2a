//! Prometheus metrics for the bot.
//!
//! Counters are created lazily on first use so tests and the binary share the
//! same code path.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

struct BotMetrics {
    registry: Registry,
    messages_total: IntCounterVec,
    translations_total: IntCounterVec,
    backend_calls_total: IntCounterVec,
    rate_limited_total: IntCounter,
}

static METRICS: OnceLock<BotMetrics> = OnceLock::new();

fn metrics() -> &'static BotMetrics {
    METRICS.get_or_init(|| {
        let registry = Registry::new();

        // Incoming messages by classification or command
        let messages_total = IntCounterVec::new(
            Opts::new("bot_messages_total", "Total messages handled by kind"),
            &["kind"],
        )
        .expect("Failed to create bot_messages_total metric");

        let translations_total = IntCounterVec::new(
            Opts::new(
                "bot_translations_total",
                "Total translation attempts by direction and status",
            ),
            &["direction", "status"],
        )
        .expect("Failed to create bot_translations_total metric");

        let backend_calls_total = IntCounterVec::new(
            Opts::new(
                "bot_backend_calls_total",
                "Total external backend calls by backend and status",
            ),
            &["backend", "status"],
        )
        .expect("Failed to create bot_backend_calls_total metric");

        let rate_limited_total = IntCounter::new(
            "bot_rate_limited_total",
            "Total messages rejected by the per-user rate limiter",
        )
        .expect("Failed to create bot_rate_limited_total metric");

        registry
            .register(Box::new(messages_total.clone()))
            .expect("Failed to register bot_messages_total");
        registry
            .register(Box::new(translations_total.clone()))
            .expect("Failed to register bot_translations_total");
        registry
            .register(Box::new(backend_calls_total.clone()))
            .expect("Failed to register bot_backend_calls_total");
        registry
            .register(Box::new(rate_limited_total.clone()))
            .expect("Failed to register bot_rate_limited_total");

        BotMetrics {
            registry,
            messages_total,
            translations_total,
            backend_calls_total,
            rate_limited_total,
        }
    })
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    let _ = metrics();
}

pub fn record_message(kind: &str) {
    metrics().messages_total.with_label_values(&[kind]).inc();
}

pub fn record_translation(direction: &str, status: &str) {
    metrics()
        .translations_total
        .with_label_values(&[direction, status])
        .inc();
}

pub fn record_backend_call(backend: &str, status: &str) {
    metrics()
        .backend_calls_total
        .with_label_values(&[backend, status])
        .inc();
}

pub fn record_rate_limited() {
    metrics().rate_limited_total.inc();
}

/// Render all metrics in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&metrics().registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
