//! Prometheus metrics for the mail composer.
//!
//! - Render metrics (outcomes, failures by kind, latency)
//! - Compiled-template cache metrics
//! - Send metrics (accepted emails per transport, failures, recipients per send)

mod helpers;

pub use helpers::{encode_metrics, CacheMetrics, RenderMetrics, SendMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Histogram,
    HistogramVec, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "mailer";

lazy_static! {
    // ============================================================================
    // Render Metrics
    // ============================================================================

    /// Total renders by outcome (success, error)
    pub static ref RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_renders_total", METRIC_PREFIX),
        "Total template renders",
        &["outcome"]
    ).unwrap();

    /// Failed renders by error kind
    pub static ref RENDER_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_render_errors_total", METRIC_PREFIX),
        "Total failed renders by error kind",
        &["kind"]
    ).unwrap();

    /// Render latency in seconds
    pub static ref RENDER_DURATION: HistogramVec = register_histogram_vec!(
        format!("{}_render_duration_seconds", METRIC_PREFIX),
        "Template render latency in seconds",
        &["outcome"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    ).unwrap();

    // ============================================================================
    // Cache Metrics
    // ============================================================================

    /// Compiled-template cache lookups by result (hit, miss)
    pub static ref TEMPLATE_CACHE_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_cache_total", METRIC_PREFIX),
        "Compiled template cache lookups",
        &["result"]
    ).unwrap();

    // ============================================================================
    // Send Metrics
    // ============================================================================

    /// Emails accepted by a transport
    pub static ref EMAILS_SENT_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_emails_sent_total", METRIC_PREFIX),
        "Total emails accepted by the transport",
        &["transport"]
    ).unwrap();

    /// Failed sends by reason
    pub static ref SEND_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_send_failures_total", METRIC_PREFIX),
        "Total failed sends by reason",
        &["reason"]
    ).unwrap();

    /// Recipients per accepted send
    pub static ref RECIPIENTS_PER_SEND: Histogram = register_histogram!(
        format!("{}_recipients_per_send", METRIC_PREFIX),
        "Distribution of recipients per send",
        vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]
    ).unwrap();
}
