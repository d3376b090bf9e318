//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    EMAILS_SENT_TOTAL, RECIPIENTS_PER_SEND, RENDERS_TOTAL, RENDER_DURATION, RENDER_ERRORS_TOTAL,
    SEND_FAILURES_TOTAL, TEMPLATE_CACHE_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording render metrics
pub struct RenderMetrics;

impl RenderMetrics {
    /// Record a successful render
    pub fn record_success(elapsed: Duration) {
        RENDERS_TOTAL.with_label_values(&["success"]).inc();
        RENDER_DURATION
            .with_label_values(&["success"])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a failed render with its error kind
    pub fn record_failure(kind: &str, elapsed: Duration) {
        RENDERS_TOTAL.with_label_values(&["error"]).inc();
        RENDER_ERRORS_TOTAL.with_label_values(&[kind]).inc();
        RENDER_DURATION
            .with_label_values(&["error"])
            .observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for recording compiled-template cache metrics
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit() {
        TEMPLATE_CACHE_TOTAL.with_label_values(&["hit"]).inc();
    }

    pub fn record_miss() {
        TEMPLATE_CACHE_TOTAL.with_label_values(&["miss"]).inc();
    }
}

/// Helper struct for recording send metrics
pub struct SendMetrics;

impl SendMetrics {
    /// Record an email accepted by a transport
    pub fn record_sent(transport: &str, recipients: usize) {
        EMAILS_SENT_TOTAL.with_label_values(&[transport]).inc();
        RECIPIENTS_PER_SEND.observe(recipients as f64);
    }

    /// Record a send that failed before or during delivery
    pub fn record_failure(reason: &str) {
        SEND_FAILURES_TOTAL.with_label_values(&[reason]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics() {
        RenderMetrics::record_success(Duration::from_millis(3));
        RenderMetrics::record_failure("compile", Duration::from_millis(1));
        // Just verify no panics
    }

    #[test]
    fn test_cache_metrics() {
        CacheMetrics::record_miss();
        CacheMetrics::record_hit();
        assert!(TEMPLATE_CACHE_TOTAL.with_label_values(&["hit"]).get() >= 1);
    }

    #[test]
    fn test_send_metrics() {
        SendMetrics::record_sent("log", 3);
        SendMetrics::record_failure("confirmation");
        // Just verify no panics
    }
}
