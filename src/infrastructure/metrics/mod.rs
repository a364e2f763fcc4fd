//! Prometheus Metrics
//!
//! Process-wide counters and histograms exposed on `GET /metrics`.
//!
//! # Metrics Collected
//! - HTTP request counts by method, matched route, and status
//! - HTTP request latency histograms
//! - Telegram auth codes issued and verification outcomes
//! - Auth codes purged by the janitor

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "starsclub";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("static metric definition is valid")
});

pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("static metric definition is valid")
});

/// Codes handed out by the bot in reply to `/start`.
pub static AUTH_CODES_ISSUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("auth_codes_issued_total", "Telegram auth codes issued").namespace(NAMESPACE),
    )
    .expect("static metric definition is valid")
});

/// Verification attempts by outcome: "success", "invalid", "error".
pub static AUTH_CODES_VERIFIED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("auth_code_verifications_total", "Telegram auth code verifications")
            .namespace(NAMESPACE),
        &["outcome"],
    )
    .expect("static metric definition is valid")
});

pub static JANITOR_PURGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("auth_codes_purged_total", "Used or expired auth codes deleted")
            .namespace(NAMESPACE),
    )
    .expect("static metric definition is valid")
});

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
        Box::new(AUTH_CODES_ISSUED.clone()),
        Box::new(AUTH_CODES_VERIFIED.clone()),
        Box::new(JANITOR_PURGED.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            tracing::error!(error = %e, "Failed to register metric");
        }
    }
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn record_code_issued() {
    AUTH_CODES_ISSUED.inc();
}

pub fn record_code_verification(outcome: &str) {
    AUTH_CODES_VERIFIED.with_label_values(&[outcome]).inc();
}

pub fn record_codes_purged(count: u64) {
    JANITOR_PURGED.inc_by(count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("starsclub_http_requests_total"));
    }

    #[test]
    fn test_auth_code_counters_are_exported() {
        record_code_issued();
        record_code_verification("success");
        record_codes_purged(3);

        let metrics = gather_metrics();
        assert!(metrics.contains("starsclub_auth_codes_issued_total"));
        assert!(metrics.contains("outcome=\"success\""));
        assert!(metrics.contains("starsclub_auth_codes_purged_total"));
    }
}
