//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define matcher metrics (classifications, cache activity, loads)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `matcher_classifications_total` (counter): classifications by outcome
//! - `matcher_classification_duration_seconds` (histogram): lookup + classify latency
//! - `matcher_cache_lookups_total` (counter): lookups by result (hit/miss)
//! - `matcher_campaign_loads_total` (counter): loads by outcome (ok/error)
//! - `matcher_cache_evictions_total` (counter): evictions by reason
//! - `matcher_cached_campaigns` (gauge): campaigns currently cached
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels are low-cardinality: no campaign or stage names

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one classification. `outcome` is "matched", "fallback", "unknown"
/// or "not_found".
pub fn record_classification(outcome: &'static str, start: Instant) {
    counter!("matcher_classifications_total", "outcome" => outcome).increment(1);
    histogram!("matcher_classification_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("matcher_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_campaign_load(success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!("matcher_campaign_loads_total", "outcome" => outcome).increment(1);
}

pub fn record_eviction(reason: &'static str) {
    counter!("matcher_cache_evictions_total", "reason" => reason).increment(1);
}

pub fn record_cache_size(size: usize) {
    gauge!("matcher_cached_campaigns").set(size as f64);
}
