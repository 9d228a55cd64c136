//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("growathlete_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "growathlete_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Graph Metrics
    pub static ref GRAPH_OPERATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("growathlete_graph_operations_total", "Follow graph mutations by outcome"),
        &["operation", "outcome"]
    ).expect("metric can be created");
    pub static ref STORAGE_RETRIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("growathlete_storage_retries_total", "Graph operations retried after a transient storage error"),
        &["operation"]
    ).expect("metric can be created");
    pub static ref GRAPH_DRIFT_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("growathlete_graph_drift_total", "Stored follow counters found to disagree with the edge table"),
        &["field"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("growathlete_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
            .expect("HTTP_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
            .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(GRAPH_OPERATIONS_TOTAL.clone()))
            .expect("GRAPH_OPERATIONS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(STORAGE_RETRIES_TOTAL.clone()))
            .expect("STORAGE_RETRIES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(GRAPH_DRIFT_TOTAL.clone()))
            .expect("GRAPH_DRIFT_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}
