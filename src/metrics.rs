//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // OAuth flow metrics
    pub static ref SIGNIN_REDIRECTS_TOTAL: IntCounter = IntCounter::new(
        "photon_signin_redirects_total",
        "Total number of redirects to the GitHub authorization page"
    ).expect("metric can be created");
    pub static ref OAUTH_CALLBACKS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("photon_oauth_callbacks_total", "Total number of OAuth callback requests"),
        &["outcome"]
    ).expect("metric can be created");

    // Session metrics
    pub static ref SESSIONS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "photon_sessions_created_total",
        "Total number of sessions established"
    ).expect("metric can be created");
    pub static ref SESSIONS_ACTIVE: IntGauge = IntGauge::new(
        "photon_sessions_active",
        "Current number of entries in the session store"
    ).expect("metric can be created");
    pub static ref SESSION_HITS_TOTAL: IntCounter = IntCounter::new(
        "photon_session_hits_total",
        "Total number of session store lookups that found a live entry"
    ).expect("metric can be created");
    pub static ref SESSION_MISSES_TOTAL: IntCounter = IntCounter::new(
        "photon_session_misses_total",
        "Total number of session store lookups that missed or hit an expired entry"
    ).expect("metric can be created");

    // Error metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("photon_errors_total", "Total number of errors returned to clients"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Register all instruments with the global registry.
///
/// Must be called exactly once at startup, before the first request.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(SIGNIN_REDIRECTS_TOTAL.clone()))
        .expect("SIGNIN_REDIRECTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(OAUTH_CALLBACKS_TOTAL.clone()))
        .expect("OAUTH_CALLBACKS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SESSIONS_CREATED_TOTAL.clone()))
        .expect("SESSIONS_CREATED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SESSIONS_ACTIVE.clone()))
        .expect("SESSIONS_ACTIVE can be registered");
    REGISTRY
        .register(Box::new(SESSION_HITS_TOTAL.clone()))
        .expect("SESSION_HITS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SESSION_MISSES_TOTAL.clone()))
        .expect("SESSION_MISSES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Metrics endpoint handler
///
/// Returns all metrics in Prometheus text format.
async fn metrics_handler() -> axum::response::Response {
    use axum::response::IntoResponse;
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_text) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, encoder.format_type())],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

/// Create metrics router
///
/// Exposes the `/metrics` endpoint.
pub fn metrics_router<S>() -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    axum::Router::new().route("/metrics", axum::routing::get(metrics_handler))
}
