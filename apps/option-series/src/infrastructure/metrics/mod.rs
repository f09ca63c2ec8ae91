//! Prometheus Metrics Module
//!
//! Records resolution metrics through the `metrics` facade. The binary
//! installs a Prometheus recorder and can print the exposition after a run;
//! without a recorder every call here is a no-op.
//!
//! # Metrics
//!
//! - `option_series_resolutions_total{outcome}`
//! - `option_series_patterns_total{path}`
//! - `option_series_contracts_total`
//! - `option_series_entries_dropped_total{reason}`
//! - `option_series_resolution_seconds`

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::domain::option_series::{PatternPath, StatusCode};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register metric descriptions.
///
/// Later calls return the handle installed by the first one.
///
/// # Errors
///
/// Returns [`BuildError`] if another recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "option_series_resolutions_total",
        "Total option series resolutions by outcome"
    );
    describe_counter!(
        "option_series_patterns_total",
        "Total search patterns built by path"
    );
    describe_counter!(
        "option_series_contracts_total",
        "Total option contracts classified"
    );
    describe_counter!(
        "option_series_entries_dropped_total",
        "Total pattern-match entries dropped by reason"
    );
    describe_histogram!(
        "option_series_resolution_seconds",
        "End-to-end resolution latency"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Reasons a pattern-match entry is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Entry status was not valid.
    Invalid,
    /// Entry fields could not be classified.
    Decode,
}

impl DropReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Decode => "decode",
        }
    }
}

const fn outcome_label(code: StatusCode) -> &'static str {
    match code {
        StatusCode::Success => "success",
        StatusCode::Failure => "failure",
        StatusCode::InvalidParameter => "invalid_parameter",
        StatusCode::OutOfRange => "out_of_range",
        StatusCode::NoMatch => "no_match",
    }
}

/// Record a finished resolution.
pub fn record_resolution(code: StatusCode, duration: Duration) {
    counter!(
        "option_series_resolutions_total",
        "outcome" => outcome_label(code)
    )
    .increment(1);
    histogram!("option_series_resolution_seconds").record(duration.as_secs_f64());
}

/// Record patterns built for one root.
pub fn record_patterns(path: PatternPath, count: usize) {
    counter!(
        "option_series_patterns_total",
        "path" => path.as_str()
    )
    .increment(counter_value(count));
}

/// Record classified contracts.
pub fn record_contracts(count: usize) {
    counter!("option_series_contracts_total").increment(counter_value(count));
}

fn counter_value(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Record a dropped pattern-match entry.
pub fn record_entry_dropped(reason: DropReason) {
    counter!(
        "option_series_entries_dropped_total",
        "reason" => reason.as_str()
    )
    .increment(1);
}

// =============================================================================
// Tests
// =============================================================================
