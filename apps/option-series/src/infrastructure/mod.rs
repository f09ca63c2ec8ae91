//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Slash-delimited option alias encoding.
pub mod alias;

/// Environment-based run configuration.
pub mod config;

/// In-memory market data gateway and JSON fixtures.
pub mod gateway;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
