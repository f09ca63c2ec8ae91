#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Option Series - Filtered Option Chain Resolver
//!
//! Resolves the option contracts listed under an underlying symbol against a
//! market data gateway, narrowed by a declarative filter (expiration window,
//! strike window, call/put, exchanges, at-the-money range).
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure resolution logic, no I/O
//!   - `fields`: Gateway field identifiers and typed values
//!   - `option_series`: Filter, bounds, universes, patterns, classification
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Gateway query interface
//!   - `services`: Option root discovery
//!   - `use_cases`: End-to-end series resolution
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `alias`: `ROOT/YYMDD/STRIKE.EXCH` alias encoding
//!   - `gateway`: In-memory gateway loaded from JSON fixtures
//!   - `config`: Environment configuration
//!   - `metrics`, `telemetry`: Observability
//!
//! # Data Flow
//!
//! ```text
//! underlying ──► root query ──► option roots (+ reference price)
//!                                   │
//!                                   ▼
//!                      pattern builder (fast or slow path)
//!                                   │
//!                                   ▼
//!               one batched pattern-match query ──► classified contracts
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Resolution types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::fields::{FieldError, FieldId, FieldList, FieldState, FieldValue};
pub use domain::option_series::{
    AliasEncoder, AliasError, CallPut, Expansion, FilterError, OptionInfo, OptionRoot,
    OptionSeriesFilter, OptionSide, PatternBuilder, PatternError, PatternPath, PatternPlan,
    ReferencePrice, SearchPattern, StatusCode, TableId, WILDCARD_EXCHANGE,
};

// Application
pub use application::ports::{
    GatewayError, GatewayPort, PatternQuery, RelationshipId, RequestBlock, ResponseBlock,
    ResponseStatus, SymbolQuery,
};
pub use application::use_cases::{GetOptionSeriesUseCase, OptionSeries, SeriesError};

// Infrastructure
pub use infrastructure::alias::SlashAliasEncoder;
pub use infrastructure::config::{ConfigError, SeriesConfig};
pub use infrastructure::gateway::{GatewayFixture, InMemoryGateway, RootListing};
pub use infrastructure::metrics::init_metrics;
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
