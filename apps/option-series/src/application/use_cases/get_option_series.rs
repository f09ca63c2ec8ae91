//! Get Option Series Use Case
//!
//! Resolves the option contracts of an underlying in two strictly sequential
//! gateway round trips:
//!
//! 1. Root discovery (plus the reference price when at-the-money is asked)
//! 2. One batched pattern-match query built from every root's patterns
//!
//! Per-root and per-entry problems are logged and skipped. Only invalid
//! requests and gateway failures fail the call.

use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::{GatewayError, GatewayPort, PatternQuery};
use crate::application::services::RootResolver;
use crate::domain::fields::FieldId;
use crate::domain::option_series::{
    AliasEncoder, OptionInfo, OptionSeriesFilter, PatternBuilder, RejectedCandidate,
    ReferencePrice, SearchPattern, SkippedAlias, StatusCode, classify,
};
use crate::infrastructure::metrics::{self, DropReason};

/// Fields the classifier reads, appended to every pattern-match request.
const CLASSIFIER_FIELDS: [FieldId; 3] = [
    FieldId::OPTION_TYPE,
    FieldId::STRIKE_PRICE,
    FieldId::EXPIRATION_DATE,
];

/// Resolution error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    /// Gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Request rejected before any query was issued.
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Error details.
        message: String,
    },
}

impl SeriesError {
    /// Status code for this error.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        match self {
            Self::Gateway(e) => e.code(),
            Self::InvalidParameter { .. } => StatusCode::InvalidParameter,
        }
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSeries {
    /// Classified contracts in response order.
    pub contracts: Vec<OptionInfo>,
    /// Reference price used for classification.
    pub reference_price: ReferencePrice,
    /// Patterns sent to the pattern-match query, empty if it was skipped.
    pub patterns: Vec<SearchPattern>,
}

/// Use case resolving the filtered option series of an underlying.
pub struct GetOptionSeriesUseCase<G, A>
where
    G: GatewayPort + ?Sized,
    A: AliasEncoder,
{
    gateway: Arc<G>,
    builder: PatternBuilder<A>,
}

impl<G, A> GetOptionSeriesUseCase<G, A>
where
    G: GatewayPort + ?Sized,
    A: AliasEncoder,
{
    /// Create a new `GetOptionSeriesUseCase`.
    pub const fn new(gateway: Arc<G>, builder: PatternBuilder<A>) -> Self {
        Self { gateway, builder }
    }

    /// Resolve the option series of `underlying`.
    ///
    /// `output_fields` are returned for every contract; the option type,
    /// strike and expiration are always requested as well.
    ///
    /// # Errors
    ///
    /// - [`SeriesError::InvalidParameter`] for an empty underlying
    /// - [`SeriesError::Gateway`] if either gateway call fails
    #[tracing::instrument(skip_all, fields(underlying = %underlying))]
    pub async fn execute(
        &self,
        underlying: &str,
        filter: &OptionSeriesFilter,
        output_fields: &[FieldId],
    ) -> Result<OptionSeries, SeriesError> {
        let started = Instant::now();
        let result = self.resolve(underlying, filter, output_fields).await;

        let code = result.as_ref().map_or_else(SeriesError::code, |_| StatusCode::Success);
        metrics::record_resolution(code, started.elapsed());

        match &result {
            Ok(series) => tracing::info!(
                contracts = series.contracts.len(),
                patterns = series.patterns.len(),
                reference_price = %series.reference_price,
                "Option series resolved"
            ),
            Err(e) => tracing::warn!(code = %e.code(), error = %e, "Option series resolution failed"),
        }

        result
    }

    async fn resolve(
        &self,
        underlying: &str,
        filter: &OptionSeriesFilter,
        output_fields: &[FieldId],
    ) -> Result<OptionSeries, SeriesError> {
        validate(underlying)?;

        let resolution = RootResolver::new(self.gateway.as_ref())
            .resolve(underlying, filter.at_the_money())
            .await?;
        let reference_price = resolution.reference_price;
        tracing::debug!(
            roots = resolution.roots.len(),
            reference_price = %reference_price,
            "Option roots resolved"
        );

        let mut patterns = Vec::new();
        for root in &resolution.roots {
            match self.builder.build(root, filter, reference_price) {
                Ok(plan) => {
                    tracing::debug!(
                        root = root.symbol(),
                        path = plan.path.as_str(),
                        patterns = plan.patterns.len(),
                        "Patterns built"
                    );
                    for rejected in &plan.rejected {
                        log_rejection(root.symbol(), rejected);
                    }
                    for skipped in &plan.skipped {
                        log_skipped_alias(root.symbol(), skipped);
                    }
                    metrics::record_patterns(plan.path, plan.patterns.len());
                    patterns.extend(plan.patterns);
                }
                Err(e) => {
                    tracing::warn!(root = root.symbol(), code = %e.code(), error = %e, "Skipping option root");
                }
            }
        }

        if patterns.is_empty() {
            return Ok(OptionSeries {
                contracts: Vec::new(),
                reference_price,
                patterns,
            });
        }

        let query = PatternQuery {
            patterns,
            fields: requested_fields(output_fields),
        };
        let entries = self.gateway.send_pattern_match_query(&query).await?;

        let mut contracts = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_valid() {
                tracing::debug!(symbol = %entry.symbol, status = ?entry.status, "Skipping invalid entry");
                metrics::record_entry_dropped(DropReason::Invalid);
                continue;
            }
            match classify(entry.symbol.as_str(), &entry.fields, reference_price) {
                Ok(info) => contracts.push(info),
                Err(e) => {
                    tracing::warn!(symbol = %entry.symbol, error = %e, "Dropping undecodable contract");
                    metrics::record_entry_dropped(DropReason::Decode);
                }
            }
        }
        metrics::record_contracts(contracts.len());

        Ok(OptionSeries {
            contracts,
            reference_price,
            patterns: query.patterns,
        })
    }
}

/// The at-the-money range is checked when the filter is built.
fn validate(underlying: &str) -> Result<(), SeriesError> {
    if underlying.trim().is_empty() {
        return Err(SeriesError::InvalidParameter {
            message: "underlying symbol is empty".to_string(),
        });
    }
    Ok(())
}

/// Output fields followed by any classifier field not already present.
fn requested_fields(output_fields: &[FieldId]) -> Vec<FieldId> {
    let mut fields = output_fields.to_vec();
    for id in CLASSIFIER_FIELDS {
        if !fields.contains(&id) {
            fields.push(id);
        }
    }
    fields
}

fn log_rejection(root: &str, rejected: &RejectedCandidate) {
    match rejected {
        RejectedCandidate::Expiration(date, reason) => {
            tracing::debug!(root, %date, reason = reason.as_str(), code = %reason.code(), "Expiration out of range");
        }
        RejectedCandidate::Strike(strike, reason) => {
            tracing::debug!(root, %strike, reason = reason.as_str(), code = %reason.code(), "Strike out of range");
        }
    }
}

fn log_skipped_alias(root: &str, skipped: &SkippedAlias) {
    tracing::warn!(
        root,
        expiration = %skipped.expiration,
        strike = %skipped.strike,
        side = %skipped.side,
        exchange = %skipped.exchange,
        error = %skipped.error,
        "Skipping unencodable combination"
    );
}
