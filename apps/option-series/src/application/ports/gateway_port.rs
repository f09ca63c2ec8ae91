//! Market Data Gateway Port (Driven Port)
//!
//! Request/response interface to the gateway that lists option roots and
//! matches contract alias patterns. Every call is one batched round trip
//! that either completes with a list of response blocks or fails as a whole.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::fields::{FieldId, FieldList};
use crate::domain::option_series::{SearchPattern, StatusCode};

// =============================================================================
// Requests
// =============================================================================

/// Relationship between a requested record and the queried symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipId {
    /// The symbol's own record.
    None,
    /// Option roots listed under the symbol.
    OptionRoot,
}

/// Fields wanted from one relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBlock {
    /// Relationship to follow.
    pub relationship: RelationshipId,
    /// Fields to return.
    pub fields: Vec<FieldId>,
}

impl RequestBlock {
    /// Create a request block.
    #[must_use]
    pub const fn new(relationship: RelationshipId, fields: Vec<FieldId>) -> Self {
        Self {
            relationship,
            fields,
        }
    }
}

/// Symbol lookup with one or more request blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolQuery {
    /// Symbol to look up.
    pub symbol: String,
    /// Requested relationships and fields.
    pub blocks: Vec<RequestBlock>,
}

/// Pattern match against the option alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternQuery {
    /// Patterns, answered in order.
    pub patterns: Vec<SearchPattern>,
    /// Fields to return for every match.
    pub fields: Vec<FieldId>,
}

// =============================================================================
// Responses
// =============================================================================

/// Per-entry response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Entry carries data.
    Success,
    /// Symbol or pattern matched nothing.
    NotFound,
    /// Caller is not entitled to the record.
    NotPermissioned,
}

/// One entry of a gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBlock {
    /// Relationship the entry answers.
    pub relationship: RelationshipId,
    /// Response key.
    pub symbol: String,
    /// Entry status.
    pub status: ResponseStatus,
    /// Decoded fields, owned by this entry.
    pub fields: FieldList,
}

impl ResponseBlock {
    /// Successful entry.
    pub fn success(relationship: RelationshipId, symbol: impl Into<String>, fields: FieldList) -> Self {
        Self {
            relationship,
            symbol: symbol.into(),
            status: ResponseStatus::Success,
            fields,
        }
    }

    /// Entry for a key that matched nothing.
    pub fn not_found(relationship: RelationshipId, symbol: impl Into<String>) -> Self {
        Self {
            relationship,
            symbol: symbol.into(),
            status: ResponseStatus::NotFound,
            fields: FieldList::new(),
        }
    }

    /// Whether the entry carries usable data.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Gateway error. Any of these aborts the resolution that hit it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Gateway unreachable.
    #[error("gateway unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Gateway refused the request.
    #[error("gateway rejected request: {message}")]
    Rejected {
        /// Error details.
        message: String,
    },

    /// Fixture backing the gateway could not be loaded.
    #[error("gateway fixture error: {message}")]
    Fixture {
        /// Error details.
        message: String,
    },
}

impl GatewayError {
    /// Status code for this error.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        match self {
            Self::Rejected { .. } => StatusCode::InvalidParameter,
            Self::Unavailable { .. } | Self::Fixture { .. } => StatusCode::Failure,
        }
    }
}

/// Port to the market data gateway.
///
/// Implementations must answer request blocks in order and return one
/// owned field list per entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatewayPort: Send + Sync {
    /// Look up a symbol and the requested relationships.
    async fn send_root_query(&self, query: &SymbolQuery) -> Result<Vec<ResponseBlock>, GatewayError>;

    /// Match alias patterns.
    async fn send_pattern_match_query(
        &self,
        query: &PatternQuery,
    ) -> Result<Vec<ResponseBlock>, GatewayError>;
}
