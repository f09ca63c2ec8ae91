//! Option Series Domain
//!
//! Filter, bound predicates, root cracking, pattern building and contract
//! classification. Everything here is synchronous and free of I/O; gateway
//! access goes through the application layer's ports.

pub mod alias;
pub mod bounds;
pub mod contract;
pub mod errors;
pub mod filter;
pub mod pattern;
pub mod root;
pub mod universe;

pub use alias::{AliasEncoder, AliasError, WILDCARD_EXCHANGE};
pub use bounds::{Rejection, check_expiration, check_strike, expiration_passes, strike_passes};
pub use contract::{OPTION_TYPE_CALL, OPTION_TYPE_PUT, OptionInfo, OptionSide, classify};
pub use errors::{PatternError, StatusCode, UniverseError};
pub use filter::{CallPut, FilterError, OptionSeriesFilter};
pub use pattern::{
    Expansion, PatternBuilder, PatternPath, PatternPlan, RejectedCandidate, SearchPattern, SkippedAlias,
    TableId,
};
pub use root::{OptionRoot, ReferencePrice, RootSymbol};
