//! Domain Layer - Option series types and resolution rules.
//!
//! Pure Rust with serialization support and no I/O. Gateway responses enter
//! this layer as owned [`fields::FieldList`] values.

/// Typed gateway field lists.
pub mod fields;

/// Filters, pattern building and contract classification.
pub mod option_series;
