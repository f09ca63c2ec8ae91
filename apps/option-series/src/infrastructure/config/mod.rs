//! Configuration Module
//!
//! Run configuration for the option series resolver.

mod settings;

pub use settings::{ConfigError, DEFAULT_EXCHANGES, DEFAULT_FIELDS, DEFAULT_SYMBOL, SeriesConfig};
