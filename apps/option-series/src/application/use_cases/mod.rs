//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod get_option_series;

pub use get_option_series::{GetOptionSeriesUseCase, OptionSeries, SeriesError};
