//! Application Services
//!
//! - `RootResolver`: option root discovery and reference price extraction

mod root_resolver;

pub use root_resolver::{RootResolution, RootResolver};
