//! Application Layer - Use cases and port definitions.
//!
//! Orchestrates the two-phase option series resolution over the gateway
//! port defined here.

/// Port interfaces for the market data gateway.
pub mod ports;

/// Application services used by the use cases.
pub mod services;

/// Outward operations.
pub mod use_cases;
