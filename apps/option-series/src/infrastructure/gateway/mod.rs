//! Gateway Adapters
//!
//! - `InMemoryGateway`: table-backed [`GatewayPort`](crate::application::ports::GatewayPort)
//! - `GatewayFixture`: JSON fixtures that populate it

mod fixture;
mod in_memory;

pub use fixture::{ContractFixture, GatewayFixture, RootFixture, UnderlyingFixture};
pub use in_memory::{InMemoryGateway, RootListing, compile_pattern};
