//! Application Ports (Driven)
//!
//! - `GatewayPort`: batched symbol lookups and alias pattern matches against
//!   the market data gateway

mod gateway_port;

pub use gateway_port::{
    GatewayError, GatewayPort, PatternQuery, RelationshipId, RequestBlock, ResponseBlock,
    ResponseStatus, SymbolQuery,
};

#[cfg(test)]
pub use gateway_port::MockGatewayPort;
