//! Root Resolver
//!
//! First phase of a resolution: list the option roots of an underlying and,
//! when asked, read the underlying's reference price from the same batched
//! query.

use crate::application::ports::{
    GatewayError, GatewayPort, RelationshipId, RequestBlock, ResponseBlock, SymbolQuery,
};
use crate::domain::fields::FieldId;
use crate::domain::option_series::{OptionRoot, ReferencePrice};

/// Roots discovered for an underlying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootResolution {
    /// Valid option roots in response order.
    pub roots: Vec<OptionRoot>,
    /// Reference price, zero when not requested or unavailable.
    pub reference_price: ReferencePrice,
}

/// Resolves option roots through a [`GatewayPort`].
#[derive(Debug)]
pub struct RootResolver<'a, G: ?Sized> {
    gateway: &'a G,
}

impl<'a, G: GatewayPort + ?Sized> RootResolver<'a, G> {
    /// Create a resolver over `gateway`.
    pub const fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Build the root discovery query.
    #[must_use]
    pub fn query(underlying: &str, want_reference_price: bool) -> SymbolQuery {
        let mut blocks = vec![RequestBlock::new(
            RelationshipId::OptionRoot,
            vec![FieldId::STRIKE_PRICE_LIST, FieldId::EXPIRATION_DATE_LIST],
        )];
        if want_reference_price {
            blocks.push(RequestBlock::new(
                RelationshipId::None,
                vec![FieldId::TRADE, FieldId::CLOSE],
            ));
        }
        SymbolQuery {
            symbol: underlying.to_string(),
            blocks,
        }
    }

    /// Discover the roots of `underlying`.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error unchanged; no partial result is kept.
    pub async fn resolve(
        &self,
        underlying: &str,
        want_reference_price: bool,
    ) -> Result<RootResolution, GatewayError> {
        let query = Self::query(underlying, want_reference_price);
        let blocks = self.gateway.send_root_query(&query).await?;

        let reference_price = if want_reference_price {
            reference_price(&blocks)
        } else {
            ReferencePrice::ZERO
        };

        let roots = blocks
            .into_iter()
            .filter(|block| block.is_valid() && block.relationship == RelationshipId::OptionRoot)
            .map(|block| OptionRoot::new(block.symbol, block.fields))
            .collect();

        Ok(RootResolution {
            roots,
            reference_price,
        })
    }
}

/// Reference price from the first valid underlying entry.
fn reference_price(blocks: &[ResponseBlock]) -> ReferencePrice {
    let Some(underlying) = blocks
        .iter()
        .find(|block| block.is_valid() && block.relationship == RelationshipId::None)
    else {
        return ReferencePrice::ZERO;
    };

    match ReferencePrice::from_underlying(&underlying.fields) {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!(symbol = %underlying.symbol, error = %e, "Failed to read reference price");
            ReferencePrice::ZERO
        }
    }
}
