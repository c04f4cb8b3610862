use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::strategy::types::ExternalSwapQuote;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalQuoteError {
    #[error("Aggregator has no route for this pair")]
    NoRoute,
    #[error("Aggregator quote timed out")]
    Timeout,
    #[error("Aggregator failure: {0}")]
    Source(String),
}

/// Quote seam to an external aggregator.
#[async_trait]
pub trait ExternalQuoteSource: Send + Sync {
    async fn fetch_quote(&self, token_in: Address, token_out: Address, amount_in: U256) -> Result<ExternalSwapQuote, ExternalQuoteError>;
}

/// Fetches a quote and absorbs failures at the boundary. A failed quote
/// means "no external candidate", it never fails the swap request itself.
pub async fn resolve_external_quote(
    source: &dyn ExternalQuoteSource,
    token_in: Address,
    token_out: Address,
    amount_in: U256,
) -> Option<ExternalSwapQuote> {
    match source.fetch_quote(token_in, token_out, amount_in).await {
        Ok(quote) => Some(quote),
        Err(error) => {
            debug!(%token_in, %token_out, %error, "External quote unavailable");
            None
        }
    }
}
