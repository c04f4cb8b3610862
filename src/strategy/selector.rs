/*
 * Swap strategy selection.
 *
 * Pure decision layer over already-evaluated candidates. The selector never
 * touches market state or the aggregator itself; it only compares what the
 * caller resolved and returns one of the four strategy shapes.
 */

use alloy_primitives::{Address, U256};
use thiserror::Error;
use tracing::debug;

use crate::pricing::path_evaluator::{rank_candidates, SwapPathStats};
use crate::strategy::types::{ExternalSwapQuote, SwapAmounts, SwapStrategy};

/// Everything the caller resolved for one swap request.
#[derive(Debug, Clone, Default)]
pub struct StrategyCandidates {
    /// Successfully evaluated internal paths, in enumeration order. The
    /// selector ranks them itself.
    pub internal: Vec<SwapPathStats>,
    pub external: Option<ExternalSwapQuote>,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectionContext {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub usd_in: f64,
    /// Explicit caller signal that a blended external + internal fill is
    /// acceptable. Combined is never chosen on cost grounds alone.
    pub allow_combined: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("No viable swap route from {token_in} to {token_out}")]
    NoRouteFound { token_in: Address, token_out: Address },
}

/// Decides how one swap request should be filled.
///
/// Same-token requests short-circuit to `NoSwap` before any candidate is
/// looked at. A partial external quote combines with the best internal
/// remainder only when the context allows it; otherwise the best internal
/// candidate and the quote compete on net USD output, with the external side
/// winning only on strict dominance.
pub fn select_swap_strategy(candidates: StrategyCandidates, context: &SelectionContext) -> Result<SwapStrategy, StrategyError> {
    if context.token_in == context.token_out {
        return Ok(SwapStrategy::NoSwap(SwapAmounts {
            amount_in: context.amount_in,
            amount_out: context.amount_in,
            usd_in: context.usd_in,
            usd_out: context.usd_in,
            fee_usd: 0.0,
        }));
    }

    let StrategyCandidates { internal, external } = candidates;
    let best_internal = rank_candidates(internal).into_iter().next();

    let strategy = match (best_internal, external) {
        (None, None) => {
            return Err(StrategyError::NoRouteFound { token_in: context.token_in, token_out: context.token_out });
        }
        (Some(stats), None) => SwapStrategy::Internal(stats),
        (None, Some(quote)) => SwapStrategy::External(quote),
        (Some(stats), Some(quote)) => {
            // The split ratio is the caller's input, carried by the partial
            // quote; the internal side must have been evaluated at exactly
            // the uncovered remainder.
            let sides_cover_request = quote.amount_in.checked_add(stats.amount_in) == Some(context.amount_in);
            if context.allow_combined && quote.amount_in < context.amount_in && sides_cover_request {
                SwapStrategy::Combined { external: quote, internal: stats }
            } else if quote.net_output_usd() > stats.net_output_usd() {
                SwapStrategy::External(quote)
            } else {
                SwapStrategy::Internal(stats)
            }
        }
    };

    debug!(kind = %strategy.kind(), usd_out = strategy.net_output_usd(), "Selected swap strategy");
    Ok(strategy)
}
