use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::pricing::path_evaluator::SwapPathStats;

/// Money view shared by every strategy shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwapAmounts {
    pub amount_in: U256,
    pub amount_out: U256,
    pub usd_in: f64,
    pub usd_out: f64,
    pub fee_usd: f64,
}

/// Quote returned by an external aggregator.
///
/// How the aggregator routes internally stays on its side of the seam; only
/// the money picture crosses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSwapQuote {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub usd_in: f64,
    pub usd_out: f64,
    pub fee_usd: f64,
}

impl ExternalSwapQuote {
    /// Ranking key, mirrors [`SwapPathStats::net_output_usd`].
    pub fn net_output_usd(&self) -> f64 {
        self.usd_out
    }
}

#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStrategyKind {
    NoSwap,
    Internal,
    External,
    Combined,
}

/// The routing decision for one swap request.
#[derive(Debug, Clone)]
pub enum SwapStrategy {
    /// Input and output token are the same, nothing moves.
    NoSwap(SwapAmounts),
    /// Swap entirely through the venue's own markets.
    Internal(SwapPathStats),
    /// Swap entirely through the external aggregator.
    External(ExternalSwapQuote),
    /// Partial external quote plus an internal path for the remainder.
    Combined { external: ExternalSwapQuote, internal: SwapPathStats },
}

impl SwapStrategy {
    pub fn kind(&self) -> SwapStrategyKind {
        match self {
            SwapStrategy::NoSwap(_) => SwapStrategyKind::NoSwap,
            SwapStrategy::Internal(_) => SwapStrategyKind::Internal,
            SwapStrategy::External(_) => SwapStrategyKind::External,
            SwapStrategy::Combined { .. } => SwapStrategyKind::Combined,
        }
    }

    pub fn amounts(&self) -> SwapAmounts {
        match self {
            SwapStrategy::NoSwap(amounts) => *amounts,
            SwapStrategy::Internal(stats) => SwapAmounts {
                amount_in: stats.amount_in,
                amount_out: stats.amount_out,
                usd_in: stats.usd_in,
                usd_out: stats.usd_out,
                fee_usd: stats.total_fee_usd,
            },
            SwapStrategy::External(quote) => SwapAmounts {
                amount_in: quote.amount_in,
                amount_out: quote.amount_out,
                usd_in: quote.usd_in,
                usd_out: quote.usd_out,
                fee_usd: quote.fee_usd,
            },
            SwapStrategy::Combined { external, internal } => SwapAmounts {
                amount_in: external.amount_in + internal.amount_in,
                amount_out: external.amount_out + internal.amount_out,
                usd_in: external.usd_in + internal.usd_in,
                usd_out: external.usd_out + internal.usd_out,
                fee_usd: external.fee_usd + internal.total_fee_usd,
            },
        }
    }

    pub fn net_output_usd(&self) -> f64 {
        self.amounts().usd_out
    }
}
