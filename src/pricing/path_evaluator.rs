/*
 * Path cost evaluation.
 *
 * Takes enumerated swap paths and prices them against a point-in-time market
 * state. Evaluation is pure with respect to the supplied state, so the same
 * candidates always rank the same way.
 */

use std::cmp::Ordering;

use alloy_primitives::{Address, U256};
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::pricing::market_state::{MarketStateLookup, StateLookupError};
use crate::registry::market::MarketWrapper;
use crate::registry::token::TokenWrapper;
use crate::routing::swap_path::SwapPath;

/// Cost breakdown of a single hop inside an evaluated path.
#[derive(Debug, Clone)]
pub struct SwapHopStats {
    pub market: MarketWrapper,
    pub token_in: TokenWrapper,
    pub token_out: TokenWrapper,
    pub amount_in: U256,
    pub amount_out: U256,
    pub fee_usd: f64,
    pub price_impact_usd: f64,
}

/// Full cost picture of one evaluated path.
///
/// `amount_out` is already net of every hop's fee and price impact; the fee
/// and impact totals are accounting figures and are not subtracted again at
/// ranking time.
#[derive(Debug, Clone)]
pub struct SwapPathStats {
    pub path: SwapPath,
    pub amount_in: U256,
    pub amount_out: U256,
    pub usd_in: f64,
    pub usd_out: f64,
    pub total_fee_usd: f64,
    pub total_price_impact_usd: f64,
    pub hops: Vec<SwapHopStats>,
}

impl SwapPathStats {
    /// Ranking key for candidate comparison.
    pub fn net_output_usd(&self) -> f64 {
        self.usd_out
    }

    pub fn hop_count(&self) -> usize {
        self.path.hop_count()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Hop {hop} through market {market} failed: {source}")]
    HopFailed {
        hop: usize,
        market: Address,
        #[source]
        source: StateLookupError,
    },
    #[error("No USD price available for path endpoint {0}")]
    MissingPrice(Address),
    #[error("Swap path has no hops")]
    EmptyPath,
}

#[derive(Debug, Clone, Copy)]
pub struct EvaluatorConfig {
    pub parallel: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathEvaluator {
    config: EvaluatorConfig,
}

impl PathEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Walks the path hop by hop, threading the output of each hop into the
    /// next. Any hop failure fails the whole path, there is no partial credit.
    pub fn evaluate_path(&self, path: &SwapPath, amount_in: U256, state: &dyn MarketStateLookup) -> Result<SwapPathStats, EvaluationError> {
        let (Some(token_in), Some(token_out)) = (path.token_in(), path.token_out()) else {
            return Err(EvaluationError::EmptyPath);
        };

        let mut amount = amount_in;
        let mut total_fee_usd = 0.0;
        let mut total_price_impact_usd = 0.0;
        let mut hops = Vec::with_capacity(path.hop_count());

        for (hop, market) in path.markets.iter().enumerate() {
            let hop_token_in = &path.tokens[hop];
            let hop_token_out = &path.tokens[hop + 1];

            let quote = state
                .hop_quote(market, hop_token_in.get_address(), amount)
                .map_err(|source| EvaluationError::HopFailed { hop, market: market.get_market_address(), source })?;

            total_fee_usd += quote.fee_usd;
            total_price_impact_usd += quote.price_impact_usd;
            hops.push(SwapHopStats {
                market: market.clone(),
                token_in: hop_token_in.clone(),
                token_out: hop_token_out.clone(),
                amount_in: amount,
                amount_out: quote.amount_out,
                fee_usd: quote.fee_usd,
                price_impact_usd: quote.price_impact_usd,
            });
            amount = quote.amount_out;
        }

        let usd_in = state
            .token_price_usd(token_in.get_address())
            .map(|price| token_in.to_float(amount_in) * price)
            .ok_or(EvaluationError::MissingPrice(token_in.get_address()))?;
        let usd_out = state
            .token_price_usd(token_out.get_address())
            .map(|price| token_out.to_float(amount) * price)
            .ok_or(EvaluationError::MissingPrice(token_out.get_address()))?;

        Ok(SwapPathStats {
            path: path.clone(),
            amount_in,
            amount_out: amount,
            usd_in,
            usd_out,
            total_fee_usd,
            total_price_impact_usd,
            hops,
        })
    }

    /// Evaluates every candidate, preserving the input order. Failures stay
    /// in place so callers can see which candidate dropped out and why.
    pub fn evaluate_paths(&self, paths: &[SwapPath], amount_in: U256, state: &dyn MarketStateLookup) -> Vec<Result<SwapPathStats, EvaluationError>> {
        debug!(paths = paths.len(), parallel = self.config.parallel, "Evaluating candidate paths");

        if self.config.parallel {
            paths.par_iter().map(|path| self.evaluate_path(path, amount_in, state)).collect()
        } else {
            paths.iter().map(|path| self.evaluate_path(path, amount_in, state)).collect()
        }
    }
}

/// Orders candidates best-first: net USD output descending, shorter paths on
/// ties. The sort is stable, so candidates that still tie keep their
/// enumeration order.
pub fn rank_candidates(mut candidates: Vec<SwapPathStats>) -> Vec<SwapPathStats> {
    candidates.sort_by(|a, b| {
        b.net_output_usd()
            .partial_cmp(&a.net_output_usd())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.hop_count().cmp(&b.hop_count()))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::market_state::{HopQuote, MarketReserves, MarketSnapshot};
    use crate::registry::market::Market;
    use crate::registry::token::Token;
    use std::sync::Arc;

    fn token(byte: u8) -> Arc<Token> {
        Arc::new(Token::repeat_byte(byte))
    }

    fn market(address: u8, long: u8, short: u8) -> MarketWrapper {
        Arc::new(Market::new(
            Address::repeat_byte(address),
            Address::repeat_byte(0xEE),
            Address::repeat_byte(long),
            Address::repeat_byte(short),
        ))
    }

    fn e18(units: u64) -> U256 {
        U256::from(units) * U256::from(10).pow(U256::from(18))
    }

    /// 0x01 -(0xA1)-> 0x02 -(0xA2)-> 0x03
    fn two_hop_path() -> SwapPath {
        SwapPath::new(vec![token(0x01), token(0x02), token(0x03)], vec![market(0xA1, 0x01, 0x02), market(0xA2, 0x02, 0x03)]).unwrap()
    }

    fn full_snapshot() -> MarketSnapshot {
        let mut snapshot = MarketSnapshot::new();
        for market_byte in [0xA1, 0xA2] {
            snapshot.set_market_reserves(Address::repeat_byte(market_byte), MarketReserves::new(e18(1_000_000), e18(1_000_000), 30));
        }
        for token_byte in [0x01, 0x02, 0x03] {
            snapshot.set_token_price(Address::repeat_byte(token_byte), 18, 1.0);
        }
        snapshot
    }

    #[test]
    fn test_evaluate_two_hop_path() {
        let evaluator = PathEvaluator::default();
        let path = two_hop_path();
        let snapshot = full_snapshot();

        let stats = evaluator.evaluate_path(&path, e18(100), &snapshot).unwrap();

        assert_eq!(stats.hops.len(), 2);
        // Output of the first hop feeds the second.
        assert_eq!(stats.hops[1].amount_in, stats.hops[0].amount_out);
        assert_eq!(stats.amount_out, stats.hops[1].amount_out);
        // Fees and impact only ever reduce the output.
        assert!(stats.amount_out < stats.amount_in);
        assert!(stats.net_output_usd() < stats.usd_in);
        assert!((stats.total_fee_usd - (stats.hops[0].fee_usd + stats.hops[1].fee_usd)).abs() < 1e-12);
        assert!(stats.total_fee_usd > 0.0);
        assert!(stats.total_price_impact_usd > 0.0);
    }

    #[test]
    fn test_hop_failure_fails_the_path() {
        let evaluator = PathEvaluator::default();
        let path = two_hop_path();

        // Second market has no state.
        let mut snapshot = MarketSnapshot::new();
        snapshot.set_market_reserves(Address::repeat_byte(0xA1), MarketReserves::new(e18(1_000_000), e18(1_000_000), 30));
        for token_byte in [0x01, 0x02, 0x03] {
            snapshot.set_token_price(Address::repeat_byte(token_byte), 18, 1.0);
        }

        let err = evaluator.evaluate_path(&path, e18(100), &snapshot).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::HopFailed {
                hop: 1,
                market: Address::repeat_byte(0xA2),
                source: StateLookupError::MissingState(Address::repeat_byte(0xA2)),
            }
        );
    }

    /// Quotes every hop at par so endpoint valuation is the only thing that
    /// can fail.
    struct ParQuotes {
        priced: Vec<Address>,
    }

    impl MarketStateLookup for ParQuotes {
        fn hop_quote(&self, _market: &Market, _token_in: Address, amount_in: U256) -> Result<HopQuote, StateLookupError> {
            Ok(HopQuote { amount_out: amount_in, fee_usd: 0.0, price_impact_usd: 0.0 })
        }

        fn token_price_usd(&self, token: Address) -> Option<f64> {
            self.priced.contains(&token).then_some(1.0)
        }
    }

    #[test]
    fn test_missing_endpoint_price() {
        let evaluator = PathEvaluator::default();
        let path = two_hop_path();
        let state = ParQuotes { priced: vec![Address::repeat_byte(0x01)] };

        let err = evaluator.evaluate_path(&path, e18(100), &state).unwrap_err();
        assert_eq!(err, EvaluationError::MissingPrice(Address::repeat_byte(0x03)));
    }

    #[test]
    fn test_evaluate_paths_keeps_order_and_isolates_failures() {
        let path_a = SwapPath::new(vec![token(0x01), token(0x02)], vec![market(0xA1, 0x01, 0x02)]).unwrap();
        let path_b = SwapPath::new(vec![token(0x01), token(0x04)], vec![market(0xB1, 0x01, 0x04)]).unwrap();
        let path_c = two_hop_path();
        let paths = vec![path_a, path_b, path_c];

        // 0xB1 is missing from the snapshot, so the middle candidate fails.
        let mut snapshot = full_snapshot();
        snapshot.set_token_price(Address::repeat_byte(0x04), 18, 1.0);

        for parallel in [true, false] {
            let evaluator = PathEvaluator::new(EvaluatorConfig { parallel });
            let results = evaluator.evaluate_paths(&paths, e18(10), &snapshot);

            assert_eq!(results.len(), 3);
            assert!(results[0].is_ok());
            assert!(matches!(
                results[1],
                Err(EvaluationError::HopFailed { hop: 0, market, .. }) if market == Address::repeat_byte(0xB1)
            ));
            assert!(results[2].is_ok());
        }
    }

    #[test]
    fn test_rank_candidates() {
        let evaluator = PathEvaluator::default();
        let snapshot = full_snapshot();

        let one_hop = SwapPath::new(vec![token(0x01), token(0x02)], vec![market(0xA1, 0x01, 0x02)]).unwrap();
        let two_hop =
            SwapPath::new(vec![token(0x01), token(0x03), token(0x02)], vec![market(0xA2, 0x01, 0x03), market(0xA1, 0x03, 0x02)]).unwrap();

        let mut cheap = evaluator.evaluate_path(&one_hop, e18(100), &snapshot).unwrap();
        let mut rich = evaluator.evaluate_path(&two_hop, e18(100), &snapshot).unwrap();

        // Force the interesting orderings directly.
        cheap.usd_out = 90.0;
        rich.usd_out = 100.0;
        let ranked = rank_candidates(vec![cheap.clone(), rich.clone()]);
        assert_eq!(ranked[0].usd_out, 100.0);

        // Equal output: fewer hops wins.
        cheap.usd_out = 100.0;
        let ranked = rank_candidates(vec![rich.clone(), cheap.clone()]);
        assert_eq!(ranked[0].hop_count(), 1);

        // Full tie: input order is kept.
        let mut rich_clone = rich.clone();
        rich_clone.total_fee_usd = 42.0;
        let ranked = rank_candidates(vec![rich.clone(), rich_clone]);
        assert_eq!(ranked[0].total_fee_usd, rich.total_fee_usd);
        assert_eq!(ranked[1].total_fee_usd, 42.0);
    }
}
