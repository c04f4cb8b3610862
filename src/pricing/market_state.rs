use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::registry::market::Market;

const BPS_DENOMINATOR: u64 = 10_000;

/// Result of pushing an amount through a single market.
///
/// `amount_out` is already net of the swap fee and the price impact for this
/// hop, denominated in the output token's raw units.
#[derive(Debug, Clone, PartialEq)]
pub struct HopQuote {
    pub amount_out: U256,
    pub fee_usd: f64,
    pub price_impact_usd: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateLookupError {
    #[error("No state available for market {0}")]
    MissingState(Address),
    #[error("No USD price available for token {0}")]
    MissingPrice(Address),
    #[error("Insufficient liquidity in market {market} for amount {amount}")]
    InsufficientLiquidity { market: Address, amount: U256 },
}

/// Market state seam the path evaluator prices hops through.
///
/// Implementations own the venue's conversion math. Lookups must be
/// deterministic for a fixed snapshot so the same candidate set always ranks
/// the same way.
pub trait MarketStateLookup: Send + Sync {
    /// Converts `amount_in` of `token_in` through `market`.
    fn hop_quote(&self, market: &Market, token_in: Address, amount_in: U256) -> Result<HopQuote, StateLookupError>;

    /// USD price of one whole token, if known.
    fn token_price_usd(&self, token: Address) -> Option<f64>;
}

/// Collateral reserves and swap fee for one market.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketReserves {
    pub long_amount: U256,
    pub short_amount: U256,
    pub fee_bps: u16,
}

impl MarketReserves {
    pub fn new(long_amount: U256, short_amount: U256, fee_bps: u16) -> Self {
        Self { long_amount, short_amount, fee_bps }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TokenPrice {
    decimals: u8,
    price_usd: f64,
}

/// Point-in-time view of market reserves and token prices.
///
/// Reference [`MarketStateLookup`] implementation backed by constant-product
/// math over the long/short collateral reserves. Callers populate it from
/// whatever data source they sync and hand it to the evaluator.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    market_reserves: HashMap<Address, MarketReserves>,
    token_prices: HashMap<Address, TokenPrice>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_market_reserves(&mut self, market_address: Address, reserves: MarketReserves) {
        self.market_reserves.insert(market_address, reserves);
    }

    pub fn get_market_reserves(&self, market_address: &Address) -> Option<&MarketReserves> {
        self.market_reserves.get(market_address)
    }

    pub fn set_token_price(&mut self, token: Address, decimals: u8, price_usd: f64) {
        self.token_prices.insert(token, TokenPrice { decimals, price_usd });
    }

    fn to_usd(&self, token: Address, amount: U256) -> Option<f64> {
        let price = self.token_prices.get(&token)?;
        if price.decimals == 0 {
            return Some(0.0);
        }
        let exp = U256::from(10).pow(U256::from(price.decimals));
        let (integer, remainder) = amount.div_rem(exp);

        let integer = u64::try_from(integer).unwrap_or_default();
        let remainder = u64::try_from(remainder).unwrap_or_default();
        let units = integer as f64 + (remainder as f64) / (10u64.pow(price.decimals as u32) as f64);
        Some(units * price.price_usd)
    }
}

impl MarketStateLookup for MarketSnapshot {
    fn hop_quote(&self, market: &Market, token_in: Address, amount_in: U256) -> Result<HopQuote, StateLookupError> {
        let market_address = market.get_market_address();
        let reserves = self.market_reserves.get(&market_address).ok_or(StateLookupError::MissingState(market_address))?;

        let (reserve_in, reserve_out) = if token_in == market.get_long_token() {
            (reserves.long_amount, reserves.short_amount)
        } else if token_in == market.get_short_token() {
            (reserves.short_amount, reserves.long_amount)
        } else {
            return Err(StateLookupError::MissingState(market_address));
        };
        let token_out = market.opposite_token(&token_in).ok_or(StateLookupError::MissingState(market_address))?;

        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(StateLookupError::InsufficientLiquidity { market: market_address, amount: amount_in });
        }
        if amount_in.is_zero() {
            return Ok(HopQuote { amount_out: U256::ZERO, fee_usd: 0.0, price_impact_usd: 0.0 });
        }

        let fee_multiplier = U256::from(BPS_DENOMINATOR - u64::from(reserves.fee_bps));
        let amount_in_with_fee = amount_in * fee_multiplier / U256::from(BPS_DENOMINATOR);
        let fee_amount = amount_in - amount_in_with_fee;

        let amount_out = amount_in_with_fee * reserve_out / (reserve_in + amount_in_with_fee);
        if amount_out >= reserve_out {
            return Err(StateLookupError::InsufficientLiquidity { market: market_address, amount: amount_in });
        }

        // Output at the marginal price, before the trade moves the reserves.
        let ideal_out = amount_in_with_fee * reserve_out / reserve_in;
        let impact_amount = ideal_out.saturating_sub(amount_out);

        let fee_usd = self.to_usd(token_in, fee_amount).ok_or(StateLookupError::MissingPrice(token_in))?;
        let price_impact_usd = self.to_usd(token_out, impact_amount).ok_or(StateLookupError::MissingPrice(token_out))?;

        Ok(HopQuote { amount_out, fee_usd, price_impact_usd })
    }

    fn token_price_usd(&self, token: Address) -> Option<f64> {
        self.token_prices.get(&token).and_then(|price| if price.price_usd.is_finite() { Some(price.price_usd) } else { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_market() -> Market {
        Market::new(Address::repeat_byte(0xA1), Address::repeat_byte(0xEE), Address::repeat_byte(0x01), Address::repeat_byte(0x02))
    }

    fn e18(units: u64) -> U256 {
        U256::from(units) * U256::from(10).pow(U256::from(18))
    }

    fn test_snapshot(market: &Market) -> MarketSnapshot {
        let mut snapshot = MarketSnapshot::new();
        snapshot.set_market_reserves(market.get_market_address(), MarketReserves::new(e18(1000), e18(1000), 30));
        snapshot.set_token_price(market.get_long_token(), 18, 1.0);
        snapshot.set_token_price(market.get_short_token(), 18, 1.0);
        snapshot
    }

    #[test]
    fn test_constant_product_quote() {
        let market = test_market();
        let snapshot = test_snapshot(&market);

        let quote = snapshot.hop_quote(&market, market.get_long_token(), e18(100)).unwrap();

        // 100 in at 30 bps against 1000/1000 reserves.
        assert_eq!(quote.amount_out, U256::from(90_661_089_388_014_913_158u128));
        assert!((quote.fee_usd - 0.3).abs() < 1e-9);
        assert!((quote.price_impact_usd - 9.038910611985087).abs() < 1e-6);
    }

    #[test]
    fn test_quote_is_direction_sensitive() {
        let market = test_market();
        let mut snapshot = MarketSnapshot::new();
        snapshot.set_market_reserves(market.get_market_address(), MarketReserves::new(e18(2000), e18(500), 0));
        snapshot.set_token_price(market.get_long_token(), 18, 1.0);
        snapshot.set_token_price(market.get_short_token(), 18, 4.0);

        let long_in = snapshot.hop_quote(&market, market.get_long_token(), e18(10)).unwrap();
        let short_in = snapshot.hop_quote(&market, market.get_short_token(), e18(10)).unwrap();

        // Long side is deeper, so selling into it returns more output units.
        assert!(short_in.amount_out > long_in.amount_out);
    }

    #[test]
    fn test_missing_state() {
        let market = test_market();
        let snapshot = MarketSnapshot::new();

        let result = snapshot.hop_quote(&market, market.get_long_token(), e18(1));
        assert_eq!(result, Err(StateLookupError::MissingState(market.get_market_address())));
    }

    #[test]
    fn test_empty_reserves_are_insufficient() {
        let market = test_market();
        let mut snapshot = MarketSnapshot::new();
        snapshot.set_market_reserves(market.get_market_address(), MarketReserves::new(e18(1000), U256::ZERO, 30));

        let result = snapshot.hop_quote(&market, market.get_long_token(), e18(1));
        assert_eq!(result, Err(StateLookupError::InsufficientLiquidity { market: market.get_market_address(), amount: e18(1) }));
    }

    #[test]
    fn test_missing_price_fails_the_hop() {
        let market = test_market();
        let mut snapshot = MarketSnapshot::new();
        snapshot.set_market_reserves(market.get_market_address(), MarketReserves::new(e18(1000), e18(1000), 30));
        snapshot.set_token_price(market.get_long_token(), 18, 1.0);

        let result = snapshot.hop_quote(&market, market.get_long_token(), e18(1));
        assert_eq!(result, Err(StateLookupError::MissingPrice(market.get_short_token())));
    }

    #[test]
    fn test_zero_amount_in() {
        let market = test_market();
        let snapshot = test_snapshot(&market);

        let quote = snapshot.hop_quote(&market, market.get_long_token(), U256::ZERO).unwrap();
        assert_eq!(quote.amount_out, U256::ZERO);
        assert_eq!(quote.fee_usd, 0.0);
    }

    #[test]
    fn test_token_price_usd() {
        let market = test_market();
        let snapshot = test_snapshot(&market);

        assert_eq!(snapshot.token_price_usd(market.get_long_token()), Some(1.0));
        assert_eq!(snapshot.token_price_usd(Address::repeat_byte(0x99)), None);
    }
}
