use crate::registry::network::NetworkId;
use crate::registry::token::{Token, TokenWrapper};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::warn;

/// A venue market: swaps move between the two collateral tokens, the index
/// token only names what the market tracks and never holds swap liquidity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Market {
    market_address: Address,
    index_token: Address,
    long_token: Address,
    short_token: Address,
}

pub type MarketWrapper = Arc<Market>;

impl Hash for Market {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.market_address.hash(state)
    }
}

impl PartialEq for Market {
    fn eq(&self, other: &Self) -> bool {
        self.market_address == other.market_address
    }
}

impl Eq for Market {}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}(long={:#}, short={:#})", self.market_address, self.long_token, self.short_token)
    }
}

impl Market {
    pub fn new(market_address: Address, index_token: Address, long_token: Address, short_token: Address) -> Market {
        Market { market_address, index_token, long_token, short_token }
    }

    pub fn get_market_address(&self) -> Address {
        self.market_address
    }

    pub fn get_index_token(&self) -> Address {
        self.index_token
    }

    pub fn get_long_token(&self) -> Address {
        self.long_token
    }

    pub fn get_short_token(&self) -> Address {
        self.short_token
    }

    /// Both collateral tokens back the same side, no swap direction exists.
    pub fn is_single_sided(&self) -> bool {
        self.long_token == self.short_token
    }

    pub fn contains_collateral(&self, token: &Address) -> bool {
        self.long_token == *token || self.short_token == *token
    }

    /// The collateral token a swap through this market exits on, given the
    /// token it enters on. `None` if the token is not collateral here.
    pub fn opposite_token(&self, token: &Address) -> Option<Address> {
        if *token == self.long_token {
            Some(self.short_token)
        } else if *token == self.short_token {
            Some(self.long_token)
        } else {
            None
        }
    }
}

/// Validated per-network market list. The insertion order is preserved and
/// drives every downstream ordering guarantee (adjacency entries, path
/// discovery order), so two registries loaded from the same file always
/// produce the same routes.
#[derive(Default)]
pub struct MarketRegistry {
    network: NetworkId,
    markets: Vec<MarketWrapper>,
    market_lookup: HashMap<Address, MarketWrapper>,
    tokens: HashMap<Address, TokenWrapper>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate market address: {0}")]
    DuplicateMarket(Address),
}

impl MarketRegistry {
    pub fn new(network: NetworkId) -> Self {
        MarketRegistry { network, ..MarketRegistry::default() }
    }

    pub fn from_entries(network: NetworkId, tokens: Vec<Token>, markets: Vec<Market>) -> Result<Self, RegistryError> {
        let mut registry = MarketRegistry::new(network);
        for token in tokens {
            registry.add_token(token);
        }
        for market in markets {
            registry.add_market(market)?;
        }
        Ok(registry)
    }

    /// Add a [`Token`] reference. If the token already exists nothing will happen.
    pub fn add_token<T: Into<Arc<Token>>>(&mut self, token: T) {
        let arc_token: Arc<Token> = token.into();
        self.tokens.entry(arc_token.get_address()).or_insert(arc_token);
    }

    /// Add a market. Returns `Ok(false)` when the market was skipped because
    /// it carries no swap direction (long == short), `Ok(true)` when added.
    /// A market address seen before is an input error, not a merge.
    pub fn add_market(&mut self, market: Market) -> Result<bool, RegistryError> {
        if self.market_lookup.contains_key(&market.get_market_address()) {
            return Err(RegistryError::DuplicateMarket(market.get_market_address()));
        }
        if market.is_single_sided() {
            warn!(market = %market, "skipping single-sided market, no swap direction");
            return Ok(false);
        }

        // Collateral tokens missing from the token table get default metadata.
        for token_address in [market.get_long_token(), market.get_short_token()] {
            self.tokens.entry(token_address).or_insert_with(|| Arc::new(Token::new(token_address)));
        }

        let market = Arc::new(market);
        self.market_lookup.insert(market.get_market_address(), market.clone());
        self.markets.push(market);
        Ok(true)
    }

    pub fn get_network(&self) -> NetworkId {
        self.network
    }

    /// Markets in insertion order.
    pub fn markets(&self) -> &[MarketWrapper] {
        &self.markets
    }

    pub fn get_market(&self, address: &Address) -> Option<MarketWrapper> {
        self.market_lookup.get(address).cloned()
    }

    pub fn contains_market(&self, address: &Address) -> bool {
        self.market_lookup.contains_key(address)
    }

    pub fn get_token(&self, address: &Address) -> Option<TokenWrapper> {
        self.tokens.get(address).cloned()
    }

    /// Collateral tokens in order of first appearance across the market list.
    pub fn collateral_tokens(&self) -> Vec<TokenWrapper> {
        let mut seen = std::collections::HashSet::new();
        let mut ordered = vec![];
        for market in self.markets.iter() {
            for address in [market.get_long_token(), market.get_short_token()] {
                if !seen.insert(address) {
                    continue;
                }
                if let Some(token) = self.tokens.get(&address) {
                    ordered.push(token.clone());
                }
            }
        }
        ordered
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Digest over the market list in insertion order. Changes whenever a
    /// market is added, removed or reordered, which is exactly what makes a
    /// prebuilt route artifact stale.
    pub fn fingerprint(&self) -> B256 {
        let mut hasher = Sha256::new();
        for market in self.markets.iter() {
            hasher.update(market.get_market_address().as_slice());
            hasher.update(market.get_long_token().as_slice());
            hasher.update(market.get_short_token().as_slice());
        }
        B256::from_slice(hasher.finalize().as_slice())
    }
}
