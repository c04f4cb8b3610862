use crate::registry::market::MarketWrapper;
use crate::registry::token::Token;
use crate::routing::swap_path_hash::SwapPathHash;
use alloy_primitives::Address;
use eyre::{Result, eyre};
use sha2::digest::Update;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An ordered walk through markets. Tokens carry one more entry than markets
/// (entry token, then the token each hop exits on). Constructors keep the
/// walk well-formed: every market contains the token it is entered on, and
/// no market appears twice. Token revisits through distinct markets are fine.
#[derive(Clone, Debug, Default, Eq)]
pub struct SwapPath {
    pub swap_path_hash: SwapPathHash,
    // internal lookup for faster contains_market
    pub markets_map: HashSet<Address>,
    // The tokens of the path e.g. token0 -> token1 -> token2
    pub tokens: Vec<Arc<Token>>,
    // The markets of the path e.g. market0 -> market1
    pub markets: Vec<MarketWrapper>,
}

impl Display for SwapPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SwapPath(markets={:?}, tokens={:?})",
            self.markets.iter().map(|m| format!("{:#}", m.get_market_address())).collect::<Vec<String>>(),
            self.tokens.iter().map(|t| format!("{:#}", t.get_address())).collect::<Vec<String>>()
        )
    }
}

impl SwapPath {
    /// Create a path from full token and market lists, validating the walk.
    pub fn new<T: Into<Arc<Token>>>(tokens: Vec<T>, markets: Vec<MarketWrapper>) -> Result<Self> {
        let tokens: Vec<Arc<Token>> = tokens.into_iter().map(|t| t.into()).collect();
        if tokens.len() != markets.len() + 1 || markets.is_empty() {
            return Err(eyre!("Path shape mismatch: {} tokens for {} markets", tokens.len(), markets.len()));
        }

        let mut markets_map = HashSet::new();
        for (i, market) in markets.iter().enumerate() {
            let token_in = tokens[i].get_address();
            let token_out = tokens[i + 1].get_address();
            if market.opposite_token(&token_in) != Some(token_out) {
                return Err(eyre!("Market {} does not connect {:#} -> {:#}", market, token_in, token_out));
            }
            if !markets_map.insert(market.get_market_address()) {
                return Err(eyre!("Market {} appears twice in path", market));
            }
        }

        let swap_path_hash = generate_swap_path_hash(&tokens, &markets);
        Ok(SwapPath { swap_path_hash, tokens, markets, markets_map })
    }

    /// Create a path with only one hop.
    pub fn new_first(token_from: Arc<Token>, token_to: Arc<Token>, market: MarketWrapper) -> Result<Self> {
        SwapPath::new(vec![token_from, token_to], vec![market])
    }

    /// Push one hop. The market must connect the token the path currently
    /// ends on to `token_to` and must not already be part of the path.
    pub fn push_hop(&mut self, token_to: Arc<Token>, market: MarketWrapper) -> Result<&mut Self> {
        let Some(end) = self.tokens.last() else {
            return Err(eyre!("Swap path is empty"));
        };

        let end_token = end.get_address();
        if market.opposite_token(&end_token) != Some(token_to.get_address()) {
            return Err(eyre!("Market {} does not connect {:#} -> {:#}", market, end_token, token_to.get_address()));
        }
        if !self.markets_map.insert(market.get_market_address()) {
            return Err(eyre!("Market {} already used in path", market));
        }

        self.tokens.push(token_to);
        self.markets.push(market);
        self.swap_path_hash = generate_swap_path_hash(&self.tokens, &self.markets);

        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.markets.is_empty()
    }

    pub fn tokens_count(&self) -> usize {
        self.tokens.len()
    }

    /// The hop count of the swap path.
    pub fn hop_count(&self) -> usize {
        self.markets.len()
    }

    pub fn contains_market(&self, market: &MarketWrapper) -> bool {
        self.markets_map.contains(&market.get_market_address())
    }

    pub fn contains_market_address(&self, address: &Address) -> bool {
        self.markets_map.contains(address)
    }

    /// First token of the walk.
    pub fn token_in(&self) -> Option<&Arc<Token>> {
        self.tokens.first()
    }

    /// Last token of the walk.
    pub fn token_out(&self) -> Option<&Arc<Token>> {
        self.tokens.last()
    }

    /// Market addresses in hop order, the artifact representation.
    pub fn market_addresses(&self) -> Vec<Address> {
        self.markets.iter().map(|m| m.get_market_address()).collect()
    }
}

impl Hash for SwapPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
        self.markets.hash(state);
    }
}

impl PartialEq for SwapPath {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens && self.markets == other.markets
    }
}

/// Hash all the addresses of the tokens and markets in the path to a sha256
/// hash. Stable and reproducible so other processes can address paths too.
pub fn generate_swap_path_hash(tokens: &[Arc<Token>], markets: &[MarketWrapper]) -> SwapPathHash {
    let mut hasher = Sha256::new();

    for token in tokens.iter() {
        Update::update(&mut hasher, token.get_address().as_slice());
    }
    for market in markets.iter() {
        Update::update(&mut hasher, market.get_market_address().as_slice());
    }

    let hash_slice: [u8; 32] = hasher.finalize().into();
    SwapPathHash(hash_slice)
}
