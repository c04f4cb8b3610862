use crate::registry::market::{MarketRegistry, MarketWrapper};
use crate::registry::token::Token;
use ahash::RandomState;
use alloy_primitives::Address;
use eyre::eyre;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

pub type FastHasher = RandomState;
/// FastHashMap using ahash
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;

/// Undirected token graph: nodes are collateral tokens, one edge per market.
/// Markets over the same token pair become parallel edges so each stays
/// individually addressable. Nothing is ever removed, which keeps node and
/// edge indices stable and makes edge-index order equal registry order.
#[derive(Debug, Clone, Default)]
pub struct TokenGraph {
    pub graph: UnGraph<TokenNode, MarketEdge, usize>,
    // market_address -> market
    pub markets: HashMap<Address, MarketWrapper>,
    // token_address -> token (Keep reference for fast access of token details)
    pub tokens: HashMap<Address, Arc<Token>>,
    // token -> node index
    pub token_index: FastHashMap<Address, NodeIndex<usize>>,
    // market -> edge index
    pub market_index: FastHashMap<Address, EdgeIndex<usize>>,
}

impl TokenGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            markets: HashMap::new(),
            tokens: HashMap::default(),
            token_index: FastHashMap::default(),
            market_index: FastHashMap::default(),
        }
    }

    /// Build the graph from a validated registry. Markets are inserted in
    /// registry order; collateral tokens become nodes in order of first
    /// appearance. Degenerate markets never reach this point, the registry
    /// already skipped them.
    pub fn from_registry(registry: &MarketRegistry) -> Self {
        let mut graph = TokenGraph::new();

        for market in registry.markets() {
            for token_address in [market.get_long_token(), market.get_short_token()] {
                let token = registry.get_token(&token_address).unwrap_or_else(|| Arc::new(Token::new(token_address)));
                graph.add_or_get_token_idx_by_token(token);
            }
            graph.add_market(market.clone()).expect("Tokens are missing from graph. This should never happen");
        }

        graph
    }

    pub fn add_or_get_token_idx_by_token(&mut self, arc_token: Arc<Token>) -> NodeIndex<usize> {
        *self.token_index.entry(arc_token.get_address()).or_insert_with(|| {
            let node = TokenNode::new(arc_token.clone());
            let idx = self.graph.add_node(node);
            self.tokens.insert(arc_token.get_address(), arc_token);
            idx
        })
    }

    /// Add a market as a new edge between its collateral tokens. Both tokens
    /// must already be nodes.
    pub fn add_market(&mut self, market: MarketWrapper) -> eyre::Result<()> {
        let market_address = market.get_market_address();
        if self.market_index.contains_key(&market_address) {
            return Err(eyre!("Market already in graph: {:#}", market_address));
        }
        if market.is_single_sided() {
            return Err(eyre!("Market has no swap direction: {:#}", market_address));
        }

        let node_long = self
            .token_index
            .get(&market.get_long_token())
            .ok_or_else(|| eyre!("Token not found in graph: {:#}", market.get_long_token()))?;
        let node_short = self
            .token_index
            .get(&market.get_short_token())
            .ok_or_else(|| eyre!("Token not found in graph: {:#}", market.get_short_token()))?;

        let edge_index = self.graph.add_edge(*node_long, *node_short, MarketEdge::new(market.clone()));
        self.market_index.insert(market_address, edge_index);
        self.markets.insert(market_address, market);

        Ok(())
    }

    /// Adjacent `(token node, edge)` pairs of a node, in registry order.
    /// petgraph iterates each adjacency chain newest-first, so the collected
    /// edges are sorted by edge index to restore insertion order.
    pub fn neighbor_edges(&self, node: NodeIndex<usize>) -> Vec<(NodeIndex<usize>, EdgeIndex<usize>)> {
        let mut edges: Vec<(NodeIndex<usize>, EdgeIndex<usize>)> = self
            .graph
            .edges(node)
            .map(|edge| {
                let neighbor = if edge.source() == node { edge.target() } else { edge.source() };
                (neighbor, edge.id())
            })
            .collect();
        edges.sort_by_key(|(_, edge_index)| edge_index.index());
        edges
    }

    /// The adjacency view: for every token, the ordered `(neighbor, market)`
    /// list. Tokens appear in node insertion order.
    pub fn adjacency_entries(&self) -> Vec<(Arc<Token>, Vec<(Arc<Token>, MarketWrapper)>)> {
        self.graph
            .node_indices()
            .map(|node| {
                let token = self.graph[node].token.clone();
                let neighbors = self
                    .neighbor_edges(node)
                    .into_iter()
                    .map(|(neighbor, edge)| (self.graph[neighbor].token.clone(), self.graph[edge].market.clone()))
                    .collect();
                (token, neighbors)
            })
            .collect()
    }

    pub fn get_token(&self, address: &Address) -> Option<Arc<Token>> {
        self.tokens.get(address).cloned()
    }

    pub fn get_market(&self, address: &Address) -> Option<MarketWrapper> {
        self.markets.get(address).cloned()
    }

    pub fn token_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn market_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenNode {
    pub token: Arc<Token>,
}

impl Display for TokenNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.token.get_address())
    }
}

impl TokenNode {
    pub fn new(token: Arc<Token>) -> Self {
        Self { token }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketEdge {
    pub market: MarketWrapper,
}

impl Display for MarketEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.market.get_market_address())
    }
}

impl MarketEdge {
    pub fn new(market: MarketWrapper) -> Self {
        Self { market }
    }
}
