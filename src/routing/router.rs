/*
 * Router facade.
 *
 * Ties the layers together: a validated registry goes in, the token graph and
 * path index are built (or loaded from a prebuilt artifact), and per-request
 * quoting runs against caller-supplied market state. The router is immutable
 * after construction; registry changes mean building a new router.
 */

use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::pricing::market_state::MarketStateLookup;
use crate::pricing::path_evaluator::{EvaluatorConfig, PathEvaluator};
use crate::registry::config::RouterConfigSection;
use crate::registry::market::MarketRegistry;
use crate::registry::network::NetworkId;
use crate::routing::paths_index::{enumerate_all_paths, SwapPathsIndex};
use crate::routing::prebuild::{PrebuildError, PrebuiltRoutes};
use crate::routing::swap_path::SwapPath;
use crate::routing::token_graph::TokenGraph;
use crate::strategy::external::{resolve_external_quote, ExternalQuoteSource};
use crate::strategy::selector::{select_swap_strategy, SelectionContext, StrategyCandidates, StrategyError};
use crate::strategy::types::SwapStrategy;

/// One swap quote request.
#[derive(Debug, Clone, Copy)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    /// Permits a blended external + internal fill when the external quote is
    /// partial.
    pub allow_combined: bool,
}

/// Snapshot of the router's routing state, for logs and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    pub network: NetworkId,
    pub token_count: usize,
    pub market_count: usize,
    pub pair_count: usize,
    pub path_count: usize,
    pub max_hops: u8,
}

pub struct SwapRouter {
    config: RouterConfigSection,
    registry: MarketRegistry,
    token_graph: TokenGraph,
    paths_index: SwapPathsIndex,
    evaluator: PathEvaluator,
}

impl SwapRouter {
    /// Builds the routing state from scratch: graph construction plus full
    /// path enumeration. The offline artifact path avoids this cost, see
    /// [`SwapRouter::from_prebuilt`].
    pub fn from_registry(registry: MarketRegistry, config: RouterConfigSection) -> SwapRouter {
        info!(
            network = %registry.get_network(),
            markets = registry.len(),
            max_hops = config.max_hops,
            "Building swap router"
        );

        let token_graph = TokenGraph::from_registry(&registry);
        let paths_index = enumerate_all_paths(&token_graph, config.max_hops, config.max_paths_per_pair);

        info!(
            tokens = token_graph.token_count(),
            markets = token_graph.market_count(),
            pairs = paths_index.pair_count(),
            paths = paths_index.path_count(),
            "Swap router ready"
        );

        let evaluator = PathEvaluator::new(EvaluatorConfig { parallel: config.parallel_evaluation });
        SwapRouter { config, registry, token_graph, paths_index, evaluator }
    }

    /// Restores the routing state from a prebuilt artifact. The artifact's
    /// hop bound is authoritative: the paths were enumerated under it.
    pub fn from_prebuilt(artifact: PrebuiltRoutes, registry: MarketRegistry, config: RouterConfigSection) -> Result<SwapRouter, PrebuildError> {
        let mut config = config;
        if artifact.max_hops != config.max_hops {
            warn!(
                artifact = artifact.max_hops,
                configured = config.max_hops,
                "Prebuilt artifact hop bound overrides the configured one"
            );
            config.max_hops = artifact.max_hops;
        }

        let (token_graph, paths_index) = artifact.into_index(&registry)?;
        let evaluator = PathEvaluator::new(EvaluatorConfig { parallel: config.parallel_evaluation });
        Ok(SwapRouter { config, registry, token_graph, paths_index, evaluator })
    }

    /// Serializes the current routing state for offline storage.
    pub fn prebuild(&self) -> PrebuiltRoutes {
        PrebuiltRoutes::build(&self.registry, &self.token_graph, &self.paths_index, self.config.max_hops)
    }

    /// All known paths for the pair, in enumeration order. Empty for the
    /// same token, unknown tokens or unreachable pairs.
    pub fn swap_paths(&self, token_in: Address, token_out: Address) -> Vec<SwapPath> {
        if token_in == token_out {
            return vec![];
        }
        self.paths_index.paths_between(token_in, token_out)
    }

    /// Quotes one swap request against the supplied market state and picks a
    /// strategy.
    ///
    /// Candidate paths that fail evaluation are dropped, a failed external
    /// quote means no external candidate; only the terminal no-route case is
    /// an error.
    pub async fn best_swap_strategy(
        &self,
        params: SwapParams,
        state: &dyn MarketStateLookup,
        external: Option<&dyn ExternalQuoteSource>,
    ) -> Result<SwapStrategy, StrategyError> {
        let usd_in = self
            .registry
            .get_token(&params.token_in)
            .and_then(|token| state.token_price_usd(params.token_in).map(|price| token.to_float(params.amount_in) * price))
            .unwrap_or_default();
        let context = SelectionContext {
            token_in: params.token_in,
            token_out: params.token_out,
            amount_in: params.amount_in,
            usd_in,
            allow_combined: params.allow_combined,
        };

        if params.token_in == params.token_out {
            return select_swap_strategy(StrategyCandidates::default(), &context);
        }

        let external = match external {
            Some(source) => resolve_external_quote(source, params.token_in, params.token_out, params.amount_in).await,
            None => None,
        };

        // A combined-eligible quote fixes the split: the internal side only
        // has to fill what the quote leaves uncovered.
        let internal_amount = match external.as_ref() {
            Some(quote) if params.allow_combined && quote.amount_in < params.amount_in => params.amount_in - quote.amount_in,
            _ => params.amount_in,
        };

        let paths = self.swap_paths(params.token_in, params.token_out);
        let mut internal = Vec::with_capacity(paths.len());
        for result in self.evaluator.evaluate_paths(&paths, internal_amount, state) {
            match result {
                Ok(stats) => internal.push(stats),
                Err(error) => debug!(%error, "Dropping internal candidate"),
            }
        }

        select_swap_strategy(StrategyCandidates { internal, external }, &context)
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            network: self.registry.get_network(),
            token_count: self.token_graph.token_count(),
            market_count: self.token_graph.market_count(),
            pair_count: self.paths_index.pair_count(),
            path_count: self.paths_index.path_count(),
            max_hops: self.config.max_hops,
        }
    }
}

/// Builder for [`SwapRouter`] construction from a registry.
pub struct SwapRouterBuilder {
    config: RouterConfigSection,
    expected_network: Option<NetworkId>,
}

impl SwapRouterBuilder {
    pub fn new() -> Self {
        Self { config: RouterConfigSection::default(), expected_network: None }
    }

    pub fn with_max_hops(mut self, max_hops: u8) -> Self {
        self.config = self.config.with_max_hops(max_hops);
        self
    }

    pub fn with_parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config = self.config.with_parallel_evaluation(enabled);
        self
    }

    pub fn with_max_paths_per_pair(mut self, limit: usize) -> Self {
        self.config = self.config.with_max_paths_per_pair(Some(limit));
        self
    }

    /// Network the registry is expected to serve; a mismatch is logged, not
    /// fatal.
    pub fn with_network(mut self, network: NetworkId) -> Self {
        self.expected_network = Some(network);
        self
    }

    pub fn build(self, registry: MarketRegistry) -> SwapRouter {
        if let Some(expected) = self.expected_network {
            if registry.get_network() != expected {
                warn!(
                    expected = %expected,
                    actual = %registry.get_network(),
                    "Registry network differs from the configured one"
                );
            }
        }
        SwapRouter::from_registry(registry, self.config)
    }
}

impl Default for SwapRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
