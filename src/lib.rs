// Four-Layer Architecture
pub mod registry;   // Reference Data Layer: tokens, markets, per-network registry
pub mod routing;    // Routing Layer: token graph, path enumeration, prebuilt routes
pub mod pricing;    // Pricing Layer: market-state seam, path cost evaluation
pub mod strategy;   // Strategy Layer: candidate comparison, swap strategy selection

// Common utilities and types
pub mod utils;

// Re-export key components from each layer
pub use registry::{
    Market, MarketEntry, MarketRegistry, MarketWrapper, NetworkId, RegistryError, RegistryFile,
    RouterConfigRoot, RouterConfigSection, Token, TokenEntry, TokenWrapper,
};
pub use routing::{
    enumerate_all_paths, find_paths_between, PrebuildError, PrebuiltRoutes, RouterStats,
    SwapParams, SwapPath, SwapPathHash, SwapPathsIndex, SwapRouter, SwapRouterBuilder, TokenGraph,
};
pub use pricing::{
    rank_candidates, EvaluationError, EvaluatorConfig, HopQuote, MarketReserves, MarketSnapshot,
    MarketStateLookup, PathEvaluator, StateLookupError, SwapHopStats, SwapPathStats,
};
pub use strategy::{
    resolve_external_quote, select_swap_strategy, ExternalQuoteError, ExternalQuoteSource,
    ExternalSwapQuote, SelectionContext, StrategyCandidates, StrategyError, SwapAmounts,
    SwapStrategy, SwapStrategyKind,
};
pub use utils::{LoadConfigError, RouterConfigLoader, RouterConfigLoaderSync};
