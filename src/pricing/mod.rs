pub mod market_state;
pub mod path_evaluator;

pub use market_state::{HopQuote, MarketReserves, MarketSnapshot, MarketStateLookup, StateLookupError};
pub use path_evaluator::{
    rank_candidates, EvaluationError, EvaluatorConfig, PathEvaluator, SwapHopStats, SwapPathStats,
};
