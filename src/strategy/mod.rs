pub mod external;
pub mod selector;
pub mod types;

pub use external::{resolve_external_quote, ExternalQuoteError, ExternalQuoteSource};
pub use selector::{select_swap_strategy, SelectionContext, StrategyCandidates, StrategyError};
pub use types::{ExternalSwapQuote, SwapAmounts, SwapStrategy, SwapStrategyKind};
