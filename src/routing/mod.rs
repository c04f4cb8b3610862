pub mod path_builder;
pub mod paths_index;
pub mod prebuild;
pub mod router;
pub mod swap_path;
pub mod swap_path_hash;
pub mod token_graph;

pub use path_builder::{find_paths_between, MAX_SEARCH_STATES};
pub use paths_index::{enumerate_all_paths, SwapPathsIndex};
pub use prebuild::{PrebuildError, PrebuiltAdjacency, PrebuiltRoutes, PREBUILT_FORMAT_VERSION};
pub use router::{RouterStats, SwapParams, SwapRouter, SwapRouterBuilder};
pub use swap_path::{generate_swap_path_hash, SwapPath};
pub use swap_path_hash::SwapPathHash;
pub use token_graph::TokenGraph;
