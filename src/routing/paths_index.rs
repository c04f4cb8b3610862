use crate::routing::path_builder::find_paths_between;
use crate::routing::swap_path::SwapPath;
use crate::routing::swap_path_hash::SwapPathHash;
use crate::routing::token_graph::TokenGraph;
use alloy_primitives::Address;
use dashmap::{DashMap, DashSet};
use rayon::prelude::*;
use tracing::error;

/*
   Pair-keyed container for enumerated swap paths. A path is stored only once
   (hash dedup) and the per-pair vectors keep discovery order, which is what
   downstream ranking ties break on. The index is read-only after enumeration.
*/
#[derive(Clone, Debug, Default)]
pub struct SwapPathsIndex {
    // Used to check before inserting a new path if it already exists
    pub swap_path_hashes: DashSet<SwapPathHash>,
    // (token_in, token_out) -> paths in discovery order
    pub pair_paths: DashMap<(Address, Address), Vec<SwapPath>>,
}

impl SwapPathsIndex {
    pub fn new() -> SwapPathsIndex {
        SwapPathsIndex { swap_path_hashes: DashSet::new(), pair_paths: DashMap::new() }
    }

    /// Add a path under its endpoint pair. Returns false for duplicates and
    /// for empty paths.
    pub fn add(&self, path: SwapPath) -> bool {
        let (Some(token_in), Some(token_out)) = (path.token_in(), path.token_out()) else {
            return false;
        };
        let key = (token_in.get_address(), token_out.get_address());

        if !self.swap_path_hashes.insert(path.swap_path_hash) {
            return false;
        }
        self.pair_paths.entry(key).or_default().push(path);
        true
    }

    /// Append paths for one pair, keeping their order and skipping duplicates.
    pub fn extend_pair(&self, token_in: Address, token_out: Address, paths: Vec<SwapPath>) {
        let mut entry = self.pair_paths.entry((token_in, token_out)).or_default();
        for path in paths {
            if self.swap_path_hashes.insert(path.swap_path_hash) {
                entry.push(path);
            }
        }
    }

    /// All stored paths from `token_in` to `token_out`, in discovery order.
    /// Unknown pairs give an empty vec.
    pub fn paths_between(&self, token_in: Address, token_out: Address) -> Vec<SwapPath> {
        self.pair_paths.get(&(token_in, token_out)).map(|entry| entry.value().clone()).unwrap_or_default()
    }

    pub fn pair_count(&self) -> usize {
        self.pair_paths.len()
    }

    pub fn path_count(&self) -> usize {
        self.swap_path_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swap_path_hashes.is_empty()
    }
}

/// Enumerate every path of at most `max_hops` markets for all ordered token
/// pairs of the graph. Source tokens are walked in parallel; per-pair order
/// is produced by a single sequential search, so the result does not depend
/// on scheduling. `max_paths_per_pair` keeps the first n discovered paths of
/// each pair.
pub fn enumerate_all_paths(token_graph: &TokenGraph, max_hops: u8, max_paths_per_pair: Option<usize>) -> SwapPathsIndex {
    let tokens: Vec<Address> = token_graph.graph.node_indices().map(|node| token_graph.graph[node].token.get_address()).collect();
    let index = SwapPathsIndex::new();

    tokens.par_iter().for_each(|&token_in| {
        for &token_out in tokens.iter() {
            if token_in == token_out {
                continue;
            }
            match find_paths_between(token_graph, token_in, token_out, max_hops) {
                Ok(mut paths) => {
                    if let Some(limit) = max_paths_per_pair {
                        paths.truncate(limit);
                    }
                    if !paths.is_empty() {
                        index.extend_pair(token_in, token_out, paths);
                    }
                }
                Err(error) => {
                    error!("Path enumeration failed for {:#} -> {:#}: {}", token_in, token_out, error);
                }
            }
        }
    });

    index
}
