use crate::routing::swap_path::SwapPath;
use crate::routing::token_graph::TokenGraph;
use alloy_primitives::Address;
use petgraph::prelude::*;
use std::collections::VecDeque;
use tracing::error;

/// Upper bound on visited search states, against pathological registries.
pub const MAX_SEARCH_STATES: usize = 500_000;

/// State of the search for all paths between two nodes in the graph.
#[derive(Debug)]
struct PathState {
    node: NodeIndex<usize>,
    current_path: SwapPath,
    hops: u8,
}

/// Find all simple paths (no market used twice, token revisits allowed) from
/// `token_in` to `token_out` with at most `max_hops` markets.
///
/// The search is a depth-first worklist walk. Neighbor states are pushed in
/// reverse adjacency order so the stack pops them in adjacency order, which
/// makes the result order deterministic: paths sorted by first-hop adjacency
/// position, then recursively within each branch. A path is recorded the
/// moment it reaches `token_out` and that branch is not extended further.
///
/// Unknown tokens and `token_in == token_out` yield no paths.
pub fn find_paths_between(token_graph: &TokenGraph, token_in: Address, token_out: Address, max_hops: u8) -> eyre::Result<Vec<SwapPath>> {
    let mut found_paths = vec![];

    if token_in == token_out || max_hops == 0 {
        return Ok(found_paths);
    }
    let (Some(&start_node), Some(&end_node)) = (token_graph.token_index.get(&token_in), token_graph.token_index.get(&token_out)) else {
        return Ok(found_paths);
    };

    let mut stack = VecDeque::new();

    // Seed with every first hop, reversed so pop order is adjacency order.
    for (neighbor, edge) in token_graph.neighbor_edges(start_node).into_iter().rev() {
        let token_from = token_graph.graph[start_node].token.clone();
        let token_to = token_graph.graph[neighbor].token.clone();
        let market = token_graph.graph[edge].market.clone();
        if let Ok(initial_path) = SwapPath::new_first(token_from, token_to, market) {
            stack.push_back(PathState { node: neighbor, current_path: initial_path, hops: 1 });
        }
    }

    let mut searched_path_counter = 0;

    while let Some(PathState { node, current_path, hops }) = stack.pop_back() {
        // This is the upper limit to prevent infinite loops in case of a bug and limit the search space
        if searched_path_counter > MAX_SEARCH_STATES {
            error!(
                "Path search exceeded {} states for token_in={:#}, token_out={:#}, max_hops={}",
                MAX_SEARCH_STATES, token_in, token_out, max_hops
            );
            break;
        }
        searched_path_counter += 1;

        // Reaching the target records the path; the branch ends here.
        if node == end_node {
            found_paths.push(current_path);
            continue;
        }

        // If we've used all allowed hops, skip expansion
        if hops >= max_hops {
            continue;
        }

        for (neighbor, edge) in token_graph.neighbor_edges(node).into_iter().rev() {
            let market = &token_graph.graph[edge].market;
            if current_path.contains_market_address(&market.get_market_address()) {
                continue;
            }

            let token_to = token_graph.graph[neighbor].token.clone();
            let mut new_path = current_path.clone();
            if new_path.push_hop(token_to, market.clone()).is_ok() {
                stack.push_back(PathState { node: neighbor, current_path: new_path, hops: hops + 1 });
            }
        }
    }

    Ok(found_paths)
}
