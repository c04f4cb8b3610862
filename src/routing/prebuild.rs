/*
 * Prebuilt route artifact.
 *
 * The full enumeration is expensive, so it runs offline and ships as a JSON
 * artifact keyed by network. At startup the artifact is checked against the
 * live registry (format version, network, registry fingerprint) and expanded
 * back into the in-memory graph and path index without re-enumerating.
 */

use std::collections::BTreeMap;
use std::path::Path;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::registry::market::MarketRegistry;
use crate::registry::network::NetworkId;
use crate::routing::paths_index::SwapPathsIndex;
use crate::routing::swap_path::SwapPath;
use crate::routing::token_graph::TokenGraph;

/// Bumped whenever the artifact layout changes shape.
pub const PREBUILT_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum PrebuildError {
    #[error("Artifact IO failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Artifact JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Artifact format version {found} does not match expected {expected}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Artifact was built for network {found}, registry is {expected}")]
    NetworkMismatch { expected: NetworkId, found: NetworkId },
    #[error("Artifact registry fingerprint {found} does not match {expected}")]
    RegistryMismatch { expected: B256, found: B256 },
    #[error("Artifact references unknown market {0}")]
    UnknownMarket(Address),
    #[error("Artifact path from {token_in} to {token_out} does not thread through the registry")]
    InvalidPath { token_in: Address, token_out: Address },
}

/// One adjacency entry of the serialized graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrebuiltAdjacency {
    pub neighbor: Address,
    pub market: Address,
}

/// Serialized routing state for one network.
///
/// BTreeMap keys keep the JSON byte-stable across builds; path lists stay in
/// enumeration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrebuiltRoutes {
    pub version: u32,
    pub network: NetworkId,
    pub registry_fingerprint: B256,
    pub max_hops: u8,
    pub graph: BTreeMap<Address, Vec<PrebuiltAdjacency>>,
    pub paths: BTreeMap<Address, BTreeMap<Address, Vec<Vec<Address>>>>,
}

impl PrebuiltRoutes {
    pub fn build(registry: &MarketRegistry, token_graph: &TokenGraph, paths_index: &SwapPathsIndex, max_hops: u8) -> PrebuiltRoutes {
        let mut graph: BTreeMap<Address, Vec<PrebuiltAdjacency>> = BTreeMap::new();
        for (token, neighbors) in token_graph.adjacency_entries() {
            let entries = neighbors
                .into_iter()
                .map(|(neighbor, market)| PrebuiltAdjacency { neighbor: neighbor.get_address(), market: market.get_market_address() })
                .collect();
            graph.insert(token.get_address(), entries);
        }

        let mut paths: BTreeMap<Address, BTreeMap<Address, Vec<Vec<Address>>>> = BTreeMap::new();
        for entry in paths_index.pair_paths.iter() {
            let (token_in, token_out) = *entry.key();
            let market_lists = entry.value().iter().map(|path| path.market_addresses()).collect();
            paths.entry(token_in).or_default().insert(token_out, market_lists);
        }

        let artifact = PrebuiltRoutes {
            version: PREBUILT_FORMAT_VERSION,
            network: registry.get_network(),
            registry_fingerprint: registry.fingerprint(),
            max_hops,
            graph,
            paths,
        };
        info!(
            network = %artifact.network,
            pairs = paths_index.pair_count(),
            paths = paths_index.path_count(),
            "Built prebuilt routes artifact"
        );
        artifact
    }

    pub async fn store(&self, path: impl AsRef<Path>) -> Result<(), PrebuildError> {
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<PrebuiltRoutes, PrebuildError> {
        let contents = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn store_sync(&self, path: impl AsRef<Path>) -> Result<(), PrebuildError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_sync(path: impl AsRef<Path>) -> Result<PrebuiltRoutes, PrebuildError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Expands the artifact back into live routing state, resolving market
    /// addresses against the registry. The registry must be the exact one the
    /// artifact was built from.
    pub fn into_index(self, registry: &MarketRegistry) -> Result<(TokenGraph, SwapPathsIndex), PrebuildError> {
        if self.version != PREBUILT_FORMAT_VERSION {
            return Err(PrebuildError::VersionMismatch { expected: PREBUILT_FORMAT_VERSION, found: self.version });
        }
        if self.network != registry.get_network() {
            return Err(PrebuildError::NetworkMismatch { expected: registry.get_network(), found: self.network });
        }
        let fingerprint = registry.fingerprint();
        if self.registry_fingerprint != fingerprint {
            return Err(PrebuildError::RegistryMismatch { expected: fingerprint, found: self.registry_fingerprint });
        }

        let token_graph = TokenGraph::from_registry(registry);
        let paths_index = SwapPathsIndex::new();
        let mut path_count = 0usize;
        for (token_in, destinations) in &self.paths {
            for (token_out, market_lists) in destinations {
                let mut paths = Vec::with_capacity(market_lists.len());
                for market_addresses in market_lists {
                    paths.push(resolve_path(registry, *token_in, *token_out, market_addresses)?);
                }
                path_count += paths.len();
                paths_index.extend_pair(*token_in, *token_out, paths);
            }
        }

        info!(
            network = %self.network,
            tokens = token_graph.token_count(),
            markets = token_graph.market_count(),
            paths = path_count,
            "Loaded prebuilt routes artifact"
        );
        Ok((token_graph, paths_index))
    }
}

/// Threads a stored market-address list back into a [`SwapPath`], starting
/// from the pair's source token.
fn resolve_path(registry: &MarketRegistry, token_in: Address, token_out: Address, market_addresses: &[Address]) -> Result<SwapPath, PrebuildError> {
    let invalid = || PrebuildError::InvalidPath { token_in, token_out };

    let mut current = registry.get_token(&token_in).ok_or_else(invalid)?;
    let mut tokens = vec![current.clone()];
    let mut markets = Vec::with_capacity(market_addresses.len());
    for market_address in market_addresses {
        let market = registry.get_market(market_address).ok_or(PrebuildError::UnknownMarket(*market_address))?;
        let next_address = market.opposite_token(&current.get_address()).ok_or_else(invalid)?;
        let next = registry.get_token(&next_address).ok_or_else(invalid)?;
        tokens.push(next.clone());
        markets.push(market);
        current = next;
    }
    if current.get_address() != token_out {
        return Err(invalid());
    }

    SwapPath::new(tokens, markets).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::market::Market;
    use crate::routing::paths_index::enumerate_all_paths;
    use eyre::Result;

    fn market(address: u8, long: u8, short: u8) -> Market {
        Market::new(Address::repeat_byte(address), Address::repeat_byte(0xEE), Address::repeat_byte(long), Address::repeat_byte(short))
    }

    /// 0x01 - 0x02 - 0x03 chain plus a direct 0x01 - 0x03 market.
    fn test_registry() -> Result<MarketRegistry> {
        let registry = MarketRegistry::from_entries(
            NetworkId::Arbitrum,
            vec![],
            vec![market(0xA1, 0x01, 0x02), market(0xA2, 0x02, 0x03), market(0xA3, 0x01, 0x03)],
        )?;
        Ok(registry)
    }

    fn build_artifact(registry: &MarketRegistry) -> (PrebuiltRoutes, TokenGraph, SwapPathsIndex) {
        let token_graph = TokenGraph::from_registry(registry);
        let paths_index = enumerate_all_paths(&token_graph, 3, None);
        let artifact = PrebuiltRoutes::build(registry, &token_graph, &paths_index, 3);
        (artifact, token_graph, paths_index)
    }

    fn pair_market_lists(index: &SwapPathsIndex, token_in: u8, token_out: u8) -> Vec<Vec<Address>> {
        index
            .paths_between(Address::repeat_byte(token_in), Address::repeat_byte(token_out))
            .iter()
            .map(|path| path.market_addresses())
            .collect()
    }

    #[test]
    fn test_round_trip_reproduces_index() -> Result<()> {
        let registry = test_registry()?;
        let (artifact, token_graph, paths_index) = build_artifact(&registry);

        let json = serde_json::to_string(&artifact)?;
        let restored: PrebuiltRoutes = serde_json::from_str(&json)?;
        let (loaded_graph, loaded_index) = restored.into_index(&registry)?;

        assert_eq!(loaded_graph.token_count(), token_graph.token_count());
        assert_eq!(loaded_graph.market_count(), token_graph.market_count());
        assert_eq!(loaded_index.pair_count(), paths_index.pair_count());
        assert_eq!(loaded_index.path_count(), paths_index.path_count());

        // Per-pair path order survives the round trip.
        for (token_in, token_out) in [(0x01, 0x02), (0x01, 0x03), (0x03, 0x01), (0x02, 0x03)] {
            assert_eq!(
                pair_market_lists(&loaded_index, token_in, token_out),
                pair_market_lists(&paths_index, token_in, token_out),
            );
        }

        // Adjacency view matches too.
        let original: Vec<_> = token_graph
            .adjacency_entries()
            .into_iter()
            .map(|(token, neighbors)| {
                (
                    token.get_address(),
                    neighbors
                        .into_iter()
                        .map(|(neighbor, market)| (neighbor.get_address(), market.get_market_address()))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        let loaded: Vec<_> = loaded_graph
            .adjacency_entries()
            .into_iter()
            .map(|(token, neighbors)| {
                (
                    token.get_address(),
                    neighbors
                        .into_iter()
                        .map(|(neighbor, market)| (neighbor.get_address(), market.get_market_address()))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        assert_eq!(original, loaded);

        Ok(())
    }

    #[test]
    fn test_version_mismatch_rejected() -> Result<()> {
        let registry = test_registry()?;
        let (mut artifact, _, _) = build_artifact(&registry);
        artifact.version = PREBUILT_FORMAT_VERSION + 1;

        let err = artifact.into_index(&registry).unwrap_err();
        assert!(matches!(err, PrebuildError::VersionMismatch { found, .. } if found == PREBUILT_FORMAT_VERSION + 1));

        Ok(())
    }

    #[test]
    fn test_network_mismatch_rejected() -> Result<()> {
        let registry = test_registry()?;
        let (mut artifact, _, _) = build_artifact(&registry);
        artifact.network = NetworkId::Avalanche;

        let err = artifact.into_index(&registry).unwrap_err();
        assert!(matches!(
            err,
            PrebuildError::NetworkMismatch { expected: NetworkId::Arbitrum, found: NetworkId::Avalanche }
        ));

        Ok(())
    }

    #[test]
    fn test_registry_drift_rejected() -> Result<()> {
        let registry = test_registry()?;
        let (artifact, _, _) = build_artifact(&registry);

        // Same network, one extra market: fingerprints diverge.
        let mut drifted = test_registry()?;
        drifted.add_market(market(0xA4, 0x03, 0x04))?;

        let err = artifact.into_index(&drifted).unwrap_err();
        assert!(matches!(err, PrebuildError::RegistryMismatch { .. }));

        Ok(())
    }

    #[test]
    fn test_tampered_paths_rejected() -> Result<()> {
        let registry = test_registry()?;
        let (mut artifact, _, _) = build_artifact(&registry);

        // Splice a market address the registry has never seen into one list.
        let bogus = Address::repeat_byte(0x99);
        let destinations = artifact.paths.get_mut(&Address::repeat_byte(0x01)).unwrap();
        let lists = destinations.get_mut(&Address::repeat_byte(0x02)).unwrap();
        lists[0] = vec![bogus];

        let err = artifact.into_index(&registry).unwrap_err();
        assert!(matches!(err, PrebuildError::UnknownMarket(address) if address == bogus));

        Ok(())
    }

    #[test]
    fn test_unthreaded_paths_rejected() -> Result<()> {
        let registry = test_registry()?;
        let (mut artifact, _, _) = build_artifact(&registry);

        // 0xA2 exists but does not contain token 0x01, so the walk cannot start.
        let destinations = artifact.paths.get_mut(&Address::repeat_byte(0x01)).unwrap();
        let lists = destinations.get_mut(&Address::repeat_byte(0x02)).unwrap();
        lists[0] = vec![Address::repeat_byte(0xA2)];

        let err = artifact.into_index(&registry).unwrap_err();
        assert!(matches!(
            err,
            PrebuildError::InvalidPath { token_in, token_out }
                if token_in == Address::repeat_byte(0x01) && token_out == Address::repeat_byte(0x02)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_store_and_load() -> Result<()> {
        let registry = test_registry()?;
        let (artifact, _, paths_index) = build_artifact(&registry);

        let file = std::env::temp_dir().join(format!("prebuilt_routes_{}.json", std::process::id()));
        artifact.store(&file).await?;
        let loaded = PrebuiltRoutes::load(&file).await?;
        std::fs::remove_file(&file)?;

        assert_eq!(loaded.version, PREBUILT_FORMAT_VERSION);
        assert_eq!(loaded.network, NetworkId::Arbitrum);
        assert_eq!(loaded.registry_fingerprint, registry.fingerprint());

        let (_, loaded_index) = loaded.into_index(&registry)?;
        assert_eq!(loaded_index.path_count(), paths_index.path_count());

        Ok(())
    }

    #[test]
    fn test_store_and_load_sync() -> Result<()> {
        let registry = test_registry()?;
        let (artifact, _, _) = build_artifact(&registry);

        let file = std::env::temp_dir().join(format!("prebuilt_routes_sync_{}.json", std::process::id()));
        artifact.store_sync(&file)?;
        let loaded = PrebuiltRoutes::load_sync(&file)?;
        std::fs::remove_file(&file)?;

        assert_eq!(loaded.registry_fingerprint, artifact.registry_fingerprint);
        assert_eq!(loaded.max_hops, artifact.max_hops);

        Ok(())
    }
}
