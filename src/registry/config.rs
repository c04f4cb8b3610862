use crate::registry::market::{Market, MarketRegistry, RegistryError};
use crate::registry::network::NetworkId;
use crate::registry::token::Token;
use crate::utils::config_loader::{LoadConfigError, RouterConfigLoader, RouterConfigLoaderSync, load_from_file, load_from_file_sync};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct RouterConfigRoot {
    pub router: RouterConfigSection,
}

#[derive(Clone, Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfigSection {
    pub max_hops: u8,
    pub parallel_evaluation: bool,
    /// Keeps dense registries bounded: only the first n discovered paths per
    /// token pair are retained. `None` keeps everything within the hop cap.
    pub max_paths_per_pair: Option<usize>,
}

impl RouterConfigSection {
    pub fn with_max_hops(&self, max_hops: u8) -> Self {
        Self { max_hops, ..self.clone() }
    }

    pub fn with_parallel_evaluation(&self, parallel_evaluation: bool) -> Self {
        Self { parallel_evaluation, ..self.clone() }
    }

    pub fn with_max_paths_per_pair(&self, max_paths_per_pair: Option<usize>) -> Self {
        Self { max_paths_per_pair, ..self.clone() }
    }
}

impl Default for RouterConfigSection {
    fn default() -> Self {
        Self { max_hops: 3, parallel_evaluation: true, max_paths_per_pair: None }
    }
}

#[async_trait]
impl RouterConfigLoader for RouterConfigSection {
    type Section = RouterConfigSection;

    async fn load_section_from_file(path: &str) -> Result<Self::Section, LoadConfigError> {
        let root: RouterConfigRoot = load_from_file(path).await?;
        Ok(root.router)
    }
}

impl RouterConfigLoaderSync for RouterConfigSection {
    type Section = RouterConfigSection;

    fn load_section_from_file_sync(path: &str) -> Result<Self::Section, LoadConfigError> {
        let root: RouterConfigRoot = load_from_file_sync(path)?;
        Ok(root.router)
    }
}

/// On-disk registry for one deployment: the token metadata table and the
/// market list, in the order the venue publishes them.
#[derive(Clone, Deserialize, Debug)]
pub struct RegistryFile {
    pub network: NetworkId,
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
    pub markets: Vec<MarketEntry>,
}

#[derive(Clone, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct TokenEntry {
    pub address: Address,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}

#[derive(Clone, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct MarketEntry {
    pub market_address: Address,
    pub index_token: Address,
    pub long_token: Address,
    pub short_token: Address,
}

impl From<TokenEntry> for Token {
    fn from(entry: TokenEntry) -> Self {
        Token::new_with_data(entry.address, entry.symbol, entry.name, entry.decimals)
    }
}

impl From<MarketEntry> for Market {
    fn from(entry: MarketEntry) -> Self {
        Market::new(entry.market_address, entry.index_token, entry.long_token, entry.short_token)
    }
}

impl RegistryFile {
    pub fn into_registry(self) -> Result<MarketRegistry, RegistryError> {
        MarketRegistry::from_entries(
            self.network,
            self.tokens.into_iter().map(Token::from).collect(),
            self.markets.into_iter().map(Market::from).collect(),
        )
    }
}

#[async_trait]
impl RouterConfigLoader for RegistryFile {
    type Section = RegistryFile;

    async fn load_section_from_file(path: &str) -> Result<Self::Section, LoadConfigError> {
        load_from_file(path).await
    }
}

impl RouterConfigLoaderSync for RegistryFile {
    type Section = RegistryFile;

    fn load_section_from_file_sync(path: &str) -> Result<Self::Section, LoadConfigError> {
        load_from_file_sync(path)
    }
}
