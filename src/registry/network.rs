use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, VariantNames};

/// Deployment a market registry belongs to. Prebuilt route artifacts are
/// keyed by this so a file built for one deployment is never loaded into
/// another.
#[derive(Copy, Clone, Debug, Display, PartialEq, Hash, Eq, EnumString, VariantNames, Default, Deserialize, Serialize, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkId {
    #[default]
    Arbitrum,
    Avalanche,
    ArbitrumSepolia,
    AvalancheFuji,
}

impl NetworkId {
    pub fn get_chain_id(&self) -> u64 {
        match self {
            NetworkId::Arbitrum => 42161,
            NetworkId::Avalanche => 43114,
            NetworkId::ArbitrumSepolia => 421614,
            NetworkId::AvalancheFuji => 43113,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, NetworkId::ArbitrumSepolia | NetworkId::AvalancheFuji)
    }
}
