pub mod config;
pub mod market;
pub mod network;
pub mod token;

pub use config::{MarketEntry, RegistryFile, RouterConfigRoot, RouterConfigSection, TokenEntry};
pub use market::{Market, MarketRegistry, MarketWrapper, RegistryError};
pub use network::NetworkId;
pub use token::{Token, TokenWrapper};
