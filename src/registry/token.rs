use alloy_primitives::utils::Unit;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Collateral token reference data. Identity is the address alone so tokens
/// with missing or conflicting metadata still compare and hash correctly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Token {
    address: Address,
    decimals: u8,
    name: Option<String>,
    symbol: Option<String>,
}

pub type TokenWrapper = Arc<Token>;

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Token {}

impl Token {
    pub fn new(address: Address) -> Token {
        Token { address, decimals: 18, ..Token::default() }
    }

    pub fn new_with_data(address: Address, symbol: Option<String>, name: Option<String>, decimals: Option<u8>) -> Token {
        Token { address, symbol, name, decimals: decimals.unwrap_or(18) }
    }

    // For testing purposes
    pub fn random() -> Token {
        Token::new(Address::random())
    }

    // For testing purposes
    pub fn repeat_byte(byte: u8) -> Token {
        Token::new(Address::repeat_byte(byte))
    }

    pub fn get_symbol(&self) -> String {
        self.symbol.clone().unwrap_or_else(|| self.address.to_string())
    }

    pub fn get_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.address.to_string())
    }

    pub fn get_decimals(&self) -> u8 {
        self.decimals
    }

    pub fn get_exp(&self) -> U256 {
        if self.decimals == 18 { Unit::ETHER.wei() } else { U256::from(10).pow(U256::from(self.decimals)) }
    }

    pub fn get_address(&self) -> Address {
        self.address
    }

    /// Whole token units scaled to the token's raw denomination.
    pub fn from_units(&self, units: u64) -> U256 {
        U256::from(units) * self.get_exp()
    }

    /// Lossy conversion to whole-token units; values outside the u64 range
    /// collapse to zero.
    pub fn to_float(&self, value: U256) -> f64 {
        if self.decimals == 0 {
            return 0f64;
        }
        let (whole, frac) = value.div_rem(self.get_exp());
        match (u64::try_from(whole), u64::try_from(frac)) {
            (Ok(whole), Ok(frac)) => whole as f64 + frac as f64 / 10u64.pow(self.decimals as u32) as f64,
            _ => 0f64,
        }
    }
}
