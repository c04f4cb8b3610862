use alloy_primitives::hex;
use std::fmt::{Debug, Display};

/// Stable sha256 identity of a swap path, reproducible across runs and
/// processes. Used for global dedup and for naming paths in logs.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct SwapPathHash(pub [u8; 32]);

impl Display for SwapPathHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode_prefixed(self.0))
    }
}

impl Debug for SwapPathHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SwapPathHash({})", hex::encode_prefixed(self.0))
    }
}

impl From<[u8; 32]> for SwapPathHash {
    fn from(digest: [u8; 32]) -> Self {
        SwapPathHash(digest)
    }
}
