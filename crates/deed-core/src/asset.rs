//! # Asset Identifiers
//!
//! The registry's token id for a unique asset. The ledger keys its listing
//! table by `AssetId`; at most one active listing exists per id.

use serde::{Deserialize, Serialize};

/// Registry token id of a unique asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl AssetId {
    /// Wrap a raw token id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw token id.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for AssetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "asset:{}", self.0)
    }
}
