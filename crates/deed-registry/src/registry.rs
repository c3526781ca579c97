//! # In-Memory Asset Registry
//!
//! A non-fungible token registry with ERC-721 ownership semantics:
//! sequential minting with a metadata URI, single-operator approval per
//! token, and approval cleared on every transfer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use deed_core::{Address, AssetId};

use crate::error::RegistryError;
use crate::traits::{AssetRegistry, Revertible};

/// Ownership record for one minted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Current owner.
    pub owner: Address,
    /// Operator the owner approved to move this token, if any.
    pub approved: Option<Address>,
    /// Metadata URI supplied at mint.
    pub token_uri: String,
}

/// Registry state captured by [`Revertible::checkpoint`].
#[derive(Debug, Clone)]
pub struct RegistryCheckpoint {
    tokens: BTreeMap<AssetId, TokenRecord>,
    next_id: u64,
}

/// In-process asset registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRegistry {
    address: Address,
    tokens: BTreeMap<AssetId, TokenRecord>,
    next_id: u64,
}

impl MemoryRegistry {
    /// Create an empty registry identified by `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            tokens: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Mint a new asset to `owner`. Ids start at 1 and increase by one.
    pub fn mint(
        &mut self,
        owner: Address,
        token_uri: impl Into<String>,
    ) -> Result<AssetId, RegistryError> {
        let asset = AssetId::new(self.next_id);
        if owner.is_zero() {
            return Err(RegistryError::ZeroAddress { asset });
        }
        self.tokens.insert(
            asset,
            TokenRecord {
                owner,
                approved: None,
                token_uri: token_uri.into(),
            },
        );
        self.next_id += 1;
        tracing::debug!(asset = %asset, owner = %owner, "minted asset");
        Ok(asset)
    }

    /// Approve `operator` to move `asset`. Only the owner may approve.
    pub fn approve(
        &mut self,
        caller: Address,
        asset: AssetId,
        operator: Address,
    ) -> Result<(), RegistryError> {
        let record = self
            .tokens
            .get_mut(&asset)
            .ok_or(RegistryError::UnknownAsset { asset })?;
        if record.owner != caller {
            return Err(RegistryError::NotOwner {
                asset,
                owner: record.owner,
                claimed: caller,
            });
        }
        record.approved = Some(operator);
        tracing::debug!(asset = %asset, operator = %operator, "approved operator");
        Ok(())
    }

    /// The operator currently approved for `asset`.
    pub fn get_approved(&self, asset: AssetId) -> Result<Option<Address>, RegistryError> {
        self.record(asset).map(|r| r.approved)
    }

    /// Metadata URI of `asset`.
    pub fn token_uri(&self, asset: AssetId) -> Result<&str, RegistryError> {
        self.record(asset).map(|r| r.token_uri.as_str())
    }

    /// Number of assets minted so far.
    pub fn total_supply(&self) -> u64 {
        self.tokens.len() as u64
    }

    fn record(&self, asset: AssetId) -> Result<&TokenRecord, RegistryError> {
        self.tokens
            .get(&asset)
            .ok_or(RegistryError::UnknownAsset { asset })
    }
}

impl Revertible for MemoryRegistry {
    type Checkpoint = RegistryCheckpoint;

    fn checkpoint(&self) -> Self::Checkpoint {
        RegistryCheckpoint {
            tokens: self.tokens.clone(),
            next_id: self.next_id,
        }
    }

    fn revert(&mut self, checkpoint: Self::Checkpoint) {
        self.tokens = checkpoint.tokens;
        self.next_id = checkpoint.next_id;
    }
}

impl AssetRegistry for MemoryRegistry {
    fn address(&self) -> Address {
        self.address
    }

    fn owner_of(&self, asset: AssetId) -> Result<Address, RegistryError> {
        self.record(asset).map(|r| r.owner)
    }

    fn transfer(
        &mut self,
        operator: Address,
        asset: AssetId,
        from: Address,
        to: Address,
    ) -> Result<(), RegistryError> {
        if to.is_zero() {
            return Err(RegistryError::ZeroAddress { asset });
        }
        let record = self
            .tokens
            .get_mut(&asset)
            .ok_or(RegistryError::UnknownAsset { asset })?;
        if record.owner != from {
            return Err(RegistryError::NotOwner {
                asset,
                owner: record.owner,
                claimed: from,
            });
        }
        if operator != from && record.approved != Some(operator) {
            return Err(RegistryError::NotApproved { asset, operator });
        }
        record.owner = to;
        record.approved = None;
        tracing::debug!(asset = %asset, from = %from, to = %to, "transferred asset");
        Ok(())
    }
}
