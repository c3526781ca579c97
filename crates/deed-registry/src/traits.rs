//! # Collaborator Traits
//!
//! The minimal surface the ledger needs from the outside world.
//!
//! ## Atomicity
//!
//! A settlement touches both collaborators: it moves the asset through the
//! registry and pays one or two recipients through the rail. The ledger
//! takes a [`Revertible::checkpoint`] of each collaborator before the first
//! effect and calls [`Revertible::revert`] on both if any later effect
//! fails, so callers observe either every effect or none of them.
//!
//! Implementations must guarantee that reverting to a checkpoint restores
//! every observable piece of state the trait methods expose.

use deed_core::{Address, Amount, AssetId};

use crate::error::{PaymentError, RegistryError};

/// A collaborator whose state can be snapshotted and restored.
pub trait Revertible {
    /// Opaque snapshot of the collaborator's state.
    type Checkpoint;

    /// Capture the current state.
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Restore the state captured by `checkpoint`.
    fn revert(&mut self, checkpoint: Self::Checkpoint);
}

/// Registry of unique-asset ownership.
pub trait AssetRegistry: Revertible {
    /// Identity of the registry itself.
    fn address(&self) -> Address;

    /// Current owner of `asset`.
    fn owner_of(&self, asset: AssetId) -> Result<Address, RegistryError>;

    /// Move `asset` from `from` to `to` on behalf of `operator`.
    ///
    /// Fails unless `from` is the current owner and `operator` is either
    /// `from` itself or the operator `from` approved for this asset.
    fn transfer(
        &mut self,
        operator: Address,
        asset: AssetId,
        from: Address,
        to: Address,
    ) -> Result<(), RegistryError>;
}

/// Outbound value transfers from the ledger.
pub trait PaymentRail: Revertible {
    /// Push `amount` to `to`. The recipient may refuse.
    fn pay(&mut self, to: Address, amount: Amount) -> Result<(), PaymentError>;
}
