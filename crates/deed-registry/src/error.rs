//! # Collaborator Error Types

use thiserror::Error;

use deed_core::{Address, Amount, AssetId};

/// Errors raised by an [`AssetRegistry`](crate::AssetRegistry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No asset with this id has been minted.
    #[error("{asset} does not exist")]
    UnknownAsset {
        /// The requested asset.
        asset: AssetId,
    },

    /// `from` does not own the asset.
    #[error("{asset} is owned by {owner}, not {claimed}")]
    NotOwner {
        /// The asset being moved.
        asset: AssetId,
        /// Its actual owner.
        owner: Address,
        /// The address the caller claimed owns it.
        claimed: Address,
    },

    /// The operator is neither the owner nor approved by the owner.
    #[error("{operator} is not approved to move {asset}")]
    NotApproved {
        /// The asset being moved.
        asset: AssetId,
        /// The operator that attempted the move.
        operator: Address,
    },

    /// Transfers and mints to the zero address are refused.
    #[error("{asset} cannot be assigned to the zero address")]
    ZeroAddress {
        /// The asset involved.
        asset: AssetId,
    },
}

/// Errors raised by a [`PaymentRail`](crate::PaymentRail).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The recipient refused the payment.
    #[error("recipient {to} rejected payment of {amount}")]
    RecipientRejected {
        /// The intended recipient.
        to: Address,
        /// The refused amount.
        amount: Amount,
    },

    /// Payments to the zero address would burn value.
    #[error("refusing to pay {amount} to the zero address")]
    ZeroAddress {
        /// The amount that would have been burned.
        amount: Amount,
    },

    /// Crediting the recipient would overflow its balance.
    #[error("crediting {amount} to {to} overflows its balance")]
    Overflow {
        /// The recipient.
        to: Address,
        /// The amount that could not be credited.
        amount: Amount,
    },
}
