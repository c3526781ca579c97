//! # Roles
//!
//! The four parties to a sale. Seller, inspector and lender are bound once
//! in [`LedgerConfig`](crate::LedgerConfig); the buyer is bound per listing.

use serde::{Deserialize, Serialize};

/// A party to an escrowed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owns the asset and receives the purchase price.
    Seller,
    /// Deposits earnest money and receives the asset.
    Buyer,
    /// Records whether the asset passed inspection.
    Inspector,
    /// Funds the balance of the purchase price.
    Lender,
}

impl Role {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Buyer => "buyer",
            Self::Inspector => "inspector",
            Self::Lender => "lender",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
