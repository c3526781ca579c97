//! # Settlement Receipts
//!
//! `finalize_sale` and `cancel_sale` each disburse a listing's entire
//! deposited balance and move the asset out of ledger custody. The
//! [`Settlement`] they return records where everything went.
//!
//! ## Conservation
//!
//! `seller_payout + buyer_refund` equals the deposited balance immediately
//! before settlement. No value is created or destroyed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use deed_core::{Address, Amount, AssetId, Timestamp};

/// Unique identifier for a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementId(Uuid);

impl SettlementId {
    /// Generate a new random settlement identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SettlementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SettlementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "settlement:{}", self.0)
    }
}

/// How a listing was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// Sale completed: asset to buyer, price to seller, excess to buyer.
    Finalized,
    /// Cancelled before a passing inspection: deposit back to the buyer.
    CancelledRefunded,
    /// Cancelled after a passing inspection: deposit forfeited to the seller.
    CancelledForfeited,
}

impl SettlementOutcome {
    /// Whether the sale went through.
    pub fn is_sale(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl std::fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Finalized => "finalized",
            Self::CancelledRefunded => "cancelled_refunded",
            Self::CancelledForfeited => "cancelled_forfeited",
        };
        f.write_str(s)
    }
}

/// Receipt for a terminal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique settlement identifier.
    pub id: SettlementId,
    /// The settled asset.
    pub asset: AssetId,
    /// How the listing ended.
    pub outcome: SettlementOutcome,
    /// Who now owns the asset.
    pub asset_recipient: Address,
    /// Amount paid to the seller.
    pub seller_payout: Amount,
    /// Amount returned to the buyer.
    pub buyer_refund: Amount,
    /// When the settlement committed.
    pub settled_at: Timestamp,
}

impl Settlement {
    /// Total value that left the ledger.
    pub fn total_disbursed(&self) -> Option<Amount> {
        self.seller_payout.checked_add(self.buyer_refund)
    }
}
