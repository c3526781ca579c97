//! # Ledger Event Journal
//!
//! Every successful mutating operation appends one [`LedgerEvent`]. Failed
//! operations append nothing, so the journal replays exactly the state
//! changes the ledger committed.

use serde::{Deserialize, Serialize};

use deed_core::{Address, Amount, AssetId, Timestamp};

use crate::settlement::Settlement;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEventKind {
    /// Asset taken into custody and offered to `buyer`.
    Listed {
        /// The listing's buyer.
        buyer: Address,
        /// Agreed purchase price.
        purchase_price: Amount,
        /// Required earnest deposit.
        escrow_amount: Amount,
    },
    /// Buyer earnest deposit credited.
    EarnestDeposited {
        /// Amount credited.
        amount: Amount,
    },
    /// Inbound funding credited.
    FundsReceived {
        /// Who sent it.
        from: Address,
        /// Amount credited.
        amount: Amount,
    },
    /// Inspection result recorded.
    InspectionUpdated {
        /// The recorded result.
        passed: bool,
    },
    /// A party approved the sale for the first time.
    SaleApproved {
        /// The approving party.
        by: Address,
    },
    /// The sale completed.
    SaleFinalized {
        /// Where the asset and funds went.
        settlement: Settlement,
    },
    /// The sale was unwound.
    SaleCancelled {
        /// Where the asset and funds went.
        settlement: Settlement,
    },
}

/// A committed ledger state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the journal, starting at 1.
    pub sequence: u64,
    /// When the change committed.
    pub at: Timestamp,
    /// The listing affected.
    pub asset: AssetId,
    /// The change.
    pub kind: LedgerEventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_type_tag() {
        let event = LedgerEvent {
            sequence: 1,
            at: Timestamp::parse("2026-10-19T09:30:15Z").unwrap(),
            asset: AssetId::new(1),
            kind: LedgerEventKind::InspectionUpdated { passed: true },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "inspection_updated");
        assert_eq!(json["kind"]["passed"], true);
        assert_eq!(json["asset"], 1);
    }
}
