//! # Listing Lifecycle
//!
//! One escrow record per asset under management.
//!
//! ## States
//!
//! ```text
//! (unlisted) ──list()──▶ Listed ──finalize_sale()──▶ Finalized (terminal)
//!                           │
//!                           └────cancel_sale()────▶ Cancelled (terminal)
//! ```
//!
//! `Listed` carries the sub-state that gates finalization: deposited
//! balance, inspection result and approval set. There is no partial
//! finalize; the four conditions are checked together.
//!
//! ## Invariants
//!
//! - A terminal listing accepts no deposit, funding, inspection update or
//!   approval. Every such call fails with `NotListed`.
//! - `deposited_balance` only grows while listed and is zero once the
//!   listing is terminal (everything it held has been disbursed).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use deed_core::{Address, Amount, AssetId, Timestamp};

use crate::error::EscrowError;
use crate::role::Role;

// ─── Listing State ───────────────────────────────────────────────────

/// Lifecycle state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingState {
    /// Asset is in ledger custody; the sale is in progress.
    Listed,
    /// Asset delivered to the buyer, seller paid (terminal).
    Finalized,
    /// Asset returned to the seller, deposit refunded or forfeited (terminal).
    Cancelled,
}

impl ListingState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }
}

impl std::fmt::Display for ListingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Listed => "LISTED",
            Self::Finalized => "FINALIZED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

// ─── Listing ─────────────────────────────────────────────────────────

/// The escrow record for one asset sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// The asset being sold.
    pub asset: AssetId,
    /// The single buyer for this listing.
    pub buyer: Address,
    /// Amount the seller receives at finalization.
    pub purchase_price: Amount,
    /// Minimum earnest deposit.
    pub escrow_amount: Amount,
    /// Current lifecycle state.
    pub state: ListingState,
    /// Value held for this listing: buyer deposits plus lender funding.
    pub deposited_balance: Amount,
    /// Last inspection result recorded by the inspector.
    pub inspection_passed: bool,
    /// Parties that have approved the sale.
    pub approvals: BTreeSet<Address>,
    /// When the listing was created.
    pub listed_at: Timestamp,
    /// When the listing reached a terminal state.
    pub closed_at: Option<Timestamp>,
}

impl Listing {
    /// A fresh listing: no deposit, inspection not passed, no approvals.
    pub fn new(
        asset: AssetId,
        buyer: Address,
        purchase_price: Amount,
        escrow_amount: Amount,
    ) -> Result<Self, EscrowError> {
        if buyer.is_zero() {
            return Err(EscrowError::InvalidRole { role: Role::Buyer });
        }
        if purchase_price < escrow_amount {
            return Err(EscrowError::InvalidTerms {
                asset,
                purchase_price,
                escrow_amount,
            });
        }
        Ok(Self {
            asset,
            buyer,
            purchase_price,
            escrow_amount,
            state: ListingState::Listed,
            deposited_balance: Amount::ZERO,
            inspection_passed: false,
            approvals: BTreeSet::new(),
            listed_at: Timestamp::now(),
            closed_at: None,
        })
    }

    /// Whether the listing is active.
    pub fn is_listed(&self) -> bool {
        self.state == ListingState::Listed
    }

    /// Whether `who` has approved.
    pub fn has_approved(&self, who: Address) -> bool {
        self.approvals.contains(&who)
    }

    /// Approvers from `{buyer, seller, lender}` that have not yet approved,
    /// in that order.
    pub fn missing_approvals(&self, seller: Address, lender: Address) -> Vec<Role> {
        [
            (Role::Buyer, self.buyer),
            (Role::Seller, seller),
            (Role::Lender, lender),
        ]
        .into_iter()
        .filter(|(_, who)| !self.has_approved(*who))
        .map(|(role, _)| role)
        .collect()
    }

    /// Fail with `NotListed` unless the listing is active.
    pub(crate) fn require_listed(&self) -> Result<(), EscrowError> {
        if self.is_listed() {
            Ok(())
        } else {
            Err(EscrowError::NotListed { asset: self.asset })
        }
    }

    /// Balance after crediting `amount`, without mutating.
    pub(crate) fn credited(&self, amount: Amount) -> Result<Amount, EscrowError> {
        self.deposited_balance
            .checked_add(amount)
            .ok_or(EscrowError::AmountOverflow {
                asset: self.asset,
                amount,
            })
    }

    /// Move to a terminal state, zeroing the disbursed balance.
    pub(crate) fn close(&mut self, to: ListingState) {
        self.state = to;
        self.deposited_balance = Amount::ZERO;
        self.closed_at = Some(Timestamp::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn listing() -> Listing {
        Listing::new(
            AssetId::new(1),
            addr(1),
            Amount::from_whole(10),
            Amount::from_whole(5),
        )
        .unwrap()
    }

    #[test]
    fn new_listing_defaults() {
        let l = listing();
        assert!(l.is_listed());
        assert_eq!(l.deposited_balance, Amount::ZERO);
        assert!(!l.inspection_passed);
        assert!(l.approvals.is_empty());
        assert!(l.closed_at.is_none());
    }

    #[test]
    fn price_below_escrow_rejected() {
        let err = Listing::new(
            AssetId::new(1),
            addr(1),
            Amount::from_whole(4),
            Amount::from_whole(5),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EscrowError::InvalidTerms { asset, .. } if asset == AssetId::new(1)
        ));
    }

    #[test]
    fn price_equal_to_escrow_allowed() {
        assert!(Listing::new(
            AssetId::new(1),
            addr(1),
            Amount::from_whole(5),
            Amount::from_whole(5),
        )
        .is_ok());
    }

    #[test]
    fn zero_buyer_rejected() {
        let err = Listing::new(
            AssetId::new(1),
            Address::ZERO,
            Amount::from_whole(10),
            Amount::from_whole(5),
        )
        .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidRole { role: Role::Buyer }));
    }

    #[test]
    fn missing_approvals_in_fixed_order() {
        let mut l = listing();
        let (seller, lender) = (addr(2), addr(3));
        assert_eq!(
            l.missing_approvals(seller, lender),
            vec![Role::Buyer, Role::Seller, Role::Lender]
        );
        l.approvals.insert(seller);
        assert_eq!(l.missing_approvals(seller, lender), vec![Role::Buyer, Role::Lender]);
        l.approvals.insert(addr(1));
        l.approvals.insert(lender);
        assert!(l.missing_approvals(seller, lender).is_empty());
    }

    #[test]
    fn close_is_terminal_and_zeroes_balance() {
        let mut l = listing();
        l.deposited_balance = Amount::from_whole(5);
        l.close(ListingState::Cancelled);
        assert!(l.state.is_terminal());
        assert!(!l.is_listed());
        assert_eq!(l.deposited_balance, Amount::ZERO);
        assert!(l.closed_at.is_some());
        assert!(matches!(l.require_listed(), Err(EscrowError::NotListed { .. })));
    }

    #[test]
    fn credited_detects_overflow() {
        let mut l = listing();
        l.deposited_balance = Amount::from_base_units(u128::MAX);
        assert!(matches!(
            l.credited(Amount::from_base_units(1)),
            Err(EscrowError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn state_display() {
        assert_eq!(ListingState::Listed.to_string(), "LISTED");
        assert_eq!(ListingState::Finalized.to_string(), "FINALIZED");
        assert_eq!(ListingState::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn listing_serialization() {
        let l = listing();
        let json = serde_json::to_string(&l).unwrap();
        let parsed: Listing = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, l);
    }
}
