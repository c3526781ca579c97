//! # In-Memory Payment Rail
//!
//! Credits outbound payments to per-recipient balances. Recipients can be
//! marked as refusing payments to exercise the ledger's rollback path.

use std::collections::{BTreeMap, BTreeSet};

use deed_core::{Address, Amount};

use crate::error::PaymentError;
use crate::traits::{PaymentRail, Revertible};

/// Rail state captured by [`Revertible::checkpoint`].
///
/// The refusal set is configuration, not payment state, and is not part
/// of the checkpoint.
#[derive(Debug, Clone)]
pub struct RailCheckpoint {
    balances: BTreeMap<Address, Amount>,
    total_paid: Amount,
}

/// In-process payment rail.
#[derive(Debug, Clone, Default)]
pub struct MemoryRail {
    balances: BTreeMap<Address, Amount>,
    refusing: BTreeSet<Address>,
    total_paid: Amount,
}

impl MemoryRail {
    /// Create a rail with no balances and no refusing recipients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total received by `who` through this rail.
    pub fn balance_of(&self, who: Address) -> Amount {
        self.balances.get(&who).copied().unwrap_or(Amount::ZERO)
    }

    /// Total paid out through this rail.
    pub fn total_paid(&self) -> Amount {
        self.total_paid
    }

    /// Make every future payment to `who` fail.
    pub fn reject_payments_to(&mut self, who: Address) {
        self.refusing.insert(who);
    }

    /// Undo [`reject_payments_to`](Self::reject_payments_to).
    pub fn accept_payments_to(&mut self, who: Address) {
        self.refusing.remove(&who);
    }
}

impl Revertible for MemoryRail {
    type Checkpoint = RailCheckpoint;

    fn checkpoint(&self) -> Self::Checkpoint {
        RailCheckpoint {
            balances: self.balances.clone(),
            total_paid: self.total_paid,
        }
    }

    fn revert(&mut self, checkpoint: Self::Checkpoint) {
        self.balances = checkpoint.balances;
        self.total_paid = checkpoint.total_paid;
    }
}

impl PaymentRail for MemoryRail {
    fn pay(&mut self, to: Address, amount: Amount) -> Result<(), PaymentError> {
        if to.is_zero() {
            return Err(PaymentError::ZeroAddress { amount });
        }
        if self.refusing.contains(&to) {
            return Err(PaymentError::RecipientRejected { to, amount });
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(PaymentError::Overflow { to, amount })?;
        let total = self
            .total_paid
            .checked_add(amount)
            .ok_or(PaymentError::Overflow { to, amount })?;
        self.balances.insert(to, credited);
        self.total_paid = total;
        tracing::debug!(to = %to, amount = %amount, "payment credited");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn pay_credits_recipient() {
        let mut rail = MemoryRail::new();
        rail.pay(addr(1), Amount::from_whole(3)).unwrap();
        rail.pay(addr(1), Amount::from_whole(2)).unwrap();
        rail.pay(addr(2), Amount::from_whole(1)).unwrap();
        assert_eq!(rail.balance_of(addr(1)), Amount::from_whole(5));
        assert_eq!(rail.balance_of(addr(2)), Amount::from_whole(1));
        assert_eq!(rail.total_paid(), Amount::from_whole(6));
    }

    #[test]
    fn refusing_recipient_rejects_and_nothing_is_credited() {
        let mut rail = MemoryRail::new();
        rail.reject_payments_to(addr(1));
        let err = rail.pay(addr(1), Amount::from_whole(1)).unwrap_err();
        assert!(matches!(err, PaymentError::RecipientRejected { .. }));
        assert_eq!(rail.balance_of(addr(1)), Amount::ZERO);
        assert_eq!(rail.total_paid(), Amount::ZERO);

        rail.accept_payments_to(addr(1));
        rail.pay(addr(1), Amount::from_whole(1)).unwrap();
        assert_eq!(rail.balance_of(addr(1)), Amount::from_whole(1));
    }

    #[test]
    fn zero_address_rejected() {
        let mut rail = MemoryRail::new();
        assert!(matches!(
            rail.pay(Address::ZERO, Amount::from_whole(1)),
            Err(PaymentError::ZeroAddress { .. })
        ));
    }

    #[test]
    fn overflow_rejected_without_partial_credit() {
        let mut rail = MemoryRail::new();
        rail.pay(addr(1), Amount::from_base_units(u128::MAX)).unwrap();
        assert!(matches!(
            rail.pay(addr(2), Amount::from_base_units(1)),
            Err(PaymentError::Overflow { .. })
        ));
        assert_eq!(rail.balance_of(addr(2)), Amount::ZERO);
    }

    #[test]
    fn revert_restores_balances_but_keeps_refusals() {
        let mut rail = MemoryRail::new();
        rail.pay(addr(1), Amount::from_whole(1)).unwrap();
        let cp = rail.checkpoint();
        rail.pay(addr(1), Amount::from_whole(4)).unwrap();
        rail.reject_payments_to(addr(2));
        rail.revert(cp);

        assert_eq!(rail.balance_of(addr(1)), Amount::from_whole(1));
        assert_eq!(rail.total_paid(), Amount::from_whole(1));
        assert!(rail.pay(addr(2), Amount::from_whole(1)).is_err());
    }
}
