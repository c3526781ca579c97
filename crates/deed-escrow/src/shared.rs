//! # Serialized Ledger Handle
//!
//! [`SharedLedger`] lets many threads drive one [`EscrowLedger`]. Each
//! operation holds a single `parking_lot::Mutex` for its whole duration,
//! so operations on any listings are totally ordered and the effects of
//! one (or their rollback) are fully visible before the next begins.
//!
//! The lock is never held across a suspension point; callers on an async
//! runtime should not hold a [`SharedLedger::with`] closure open across
//! `.await`.

use std::sync::Arc;

use parking_lot::Mutex;

use deed_core::{Address, Amount, AssetId};
use deed_registry::{AssetRegistry, PaymentRail};

use crate::error::EscrowError;
use crate::ledger::EscrowLedger;
use crate::listing::Listing;
use crate::settlement::Settlement;

/// Cloneable, thread-safe handle to one ledger.
#[derive(Debug)]
pub struct SharedLedger<R, P> {
    inner: Arc<Mutex<EscrowLedger<R, P>>>,
}

impl<R, P> Clone for SharedLedger<R, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: AssetRegistry, P: PaymentRail> SharedLedger<R, P> {
    /// Wrap a ledger.
    pub fn new(ledger: EscrowLedger<R, P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// See [`EscrowLedger::list`].
    pub fn list(
        &self,
        caller: Address,
        asset: AssetId,
        buyer: Address,
        purchase_price: Amount,
        escrow_amount: Amount,
    ) -> Result<(), EscrowError> {
        self.inner
            .lock()
            .list(caller, asset, buyer, purchase_price, escrow_amount)
    }

    /// See [`EscrowLedger::deposit_earnest`].
    pub fn deposit_earnest(
        &self,
        caller: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.inner.lock().deposit_earnest(caller, asset, amount)
    }

    /// See [`EscrowLedger::receive`].
    pub fn receive(&self, caller: Address, asset: AssetId, amount: Amount) -> Result<(), EscrowError> {
        self.inner.lock().receive(caller, asset, amount)
    }

    /// See [`EscrowLedger::update_inspection_status`].
    pub fn update_inspection_status(
        &self,
        caller: Address,
        asset: AssetId,
        passed: bool,
    ) -> Result<(), EscrowError> {
        self.inner
            .lock()
            .update_inspection_status(caller, asset, passed)
    }

    /// See [`EscrowLedger::approve_sale`].
    pub fn approve_sale(&self, caller: Address, asset: AssetId) -> Result<(), EscrowError> {
        self.inner.lock().approve_sale(caller, asset)
    }

    /// See [`EscrowLedger::finalize_sale`].
    pub fn finalize_sale(&self, caller: Address, asset: AssetId) -> Result<Settlement, EscrowError> {
        self.inner.lock().finalize_sale(caller, asset)
    }

    /// See [`EscrowLedger::cancel_sale`].
    pub fn cancel_sale(&self, caller: Address, asset: AssetId) -> Result<Settlement, EscrowError> {
        self.inner.lock().cancel_sale(caller, asset)
    }

    /// See [`EscrowLedger::is_listed`].
    pub fn is_listed(&self, asset: AssetId) -> bool {
        self.inner.lock().is_listed(asset)
    }

    /// See [`EscrowLedger::balance`].
    pub fn balance(&self) -> Amount {
        self.inner.lock().balance()
    }

    /// Snapshot of the most recent listing of `asset`.
    pub fn listing(&self, asset: AssetId) -> Option<Listing> {
        self.inner.lock().listing(asset).cloned()
    }

    /// Run `f` against the ledger while holding the lock, for reads that
    /// must observe several fields at one point in the order.
    ///
    /// The lock is not reentrant. `f` must use the ledger it is given and
    /// must not call back into this handle or any clone of it, or the
    /// calling thread deadlocks.
    pub fn with<T>(&self, f: impl FnOnce(&EscrowLedger<R, P>) -> T) -> T {
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive access, for out-of-band collaborator actions
    /// such as registry approvals that must be ordered with ledger calls.
    ///
    /// Same restriction as [`with`](Self::with): `f` must not touch this
    /// handle or its clones.
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut EscrowLedger<R, P>) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
