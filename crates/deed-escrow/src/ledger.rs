//! # Escrow Ledger
//!
//! Holds buyer and lender funds per listing, tracks inspection and
//! approvals, and settles each sale atomically through the asset registry
//! and payment rail.
//!
//! ## Authorization
//!
//! Every mutating operation takes the caller explicitly and compares it
//! against stored role bindings:
//!
//! | Operation | Permitted callers |
//! |---|---|
//! | `list` | seller |
//! | `deposit_earnest` | the listing's buyer |
//! | `receive` | the listing's buyer, lender |
//! | `update_inspection_status` | inspector |
//! | `approve_sale` | the listing's buyer, seller, lender |
//! | `finalize_sale` | seller |
//! | `cancel_sale` | seller, the listing's buyer |
//!
//! Fixed roles are checked before the listing is looked up. Where the
//! permitted set includes the listing's buyer, the listing must be active
//! first, so any call against a terminal listing fails with `NotListed`.
//!
//! ## Atomicity
//!
//! Validation happens before any effect. Settlement effects (asset move and
//! payouts) run against checkpoints of both collaborators and are reverted
//! together on the first failure. Ledger fields are written only after
//! every effect has succeeded.
//!
//! ## Conservation
//!
//! `balance()` always equals the sum of `deposited_balance` over active
//! listings.

use std::collections::BTreeMap;

use deed_core::{Address, Amount, AssetId, Timestamp};
use deed_registry::{AssetRegistry, PaymentRail};

use crate::config::LedgerConfig;
use crate::error::{EscrowError, Operation};
use crate::event::{LedgerEvent, LedgerEventKind};
use crate::listing::{Listing, ListingState};
use crate::settlement::{Settlement, SettlementId, SettlementOutcome};

/// The escrow ledger for one seller, inspector and lender.
#[derive(Debug)]
pub struct EscrowLedger<R, P> {
    config: LedgerConfig,
    registry: R,
    rail: P,
    listings: BTreeMap<AssetId, Listing>,
    balance: Amount,
    events: Vec<LedgerEvent>,
}

impl<R: AssetRegistry, P: PaymentRail> EscrowLedger<R, P> {
    /// Bind the roles and collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidRole`] if any role is the zero address.
    pub fn new(registry: R, rail: P, config: LedgerConfig) -> Result<Self, EscrowError> {
        config.validate()?;
        tracing::info!(
            ledger = %config.address,
            registry = %registry.address(),
            seller = %config.seller,
            inspector = %config.inspector,
            lender = %config.lender,
            "escrow ledger constructed"
        );
        Ok(Self {
            config,
            registry,
            rail,
            listings: BTreeMap::new(),
            balance: Amount::ZERO,
            events: Vec::new(),
        })
    }

    // ─── Mutating operations ─────────────────────────────────────────

    /// Take custody of `asset` and offer it to `buyer`.
    ///
    /// The seller must own `asset` and have approved the ledger as its
    /// operator beforehand.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless the caller is the seller; `AlreadyListed` if
    /// the asset has an active listing; `InvalidRole` for a zero buyer;
    /// `InvalidTerms` if `purchase_price < escrow_amount`; `Registry` if
    /// custody cannot be taken, including when the seller does not own the
    /// asset.
    pub fn list(
        &mut self,
        caller: Address,
        asset: AssetId,
        buyer: Address,
        purchase_price: Amount,
        escrow_amount: Amount,
    ) -> Result<(), EscrowError> {
        self.require_caller(asset, caller, &[self.config.seller], Operation::List)?;
        if self.listings.get(&asset).is_some_and(Listing::is_listed) {
            return Err(EscrowError::AlreadyListed { asset });
        }
        let listing = Listing::new(asset, buyer, purchase_price, escrow_amount)?;

        self.registry
            .transfer(self.config.address, asset, self.config.seller, self.config.address)?;

        self.listings.insert(asset, listing);
        self.record(
            asset,
            LedgerEventKind::Listed {
                buyer,
                purchase_price,
                escrow_amount,
            },
        );
        tracing::info!(
            asset = %asset,
            buyer = %buyer,
            purchase_price = %purchase_price,
            escrow_amount = %escrow_amount,
            "asset listed"
        );
        Ok(())
    }

    /// Credit the buyer's earnest deposit.
    ///
    /// # Errors
    ///
    /// `NotListed`, `Unauthorized` unless the caller is the listing's buyer,
    /// `InsufficientDeposit` if `amount` is below the escrow amount.
    pub fn deposit_earnest(
        &mut self,
        caller: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        let listing = self.active_listing(asset)?;
        self.require_caller(asset, caller, &[listing.buyer], Operation::DepositEarnest)?;
        if amount < listing.escrow_amount {
            return Err(EscrowError::InsufficientDeposit {
                asset,
                required: listing.escrow_amount,
                offered: amount,
            });
        }
        self.credit(asset, amount)?;
        self.record(asset, LedgerEventKind::EarnestDeposited { amount });
        tracing::debug!(asset = %asset, amount = %amount, "earnest deposited");
        Ok(())
    }

    /// Credit inbound value tagged to `asset`, typically the lender's share
    /// of the purchase price.
    ///
    /// # Errors
    ///
    /// `NotListed`, `Unauthorized` unless the caller is the listing's buyer
    /// or the lender, `ZeroAmount` for an empty transfer.
    pub fn receive(
        &mut self,
        caller: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        let listing = self.active_listing(asset)?;
        self.require_caller(
            asset,
            caller,
            &[listing.buyer, self.config.lender],
            Operation::Receive,
        )?;
        if amount.is_zero() {
            return Err(EscrowError::ZeroAmount {
                asset,
                operation: Operation::Receive,
            });
        }
        self.credit(asset, amount)?;
        self.record(
            asset,
            LedgerEventKind::FundsReceived {
                from: caller,
                amount,
            },
        );
        tracing::debug!(asset = %asset, from = %caller, amount = %amount, "funds received");
        Ok(())
    }

    /// Record the inspection result. Last write wins.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless the caller is the inspector, `NotListed`.
    pub fn update_inspection_status(
        &mut self,
        caller: Address,
        asset: AssetId,
        passed: bool,
    ) -> Result<(), EscrowError> {
        self.require_caller(
            asset,
            caller,
            &[self.config.inspector],
            Operation::UpdateInspection,
        )?;
        self.active_listing(asset)?;
        if let Some(listing) = self.listings.get_mut(&asset) {
            listing.inspection_passed = passed;
        }
        self.record(asset, LedgerEventKind::InspectionUpdated { passed });
        tracing::debug!(asset = %asset, passed, "inspection updated");
        Ok(())
    }

    /// Record the caller's approval. Approving twice is a no-op.
    ///
    /// # Errors
    ///
    /// `NotListed`, `Unauthorized` unless the caller is the listing's buyer,
    /// the seller or the lender.
    pub fn approve_sale(&mut self, caller: Address, asset: AssetId) -> Result<(), EscrowError> {
        let listing = self.active_listing(asset)?;
        self.require_caller(
            asset,
            caller,
            &[listing.buyer, self.config.seller, self.config.lender],
            Operation::ApproveSale,
        )?;
        let newly_approved = match self.listings.get_mut(&asset) {
            Some(listing) => listing.approvals.insert(caller),
            None => false,
        };
        if newly_approved {
            self.record(asset, LedgerEventKind::SaleApproved { by: caller });
            tracing::debug!(asset = %asset, by = %caller, "sale approved");
        }
        Ok(())
    }

    /// Deliver the asset to the buyer, pay the purchase price to the seller
    /// and refund any excess deposit to the buyer.
    ///
    /// # Errors
    ///
    /// Checked in order: `Unauthorized` unless the caller is the seller,
    /// `NotListed`, `InspectionNotPassed`, `ApprovalsIncomplete`,
    /// `InsufficientFunds`, `LedgerImbalance`. `Registry` or `Payment` if a
    /// collaborator refuses an effect, in which case every effect is rolled
    /// back.
    pub fn finalize_sale(
        &mut self,
        caller: Address,
        asset: AssetId,
    ) -> Result<Settlement, EscrowError> {
        self.require_caller(asset, caller, &[self.config.seller], Operation::FinalizeSale)?;
        let listing = self.active_listing(asset)?;
        if !listing.inspection_passed {
            return Err(EscrowError::InspectionNotPassed { asset });
        }
        let missing = listing.missing_approvals(self.config.seller, self.config.lender);
        if !missing.is_empty() {
            return Err(EscrowError::ApprovalsIncomplete { asset, missing });
        }
        let deposited = listing.deposited_balance;
        let Some(buyer_refund) = deposited.checked_sub(listing.purchase_price) else {
            return Err(EscrowError::InsufficientFunds {
                asset,
                required: listing.purchase_price,
                available: deposited,
            });
        };
        let buyer = listing.buyer;
        let seller_payout = listing.purchase_price;
        let remaining = self.debited(asset, deposited)?;

        self.settle(
            asset,
            buyer,
            [(self.config.seller, seller_payout), (buyer, buyer_refund)],
        )?;

        let settlement = self.close(
            ListingState::Finalized,
            remaining,
            Settlement {
                id: SettlementId::new(),
                asset,
                outcome: SettlementOutcome::Finalized,
                asset_recipient: buyer,
                seller_payout,
                buyer_refund,
                settled_at: Timestamp::now(),
            },
        );
        tracing::info!(
            asset = %asset,
            buyer = %buyer,
            seller_payout = %seller_payout,
            buyer_refund = %buyer_refund,
            "sale finalized"
        );
        Ok(settlement)
    }

    /// Return the asset to the seller and disburse the deposit: refunded to
    /// the buyer if inspection has not passed, forfeited to the seller if it
    /// has.
    ///
    /// # Errors
    ///
    /// `NotListed`, `Unauthorized` unless the caller is the seller or the
    /// listing's buyer. `Registry` or `Payment` if a collaborator refuses an
    /// effect, in which case every effect is rolled back.
    pub fn cancel_sale(
        &mut self,
        caller: Address,
        asset: AssetId,
    ) -> Result<Settlement, EscrowError> {
        let listing = self.active_listing(asset)?;
        self.require_caller(
            asset,
            caller,
            &[self.config.seller, listing.buyer],
            Operation::CancelSale,
        )?;
        let deposited = listing.deposited_balance;
        let buyer = listing.buyer;
        let seller = self.config.seller;
        let (outcome, seller_payout, buyer_refund) = if listing.inspection_passed {
            (SettlementOutcome::CancelledForfeited, deposited, Amount::ZERO)
        } else {
            (SettlementOutcome::CancelledRefunded, Amount::ZERO, deposited)
        };

        let remaining = self.debited(asset, deposited)?;

        self.settle(asset, seller, [(seller, seller_payout), (buyer, buyer_refund)])?;

        let settlement = self.close(
            ListingState::Cancelled,
            remaining,
            Settlement {
                id: SettlementId::new(),
                asset,
                outcome,
                asset_recipient: seller,
                seller_payout,
                buyer_refund,
                settled_at: Timestamp::now(),
            },
        );
        tracing::info!(
            asset = %asset,
            cancelled_by = %caller,
            outcome = %outcome,
            seller_payout = %seller_payout,
            buyer_refund = %buyer_refund,
            "sale cancelled"
        );
        Ok(settlement)
    }

    // ─── Accessors ───────────────────────────────────────────────────

    /// Whether `asset` has an active listing.
    pub fn is_listed(&self, asset: AssetId) -> bool {
        self.listings.get(&asset).is_some_and(Listing::is_listed)
    }

    /// Buyer of the most recent listing of `asset`, or the zero address.
    pub fn buyer(&self, asset: AssetId) -> Address {
        self.listings.get(&asset).map_or(Address::ZERO, |l| l.buyer)
    }

    /// Purchase price of the most recent listing of `asset`, or zero.
    pub fn purchase_price(&self, asset: AssetId) -> Amount {
        self.listings
            .get(&asset)
            .map_or(Amount::ZERO, |l| l.purchase_price)
    }

    /// Escrow amount of the most recent listing of `asset`, or zero.
    pub fn escrow_amount(&self, asset: AssetId) -> Amount {
        self.listings
            .get(&asset)
            .map_or(Amount::ZERO, |l| l.escrow_amount)
    }

    /// Last recorded inspection result, or `false`.
    pub fn inspection_passed(&self, asset: AssetId) -> bool {
        self.listings
            .get(&asset)
            .is_some_and(|l| l.inspection_passed)
    }

    /// Whether `who` has approved the sale of `asset`.
    pub fn approval(&self, asset: AssetId, who: Address) -> bool {
        self.listings
            .get(&asset)
            .is_some_and(|l| l.has_approved(who))
    }

    /// Value currently held for `asset`.
    pub fn deposited_balance(&self, asset: AssetId) -> Amount {
        self.listings
            .get(&asset)
            .map_or(Amount::ZERO, |l| l.deposited_balance)
    }

    /// Total value held by the ledger across all listings.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// The full record of the most recent listing of `asset`.
    pub fn listing(&self, asset: AssetId) -> Option<&Listing> {
        self.listings.get(&asset)
    }

    /// Every listing record, active and terminal, in asset order.
    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    /// The committed event journal.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// The role bindings.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The ledger's own address.
    pub fn address(&self) -> Address {
        self.config.address
    }

    /// The bound seller.
    pub fn seller(&self) -> Address {
        self.config.seller
    }

    /// The bound inspector.
    pub fn inspector(&self) -> Address {
        self.config.inspector
    }

    /// The bound lender.
    pub fn lender(&self) -> Address {
        self.config.lender
    }

    /// Address of the asset registry.
    pub fn registry_address(&self) -> Address {
        self.registry.address()
    }

    /// The asset registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Mutable access to the asset registry, for out-of-band actions such
    /// as the seller approving the ledger before `list`.
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// The payment rail.
    pub fn rail(&self) -> &P {
        &self.rail
    }

    /// Mutable access to the payment rail.
    pub fn rail_mut(&mut self) -> &mut P {
        &mut self.rail
    }

    /// Tear down the ledger and hand back its collaborators.
    pub fn into_parts(self) -> (R, P) {
        (self.registry, self.rail)
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn require_caller(
        &self,
        asset: AssetId,
        caller: Address,
        permitted: &[Address],
        operation: Operation,
    ) -> Result<(), EscrowError> {
        if permitted.contains(&caller) {
            Ok(())
        } else {
            Err(EscrowError::Unauthorized {
                asset,
                caller,
                operation,
            })
        }
    }

    fn active_listing(&self, asset: AssetId) -> Result<&Listing, EscrowError> {
        let listing = self
            .listings
            .get(&asset)
            .ok_or(EscrowError::NotListed { asset })?;
        listing.require_listed()?;
        Ok(listing)
    }

    /// Credit `amount` to the listing and the ledger total, or neither.
    fn credit(&mut self, asset: AssetId, amount: Amount) -> Result<(), EscrowError> {
        let listing_balance = self.active_listing(asset)?.credited(amount)?;
        let ledger_balance = self
            .balance
            .checked_add(amount)
            .ok_or(EscrowError::AmountOverflow { asset, amount })?;
        if let Some(listing) = self.listings.get_mut(&asset) {
            listing.deposited_balance = listing_balance;
        }
        self.balance = ledger_balance;
        Ok(())
    }

    /// Move the asset out of custody and make the payouts, all or nothing.
    /// Zero payouts are skipped.
    fn settle(
        &mut self,
        asset: AssetId,
        asset_recipient: Address,
        payouts: [(Address, Amount); 2],
    ) -> Result<(), EscrowError> {
        let registry_checkpoint = self.registry.checkpoint();
        let rail_checkpoint = self.rail.checkpoint();

        let result = self.apply_settlement(asset, asset_recipient, &payouts);
        if let Err(err) = &result {
            self.registry.revert(registry_checkpoint);
            self.rail.revert(rail_checkpoint);
            tracing::warn!(asset = %asset, error = %err, "settlement rolled back");
        }
        result
    }

    fn apply_settlement(
        &mut self,
        asset: AssetId,
        asset_recipient: Address,
        payouts: &[(Address, Amount)],
    ) -> Result<(), EscrowError> {
        let custodian = self.config.address;
        self.registry
            .transfer(custodian, asset, custodian, asset_recipient)?;
        for &(to, amount) in payouts {
            if !amount.is_zero() {
                self.rail.pay(to, amount)?;
            }
        }
        Ok(())
    }

    /// Ledger balance after disbursing `deposited`, computed before any
    /// settlement effect.
    fn debited(&self, asset: AssetId, deposited: Amount) -> Result<Amount, EscrowError> {
        self.balance
            .checked_sub(deposited)
            .ok_or(EscrowError::LedgerImbalance {
                asset,
                deposited,
                ledger_balance: self.balance,
            })
    }

    /// Commit a terminal transition after a successful settlement.
    fn close(
        &mut self,
        state: ListingState,
        remaining: Amount,
        settlement: Settlement,
    ) -> Settlement {
        let asset = settlement.asset;
        self.balance = remaining;
        if let Some(listing) = self.listings.get_mut(&asset) {
            listing.close(state);
        }
        let kind = if settlement.outcome.is_sale() {
            LedgerEventKind::SaleFinalized {
                settlement: settlement.clone(),
            }
        } else {
            LedgerEventKind::SaleCancelled {
                settlement: settlement.clone(),
            }
        };
        self.record(asset, kind);
        settlement
    }

    fn record(&mut self, asset: AssetId, kind: LedgerEventKind) {
        self.events.push(LedgerEvent {
            sequence: self.events.len() as u64 + 1,
            at: Timestamp::now(),
            asset,
            kind,
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
