//! # Escrow Error Types
//!
//! Every variant carries the asset and the values a caller needs to correct
//! the precondition and reissue the call. No failure is retried
//! automatically, and no failure changes ledger, registry or rail state.

use thiserror::Error;

use deed_core::{Address, Amount, AssetId};
use deed_registry::{PaymentError, RegistryError};

use crate::config::ConfigError;
use crate::role::Role;

/// A mutating ledger operation, named in authorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a listing.
    List,
    /// Buyer earnest deposit.
    DepositEarnest,
    /// Inbound funding tagged to a listing.
    Receive,
    /// Record the inspection result.
    UpdateInspection,
    /// Record an approval.
    ApproveSale,
    /// Settle the sale to the buyer.
    FinalizeSale,
    /// Unwind the sale back to the seller.
    CancelSale,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::List => "list",
            Self::DepositEarnest => "deposit_earnest",
            Self::Receive => "receive",
            Self::UpdateInspection => "update_inspection_status",
            Self::ApproveSale => "approve_sale",
            Self::FinalizeSale => "finalize_sale",
            Self::CancelSale => "cancel_sale",
        };
        f.write_str(s)
    }
}

/// Errors raised by the escrow ledger.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// Caller does not hold a role permitted to perform the operation.
    #[error("{caller} is not authorized to {operation} {asset}")]
    Unauthorized {
        /// The asset the call targeted.
        asset: AssetId,
        /// The rejected caller.
        caller: Address,
        /// The attempted operation.
        operation: Operation,
    },

    /// No active listing exists for the asset.
    #[error("{asset} is not listed")]
    NotListed {
        /// The asset.
        asset: AssetId,
    },

    /// The asset already has an active listing.
    #[error("{asset} is already listed")]
    AlreadyListed {
        /// The asset.
        asset: AssetId,
    },

    /// Earnest deposit is below the listing's escrow amount.
    #[error("deposit of {offered} for {asset} is below the escrow amount {required}")]
    InsufficientDeposit {
        /// The asset.
        asset: AssetId,
        /// The listing's escrow amount.
        required: Amount,
        /// The amount attached to the call.
        offered: Amount,
    },

    /// The inspector has not recorded a passing inspection.
    #[error("inspection of {asset} has not passed")]
    InspectionNotPassed {
        /// The asset.
        asset: AssetId,
    },

    /// One or more required approvals are missing.
    #[error("{asset} is missing approval from {}", join_roles(.missing))]
    ApprovalsIncomplete {
        /// The asset.
        asset: AssetId,
        /// Roles that have not approved, in buyer, seller, lender order.
        missing: Vec<Role>,
    },

    /// Deposited balance does not cover the purchase price.
    #[error("{asset} holds {available} but the purchase price is {required}")]
    InsufficientFunds {
        /// The asset.
        asset: AssetId,
        /// The purchase price.
        required: Amount,
        /// The deposited balance.
        available: Amount,
    },

    /// A role is bound to the zero address.
    #[error("{role} cannot be the zero address")]
    InvalidRole {
        /// The offending role.
        role: Role,
    },

    /// Purchase price is below the escrow amount.
    #[error("{asset}: purchase price {purchase_price} is below escrow amount {escrow_amount}")]
    InvalidTerms {
        /// The asset.
        asset: AssetId,
        /// Requested purchase price.
        purchase_price: Amount,
        /// Requested escrow amount.
        escrow_amount: Amount,
    },

    /// Inbound transfers must carry value.
    #[error("{operation} for {asset} carried no value")]
    ZeroAmount {
        /// The asset.
        asset: AssetId,
        /// The operation that received nothing.
        operation: Operation,
    },

    /// Crediting the amount would overflow a balance.
    #[error("crediting {amount} to {asset} overflows the ledger balance")]
    AmountOverflow {
        /// The asset.
        asset: AssetId,
        /// The amount that could not be credited.
        amount: Amount,
    },

    /// The ledger total no longer covers a listing's deposit. Raised before
    /// any settlement effect, so nothing is disbursed.
    #[error("{asset} holds {deposited} but the ledger balance is {ledger_balance}")]
    LedgerImbalance {
        /// The asset being settled.
        asset: AssetId,
        /// The listing's deposited balance.
        deposited: Amount,
        /// The ledger-wide balance.
        ledger_balance: Amount,
    },

    /// The asset registry refused a custody move.
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    /// The payment rail refused a payout.
    #[error("payment: {0}")]
    Payment(#[from] PaymentError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approvals_incomplete_lists_missing_roles() {
        let err = EscrowError::ApprovalsIncomplete {
            asset: AssetId::new(1),
            missing: vec![Role::Seller, Role::Lender],
        };
        assert_eq!(
            err.to_string(),
            "asset:1 is missing approval from seller, lender"
        );
    }

    #[test]
    fn unauthorized_names_caller_and_operation() {
        let err = EscrowError::Unauthorized {
            asset: AssetId::new(3),
            caller: Address::from_low_u64(9),
            operation: Operation::FinalizeSale,
        };
        assert_eq!(
            err.to_string(),
            "0x0000000000000000000000000000000000000009 is not authorized to finalize_sale asset:3"
        );
    }

    #[test]
    fn invalid_terms_names_asset() {
        let err = EscrowError::InvalidTerms {
            asset: AssetId::new(4),
            purchase_price: Amount::from_base_units(1),
            escrow_amount: Amount::from_base_units(2),
        };
        assert_eq!(
            err.to_string(),
            "asset:4: purchase price 1 is below escrow amount 2"
        );
    }

    #[test]
    fn payment_errors_convert() {
        let err: EscrowError = PaymentError::ZeroAddress {
            amount: Amount::from_whole(1),
        }
        .into();
        assert!(matches!(err, EscrowError::Payment(_)));
    }
}
