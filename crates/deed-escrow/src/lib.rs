//! # deed-escrow: Escrow Ledger for Single-Asset Sales
//!
//! Coordinates a sale between a seller, a buyer, an inspector and a lender:
//!
//! - **Listing** ([`listing`]): the per-asset escrow record and its
//!   `Listed → Finalized | Cancelled` lifecycle.
//!
//! - **Ledger** ([`ledger`]): role-gated operations (list, deposit, fund,
//!   inspect, approve, finalize, cancel) and atomic settlement through the
//!   asset registry and payment rail.
//!
//! - **Settlement** ([`settlement`]): receipts recording where the asset
//!   and every unit of the deposit went.
//!
//! - **Events** ([`event`]): append-only journal of committed changes.
//!
//! - **Config** ([`config`]): immutable role bindings, loadable from YAML.
//!
//! - **Shared** ([`shared`]): a mutex-serialized handle for multi-threaded
//!   hosts.
//!
//! ## Crate Policy
//!
//! - Depends on `deed-core` and `deed-registry` internally.
//! - No failed operation changes ledger, registry or rail state.

pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod listing;
pub mod role;
pub mod settlement;
pub mod shared;

pub use config::{ConfigError, LedgerConfig};
pub use error::{EscrowError, Operation};
pub use event::{LedgerEvent, LedgerEventKind};
pub use ledger::EscrowLedger;
pub use listing::{Listing, ListingState};
pub use role::Role;
pub use settlement::{Settlement, SettlementId, SettlementOutcome};
pub use shared::SharedLedger;
