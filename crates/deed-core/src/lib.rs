#![deny(missing_docs)]
//! # deed-core: Foundational Types for the Deed Escrow Ledger
//!
//! Leaf crate of the workspace. Defines the value types every other crate
//! passes across its API: who is acting, which asset is at stake, how much
//! value moves, and when it happened.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for every domain primitive.** `Address`, `AssetId` and
//!    `Amount` cannot be confused with each other or with bare integers.
//!
//! 2. **Amounts never wrap.** `Amount` arithmetic is `checked_*` or
//!    `saturating_*`; there is no `Add` impl that could silently overflow.
//!    Amounts serialize as decimal strings so JSON consumers never see a
//!    float.
//!
//! 3. **The zero address is a sentinel, not an identity.** Role bindings
//!    reject it at construction.
//!
//! 4. **UTC-only timestamps** with seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `deed-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod amount;
pub mod asset;
pub mod error;
pub mod temporal;

pub use address::Address;
pub use amount::{Amount, UNIT_DECIMALS};
pub use asset::AssetId;
pub use error::CoreError;
pub use temporal::Timestamp;
