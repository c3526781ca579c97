//! # deed-registry: Collaborator Contracts
//!
//! The escrow ledger does not own asset titles or move money itself. It
//! talks to two collaborators through the traits in [`traits`]:
//!
//! - **Asset registry** ([`AssetRegistry`]): tracks who owns each unique
//!   asset and lets an owner-approved operator move it.
//!
//! - **Payment rail** ([`PaymentRail`]): pushes value out of the ledger to a
//!   recipient, who may refuse it.
//!
//! Both extend [`Revertible`] so a multi-step settlement can be rolled
//! back as a unit.
//!
//! In-memory implementations ([`MemoryRegistry`], [`MemoryRail`]) back the
//! test suites and any embedder that keeps titles and balances in process.

pub mod error;
pub mod rail;
pub mod registry;
pub mod traits;

pub use error::{PaymentError, RegistryError};
pub use rail::MemoryRail;
pub use registry::{MemoryRegistry, TokenRecord};
pub use traits::{AssetRegistry, PaymentRail, Revertible};
