//! # Ledger Configuration
//!
//! The fixed role bindings of one ledger instance. Seller, inspector and
//! lender are shared by every listing the ledger manages and never change
//! after construction; `address` is the ledger's own identity, the
//! custodian the registry shows as owner while a listing is active.
//!
//! ## File Format
//!
//! ```yaml
//! address: "0x00000000000000000000000000000000000000e5"
//! seller: "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
//! inspector: "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc"
//! lender: "0x90f79bf6eb2c4f870365e785982e1f101e93b906"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use deed_core::Address;

use crate::error::EscrowError;
use crate::role::Role;

/// Errors loading a [`LedgerConfig`] from YAML.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read ledger config {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The YAML could not be parsed.
    #[error("failed to parse ledger config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The ledger's own address is the zero address.
    #[error("ledger address cannot be the zero address")]
    ZeroLedgerAddress,
}

/// Immutable role bindings of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// The ledger's own identity.
    pub address: Address,
    /// Owner of every asset the ledger lists.
    pub seller: Address,
    /// Sole party allowed to record inspection results.
    pub inspector: Address,
    /// Funds the remainder of each purchase price.
    pub lender: Address,
}

impl LedgerConfig {
    /// Bind the roles. Validation happens in [`validate`](Self::validate).
    pub fn new(address: Address, seller: Address, inspector: Address, lender: Address) -> Self {
        Self {
            address,
            seller,
            inspector,
            lender,
        }
    }

    /// Reject zero-address bindings.
    pub fn validate(&self) -> Result<(), EscrowError> {
        if self.address.is_zero() {
            return Err(ConfigError::ZeroLedgerAddress.into());
        }
        for (role, who) in [
            (Role::Seller, self.seller),
            (Role::Inspector, self.inspector),
            (Role::Lender, self.lender),
        ] {
            if who.is_zero() {
                return Err(EscrowError::InvalidRole { role });
            }
        }
        Ok(())
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EscrowError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, EscrowError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), ledger = %config.address, "loaded ledger config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
address: "0x00000000000000000000000000000000000000e5"
seller: "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
inspector: "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc"
lender: "0x90f79bf6eb2c4f870365e785982e1f101e93b906"
"#;

    #[test]
    fn parses_yaml() {
        let config = LedgerConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.address, Address::from_low_u64(0xe5));
        assert_eq!(
            config.seller.to_string(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn rejects_zero_role() {
        let yaml = YAML.replace(
            "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc",
            "0x0000000000000000000000000000000000000000",
        );
        let err = LedgerConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(
            err,
            EscrowError::InvalidRole {
                role: Role::Inspector
            }
        ));
    }

    #[test]
    fn rejects_zero_ledger_address() {
        let config = LedgerConfig::new(
            Address::ZERO,
            Address::from_low_u64(1),
            Address::from_low_u64(2),
            Address::from_low_u64(3),
        );
        assert!(matches!(
            config.validate(),
            Err(EscrowError::Config(ConfigError::ZeroLedgerAddress))
        ));
    }

    #[test]
    fn rejects_unknown_fields_and_bad_addresses() {
        let extra = format!("{YAML}auditor: \"0x0000000000000000000000000000000000000009\"\n");
        assert!(LedgerConfig::from_yaml_str(&extra).is_err());
        assert!(LedgerConfig::from_yaml_str("address: nope").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.yaml");
        std::fs::write(&path, YAML).unwrap();
        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config.lender.to_string(), "0x90f79bf6eb2c4f870365e785982e1f101e93b906");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LedgerConfig::load(Path::new("/nonexistent/ledger.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ledger.yaml"));
    }
}
