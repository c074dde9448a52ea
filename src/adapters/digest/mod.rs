//! Contract Digest - Deployed Addresses and ABIs
//!
//! The digest is a JSON object mapping a logical contract name to either
//! one `{name, address, abi}` record or an array of them when a contract
//! is deployed several times (pools, agents, mock miners).

pub mod broadcast;

use std::collections::BTreeMap;
use std::path::Path;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::StakerError;

pub use broadcast::{generate_digest, locate_latest_run, write_digest};

/// Contracts deployed more than once are stored as arrays.
pub const MULTI_INSTANCE: [&str; 3] = ["MockMiner", "Agent", "SimpleInterestPool"];

/// One deployed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub name: String,
    pub address: Address,
    /// Raw compiler ABI, kept for consumers that need it.
    #[serde(default)]
    pub abi: serde_json::Value,
}

/// Digest value: a single deployment or every instance of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DigestEntry {
    Single(ContractInfo),
    Many(Vec<ContractInfo>),
}

impl DigestEntry {
    /// First instance; single entries are their own first instance.
    pub fn first(&self) -> Option<&ContractInfo> {
        match self {
            Self::Single(info) => Some(info),
            Self::Many(all) => all.first(),
        }
    }

    pub fn all(&self) -> &[ContractInfo] {
        match self {
            Self::Single(info) => std::slice::from_ref(info),
            Self::Many(all) => all,
        }
    }
}

/// Name to deployment map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractDigest {
    entries: BTreeMap<String, DigestEntry>,
}

impl ContractDigest {
    /// Read and parse the digest file.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, StakerError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StakerError::Digest(format!("cannot read {}: {e}", path.display())))?;
        let digest = Self::from_json(&raw)?;
        info!(contracts = digest.entries.len(), "Contract digest loaded");
        Ok(digest)
    }

    pub fn from_json(raw: &str) -> Result<Self, StakerError> {
        serde_json::from_str(raw).map_err(|e| StakerError::Digest(format!("malformed digest: {e}")))
    }

    /// Add a deployment, grouping multi-instance contracts.
    pub fn insert(&mut self, info: ContractInfo) {
        if MULTI_INSTANCE.contains(&info.name.as_str()) {
            match self.entries.get_mut(&info.name) {
                Some(DigestEntry::Many(all)) => all.push(info),
                _ => {
                    self.entries.insert(info.name.clone(), DigestEntry::Many(vec![info]));
                }
            }
        } else {
            self.entries.insert(info.name.clone(), DigestEntry::Single(info));
        }
    }

    pub fn contract(&self, name: &str) -> Option<&DigestEntry> {
        self.entries.get(name)
    }

    /// Every instance of `name`; empty when absent.
    pub fn instances(&self, name: &str) -> &[ContractInfo] {
        self.entries.get(name).map_or(&[][..], DigestEntry::all)
    }

    /// Address of the first instance of `name`.
    pub fn address_of(&self, name: &str) -> Result<Address, StakerError> {
        self.entries
            .get(name)
            .and_then(DigestEntry::first)
            .map(|info| info.address)
            .ok_or_else(|| StakerError::Digest(format!("missing contract {name}")))
    }

    /// Loan agent used by borrow/repay: `LoanAgent[0]`, else `Agent[0]`.
    pub fn loan_agent(&self) -> Result<Address, StakerError> {
        self.address_of("LoanAgent").or_else(|_| self.address_of("Agent"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = r#"{
        "PoolFactory": {"name": "PoolFactory", "address": "0x00000000000000000000000000000000000000f1", "abi": []},
        "WFIL": {"name": "WFIL", "address": "0x00000000000000000000000000000000000000a1", "abi": []},
        "SimpleInterestPool": [
            {"name": "SimpleInterestPool", "address": "0x0000000000000000000000000000000000000101", "abi": []},
            {"name": "SimpleInterestPool", "address": "0x0000000000000000000000000000000000000102", "abi": []}
        ],
        "Agent": [{"name": "Agent", "address": "0x00000000000000000000000000000000000000c1", "abi": []}]
    }"#;

    #[test]
    fn test_parses_single_and_array_entries() {
        let digest = ContractDigest::from_json(DIGEST).unwrap();
        assert_eq!(digest.len(), 4);
        assert!(matches!(digest.contract("WFIL"), Some(DigestEntry::Single(_))));
        assert_eq!(digest.instances("SimpleInterestPool").len(), 2);
        assert!(digest.instances("MockMiner").is_empty());
    }

    #[test]
    fn test_address_lookup() {
        let digest = ContractDigest::from_json(DIGEST).unwrap();
        let pool = digest.address_of("SimpleInterestPool").unwrap();
        assert_eq!(pool, "0x0000000000000000000000000000000000000101".parse::<Address>().unwrap());
        assert!(matches!(digest.address_of("Stats"), Err(StakerError::Digest(_))));
    }

    #[test]
    fn test_loan_agent_falls_back_to_agent() {
        let digest = ContractDigest::from_json(DIGEST).unwrap();
        let agent = digest.loan_agent().unwrap();
        assert_eq!(agent, "0x00000000000000000000000000000000000000c1".parse::<Address>().unwrap());
    }

    #[test]
    fn test_insert_groups_multi_instance_contracts() {
        let mut digest = ContractDigest::default();
        for name in ["SimpleInterestPool", "SimpleInterestPool", "WFIL", "WFIL"] {
            digest.insert(ContractInfo {
                name: name.into(),
                address: Address::ZERO,
                abi: serde_json::Value::Null,
            });
        }
        assert_eq!(digest.instances("SimpleInterestPool").len(), 2);
        assert!(matches!(digest.contract("WFIL"), Some(DigestEntry::Single(_))));
    }

    #[test]
    fn test_malformed_digest_is_digest_error() {
        assert!(matches!(ContractDigest::from_json("[1, 2]"), Err(StakerError::Digest(_))));
    }
}
