//! Digest generation from a deployment broadcast log.
//!
//! Reads `broadcast/<script>/<chain>/run-latest.json`, keeps contract
//! creations plus the agents and pools created through factory calls,
//! attaches each contract's ABI from `out/<Name>.sol/<Name>.json`, and
//! writes the grouped digest.

use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::{ContractDigest, ContractInfo};
use crate::error::StakerError;

#[derive(Debug, Deserialize)]
struct LatestRun {
    transactions: Vec<BroadcastTx>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastTx {
    transaction_type: String,
    contract_name: Option<String>,
    contract_address: Option<Address>,
    function: Option<String>,
    #[serde(default)]
    additional_contracts: Vec<AdditionalContract>,
}

#[derive(Debug, Deserialize)]
struct AdditionalContract {
    address: Address,
}

#[derive(Debug, Deserialize)]
struct CompiledContract {
    abi: serde_json::Value,
}

/// Factory calls whose first additional contract is a new deployment:
/// (factory contract, function prefix, deployed contract name).
const FACTORY_CREATES: [(&str, &str, &str); 2] = [
    ("AgentFactory", "create(", "Agent"),
    ("PoolRegistry", "createSimpleInterestPool(", "SimpleInterestPool"),
];

/// `run-latest.json` of the first chain directory under `script_dir`.
pub fn locate_latest_run(script_dir: &Path) -> Result<PathBuf, StakerError> {
    let mut chains: Vec<PathBuf> = std::fs::read_dir(script_dir)
        .map_err(|e| StakerError::Digest(format!("cannot list {}: {e}", script_dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    chains.sort();

    chains
        .first()
        .map(|dir| dir.join("run-latest.json"))
        .ok_or_else(|| StakerError::Digest(format!("no broadcast runs under {}", script_dir.display())))
}

/// Deployments named by a broadcast log, in log order.
fn deployments(run: &LatestRun) -> Vec<(String, Address)> {
    let creates = run.transactions.iter().filter_map(|tx| {
        if tx.transaction_type != "CREATE" || tx.function.is_some() {
            return None;
        }
        Some((tx.contract_name.clone()?, tx.contract_address?))
    });

    let factory_creates = FACTORY_CREATES.iter().flat_map(|&(factory, prefix, deployed)| {
        run.transactions.iter().filter_map(move |tx| {
            let invoked = tx.function.as_deref()?;
            let matches = tx.transaction_type == "CREATE"
                && tx.contract_name.as_deref() == Some(factory)
                && invoked.contains(prefix);
            if !matches {
                return None;
            }
            let created = tx.additional_contracts.first()?;
            Some((deployed.to_string(), created.address))
        })
    });

    creates.chain(factory_creates).collect()
}

/// Build a digest from a broadcast log and the compiler output directory.
#[instrument(skip_all, fields(run = %run_path.display(), out = %out_dir.display()))]
pub fn generate_digest(run_path: &Path, out_dir: &Path) -> Result<ContractDigest, StakerError> {
    let raw = std::fs::read_to_string(run_path)
        .map_err(|e| StakerError::Digest(format!("cannot read {}: {e}", run_path.display())))?;
    let run: LatestRun =
        serde_json::from_str(&raw).map_err(|e| StakerError::Digest(format!("malformed broadcast log: {e}")))?;

    let mut digest = ContractDigest::default();
    for (name, address) in deployments(&run) {
        let artifact = out_dir.join(format!("{name}.sol")).join(format!("{name}.json"));
        let compiled = std::fs::read_to_string(&artifact)
            .map_err(|e| StakerError::Digest(format!("cannot read {}: {e}", artifact.display())))?;
        let compiled: CompiledContract = serde_json::from_str(&compiled)
            .map_err(|e| StakerError::Digest(format!("malformed artifact {}: {e}", artifact.display())))?;

        debug!(contract = %name, %address, "Digesting contract");
        digest.insert(ContractInfo {
            name,
            address,
            abi: compiled.abi,
        });
    }

    info!(contracts = digest.len(), "Digest generated");
    Ok(digest)
}

/// Write the digest as compact JSON, creating parent directories.
pub fn write_digest(digest: &ContractDigest, path: &Path) -> Result<(), StakerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| StakerError::Digest(format!("cannot create {}: {e}", parent.display())))?;
    }
    let json = serde_json::to_string(digest).map_err(|e| StakerError::Digest(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| StakerError::Digest(format!("cannot write {}: {e}", path.display())))?;
    info!(path = %path.display(), "Contract digest written");
    Ok(())
}
