//! Prometheus Metrics Registry - Client Observability
//!
//! Counts contract reads, poll outcomes and transaction submissions so a
//! long-running `watch` can be scraped. All metrics are prefixed
//! `staker_`.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::ports::telemetry::Telemetry;

/// Centralized Prometheus metrics.
pub struct MetricsRegistry {
    registry: Registry,
    /// Contract `view` calls by contract and method signature.
    pub contract_reads: IntCounterVec,
    /// Failed contract `view` calls by contract and method signature.
    pub contract_read_errors: IntCounterVec,
    /// Poll completions by resource and outcome (ok/error).
    pub polls: IntCounterVec,
    /// Transactions sent by action and receipt outcome (success/reverted/error).
    pub tx_submitted: IntCounterVec,
    /// Transactions refused before sending, by action.
    pub tx_blocked: IntCounterVec,
    /// Node status service reachability (1 = reachable).
    pub node_reachable: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let contract_reads = IntCounterVec::new(
            Opts::new("staker_contract_reads_total", "Contract view calls issued"),
            &["contract", "method"],
        )?;

        let contract_read_errors = IntCounterVec::new(
            Opts::new("staker_contract_read_errors_total", "Contract view calls that failed"),
            &["contract", "method"],
        )?;

        let polls = IntCounterVec::new(
            Opts::new("staker_polls_total", "Completed revalidations"),
            &["resource", "outcome"],
        )?;

        let tx_submitted = IntCounterVec::new(
            Opts::new("staker_tx_submitted_total", "Transactions sent to the node"),
            &["action", "outcome"],
        )?;

        let tx_blocked = IntCounterVec::new(
            Opts::new("staker_tx_blocked_total", "Transactions refused before sending"),
            &["action"],
        )?;

        let node_reachable = IntGauge::new("staker_node_reachable", "Node status service reachable (1=yes, 0=no)")?;

        registry.register(Box::new(contract_reads.clone()))?;
        registry.register(Box::new(contract_read_errors.clone()))?;
        registry.register(Box::new(polls.clone()))?;
        registry.register(Box::new(tx_submitted.clone()))?;
        registry.register(Box::new(tx_blocked.clone()))?;
        registry.register(Box::new(node_reachable.clone()))?;

        Ok(Self {
            registry,
            contract_reads,
            contract_read_errors,
            polls,
            tx_submitted,
            tx_blocked,
            node_reachable,
        })
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Telemetry for MetricsRegistry {
    fn record_poll(&self, resource: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.polls.with_label_values(&[resource, outcome]).inc();
    }

    fn tx_blocked(&self, action: &str) {
        self.tx_blocked.with_label_values(&[action]).inc();
    }

    fn tx_submitted(&self, action: &str, outcome: &str) {
        self.tx_submitted.with_label_values(&[action, outcome]).inc();
    }
}
