//! Telemetry Port - outcome counters reported by the use cases.
//!
//! The Prometheus registry implements this; use cases only see the trait.

/// Counters for revalidations and transaction attempts.
pub trait Telemetry: Send + Sync + 'static {
    /// A revalidation of `resource` finished.
    fn record_poll(&self, resource: &str, ok: bool);

    /// A transaction was refused before anything was sent.
    fn tx_blocked(&self, action: &str);

    /// A transaction was sent; `outcome` is `success`, `reverted` or `error`.
    fn tx_submitted(&self, action: &str, outcome: &str);
}
