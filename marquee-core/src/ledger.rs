use async_trait::async_trait;

use crate::ids::TicketId;

/// Shared key-value store holding every lease.
///
/// Correctness across service replicas rests entirely on `run_atomic`:
/// an implementation must execute the whole script as one indivisible unit
/// for every process sharing the ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>>;

    async fn delete(&self, key: &str) -> LedgerResult<()>;

    async fn run_atomic(&self, script: LedgerScript, keys: &[String], args: &[String]) -> LedgerResult<i64>;
}

/// Atomic read-modify-write scripts understood by every ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerScript {
    /// KEYS: requested ticket keys, then the customer key last.
    /// ARGV: customer id, hold duration in ms, encoded hold-set, ticket key prefix.
    ///
    /// Returns 0 without touching anything if any requested ticket is owned
    /// by another customer. Otherwise drops the customer's previous leases,
    /// leases every requested ticket and stores the new hold-set, all with
    /// the same expiry, and returns 1.
    HoldTickets,
    /// KEYS: customer key.
    /// ARGV: customer id, ticket key prefix.
    ///
    /// Deletes every lease of the stored hold-set still owned by the
    /// customer, then the hold-set itself. Returns the number of leases deleted.
    ReleaseHold,
}

impl LedgerScript {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerScript::HoldTickets => "hold_tickets",
            LedgerScript::ReleaseHold => "release_hold",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
    #[error("Ledger script failed: {0}")]
    Script(String),
    #[error("Corrupt value at {key}: {reason}")]
    CorruptValue { key: String, reason: String },
    #[error("Invalid script arguments: {0}")]
    InvalidArguments(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Hold-sets are stored as a JSON array of ticket ids, in request order.
pub fn encode_hold_set(ticket_ids: &[TicketId]) -> String {
    // Vec<String> serialization cannot fail
    serde_json::to_string(ticket_ids).unwrap_or_else(|_| "[]".to_owned())
}

pub fn decode_hold_set(key: &str, raw: &str) -> LedgerResult<Vec<TicketId>> {
    serde_json::from_str(raw).map_err(|e| LedgerError::CorruptValue {
        key: key.to_owned(),
        reason: e.to_string(),
    })
}
