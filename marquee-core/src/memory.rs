use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::ids::TicketId;
use crate::ledger::{decode_hold_set, Ledger, LedgerError, LedgerResult, LedgerScript};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process ledger for a single service instance, development and tests.
///
/// Every script runs while holding one lock over the whole keyspace, so it is
/// atomic for all tasks sharing this instance (but not across processes).
/// Expired entries are dropped when touched, and the whole map is swept
/// every `SWEEP_INTERVAL` script runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, Entry>>,
    script_runs: AtomicU64,
}

const SWEEP_INTERVAL: u64 = 256;

/// Value at `key` if unexpired; a dead entry is removed on the way.
fn live_value(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) -> Option<String> {
    match entries.get(key) {
        Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
        Some(_) => {}
        None => return None,
    }
    entries.remove(key);
    None
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired keys currently stored.
    pub fn live_key_count(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    /// Number of keys held in memory, expired ones included.
    pub fn stored_key_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Drops every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        Self::sweep(&mut self.entries.lock(), Instant::now())
    }

    fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }

    fn hold_tickets(entries: &mut HashMap<String, Entry>, keys: &[String], args: &[String]) -> LedgerResult<i64> {
        let (customer_key, ticket_keys) = keys
            .split_last()
            .ok_or_else(|| LedgerError::InvalidArguments("hold_tickets needs at least the customer key".into()))?;
        let [customer_id, ttl_ms, hold_set, prefix] = args else {
            return Err(LedgerError::InvalidArguments(format!(
                "hold_tickets expects 4 arguments, got {}",
                args.len()
            )));
        };
        let ttl_ms: u64 = ttl_ms
            .parse()
            .map_err(|_| LedgerError::InvalidArguments(format!("invalid hold duration: {:?}", ttl_ms)))?;
        if ttl_ms == 0 {
            return Err(LedgerError::InvalidArguments("hold duration must be positive".into()));
        }

        let now = Instant::now();
        for key in ticket_keys {
            if let Some(owner) = live_value(entries, key, now) {
                if owner != *customer_id {
                    return Ok(0);
                }
            }
        }

        if let Some(previous) = live_value(entries, customer_key, now) {
            let previous: Vec<TicketId> = decode_hold_set(customer_key, &previous)?;
            for ticket_id in previous {
                let key = format!("{}{}", prefix, ticket_id);
                if live_value(entries, &key, now).as_deref() == Some(customer_id.as_str()) {
                    entries.remove(&key);
                }
            }
        }

        let expires_at = Some(now + Duration::from_millis(ttl_ms));
        for key in ticket_keys {
            entries.insert(
                key.clone(),
                Entry {
                    value: customer_id.clone(),
                    expires_at,
                },
            );
        }
        entries.insert(
            customer_key.clone(),
            Entry {
                value: hold_set.clone(),
                expires_at,
            },
        );

        Ok(1)
    }

    fn release_hold(entries: &mut HashMap<String, Entry>, keys: &[String], args: &[String]) -> LedgerResult<i64> {
        let [customer_key] = keys else {
            return Err(LedgerError::InvalidArguments(format!(
                "release_hold expects 1 key, got {}",
                keys.len()
            )));
        };
        let [customer_id, prefix] = args else {
            return Err(LedgerError::InvalidArguments(format!(
                "release_hold expects 2 arguments, got {}",
                args.len()
            )));
        };

        let now = Instant::now();
        let Some(entry) = entries.remove(customer_key) else {
            return Ok(0);
        };
        if !entry.is_live(now) {
            return Ok(0);
        }

        let mut released = 0;
        for ticket_id in decode_hold_set(customer_key, &entry.value)? {
            let key = format!("{}{}", prefix, ticket_id);
            if live_value(entries, &key, now).as_deref() == Some(customer_id.as_str()) {
                entries.remove(&key);
                released += 1;
            }
        }
        Ok(released)
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        Ok(live_value(&mut self.entries.lock(), key, Instant::now()))
    }

    async fn delete(&self, key: &str) -> LedgerResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn run_atomic(&self, script: LedgerScript, keys: &[String], args: &[String]) -> LedgerResult<i64> {
        let mut entries = self.entries.lock();
        let outcome = match script {
            LedgerScript::HoldTickets => Self::hold_tickets(&mut entries, keys, args),
            LedgerScript::ReleaseHold => Self::release_hold(&mut entries, keys, args),
        };

        let runs = self.script_runs.fetch_add(1, Ordering::Relaxed) + 1;
        if runs % SWEEP_INTERVAL == 0 {
            let purged = Self::sweep(&mut entries, Instant::now());
            if purged > 0 {
                debug!("Purged {} expired ledger entries", purged);
            }
        }
        outcome
    }
}
