use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ids::{CustomerId, ShowtimeId, TicketId};
use crate::keys::{customer_key, ticket_key, ticket_key_prefix};
use crate::ledger::{decode_hold_set, encode_hold_set, Ledger, LedgerScript};
use crate::settings::HoldDuration;
use crate::{HoldError, HoldResult};

/// Leases temporary, exclusive ownership of tickets to customers.
///
/// The service keeps no state of its own besides the hold duration; any
/// number of replicas may share one ledger.
#[derive(Clone)]
pub struct TicketHoldingService {
    ledger: Arc<dyn Ledger>,
    hold_duration: HoldDuration,
}

impl TicketHoldingService {
    pub fn new(ledger: Arc<dyn Ledger>, hold_duration: HoldDuration) -> Self {
        Self { ledger, hold_duration }
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration.get()
    }

    /// Changes the expiry given to subsequent holds. Existing holds keep theirs.
    pub fn set_hold_duration(&self, duration: Duration) -> HoldResult<()> {
        if duration.as_millis() == 0 {
            return Err(HoldError::InvalidInput("hold duration must be at least 1 ms".into()));
        }
        self.hold_duration.set(duration);
        info!("Hold duration set to {} ms", duration.as_millis());
        Ok(())
    }

    /// Holds every ticket in `ticket_ids` for `customer_id`, replacing the
    /// customer's previous hold for this showtime.
    ///
    /// Returns `Ok(false)` when any ticket is held by another customer, in
    /// which case nothing changes. Re-holding tickets the customer already
    /// owns succeeds and refreshes their expiry.
    pub async fn hold_tickets(
        &self,
        customer_id: &CustomerId,
        showtime_id: &ShowtimeId,
        ticket_ids: &[TicketId],
    ) -> HoldResult<bool> {
        customer_id.validate()?;
        showtime_id.validate()?;
        if ticket_ids.is_empty() {
            return Err(HoldError::InvalidInput("at least one ticket id is required".into()));
        }
        for ticket_id in ticket_ids {
            ticket_id.validate()?;
        }

        let mut seen = HashSet::with_capacity(ticket_ids.len());
        let ticket_ids: Vec<TicketId> = ticket_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut keys: Vec<String> = ticket_ids.iter().map(|t| ticket_key(showtime_id, t)).collect();
        keys.push(customer_key(showtime_id, customer_id));

        let ttl_ms = self.hold_duration.get().as_millis().max(1);
        let args = vec![
            customer_id.to_string(),
            ttl_ms.to_string(),
            encode_hold_set(&ticket_ids),
            ticket_key_prefix(showtime_id),
        ];

        let outcome = self
            .ledger
            .run_atomic(LedgerScript::HoldTickets, &keys, &args)
            .await
            .map_err(|e| {
                warn!("Hold script failed for {} on showtime {}: {}", customer_id, showtime_id, e);
                e
            })?;

        if outcome == 1 {
            debug!(
                "Held {} ticket(s) for {} on showtime {} ({} ms)",
                ticket_ids.len(),
                customer_id,
                showtime_id,
                ttl_ms
            );
            Ok(true)
        } else {
            info!("Hold conflict for {} on showtime {}", customer_id, showtime_id);
            Ok(false)
        }
    }

    /// Tickets currently held by `customer_id` for `showtime_id`; empty when
    /// nothing is held or the hold has expired.
    pub async fn find_held_ticket_ids(
        &self,
        showtime_id: &ShowtimeId,
        customer_id: &CustomerId,
    ) -> HoldResult<Vec<TicketId>> {
        showtime_id.validate()?;
        customer_id.validate()?;

        let key = customer_key(showtime_id, customer_id);
        match self.ledger.get(&key).await? {
            Some(raw) => Ok(decode_hold_set(&key, &raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Drops the customer's hold for this showtime. Releasing nothing is a
    /// successful no-op.
    pub async fn release_tickets(&self, showtime_id: &ShowtimeId, customer_id: &CustomerId) -> HoldResult<bool> {
        showtime_id.validate()?;
        customer_id.validate()?;

        let keys = [customer_key(showtime_id, customer_id)];
        let args = [customer_id.to_string(), ticket_key_prefix(showtime_id)];
        let released = self.ledger.run_atomic(LedgerScript::ReleaseHold, &keys, &args).await?;

        debug!("Released {} ticket(s) for {} on showtime {}", released, customer_id, showtime_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;
    use crate::LedgerError;
    use async_trait::async_trait;

    fn service() -> TicketHoldingService {
        TicketHoldingService::new(Arc::new(MemoryLedger::new()), HoldDuration::default())
    }

    fn tickets(ids: &[&str]) -> Vec<TicketId> {
        ids.iter().map(|id| TicketId::from(*id)).collect()
    }

    struct DownLedger;

    #[async_trait]
    impl Ledger for DownLedger {
        async fn get(&self, _key: &str) -> crate::LedgerResult<Option<String>> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }

        async fn delete(&self, _key: &str) -> crate::LedgerResult<()> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }

        async fn run_atomic(&self, _script: LedgerScript, _keys: &[String], _args: &[String]) -> crate::LedgerResult<i64> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_empty_request_is_invalid() {
        let svc = service();
        let result = svc.hold_tickets(&"alice".into(), &"s1".into(), &[]).await;
        assert!(matches!(result, Err(HoldError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_malformed_ticket_rejected_before_ledger() {
        let svc = TicketHoldingService::new(Arc::new(DownLedger), HoldDuration::default());
        let result = svc.hold_tickets(&"alice".into(), &"s1".into(), &tickets(&["t1", ""])).await;
        assert!(matches!(result, Err(HoldError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_duplicate_ticket_ids_are_collapsed() {
        let svc = service();
        let customer = CustomerId::from("alice");
        let showtime = ShowtimeId::from("s1");

        assert!(svc.hold_tickets(&customer, &showtime, &tickets(&["t2", "t1", "t2"])).await.unwrap());
        assert_eq!(svc.find_held_ticket_ids(&showtime, &customer).await.unwrap(), tickets(&["t2", "t1"]));
    }

    #[tokio::test]
    async fn test_ledger_failures_propagate() {
        let svc = TicketHoldingService::new(Arc::new(DownLedger), HoldDuration::default());
        let customer = CustomerId::from("alice");
        let showtime = ShowtimeId::from("s1");

        let hold = svc.hold_tickets(&customer, &showtime, &tickets(&["t1"])).await;
        assert!(matches!(hold, Err(HoldError::Ledger(LedgerError::Unavailable(_)))));

        let find = svc.find_held_ticket_ids(&showtime, &customer).await;
        assert!(matches!(find, Err(HoldError::Ledger(LedgerError::Unavailable(_)))));

        let release = svc.release_tickets(&showtime, &customer).await;
        assert!(matches!(release, Err(HoldError::Ledger(LedgerError::Unavailable(_)))));
    }

    #[tokio::test]
    async fn test_release_of_nothing_succeeds() {
        let svc = service();
        assert!(svc.release_tickets(&"s1".into(), &"nobody".into()).await.unwrap());
    }

    #[test]
    fn test_zero_hold_duration_rejected() {
        let svc = service();
        assert!(matches!(svc.set_hold_duration(Duration::ZERO), Err(HoldError::InvalidInput(_))));
        assert_eq!(svc.hold_duration(), Duration::from_secs(900));
    }
}
