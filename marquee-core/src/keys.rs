//! Ledger key scheme.
//!
//! Every key is namespaced by showtime so that tickets of different
//! screenings never compete. The showtime is wrapped in `{}` so all keys of
//! one showtime hash to the same Redis Cluster slot.

use crate::ids::{CustomerId, ShowtimeId, TicketId};

/// Key of the lease record for one ticket. Value: owning customer id.
pub fn ticket_key(showtime_id: &ShowtimeId, ticket_id: &TicketId) -> String {
    format!("{}{}", ticket_key_prefix(showtime_id), ticket_id)
}

/// Key of a customer's hold-set for one showtime. Value: JSON array of ticket ids.
pub fn customer_key(showtime_id: &ShowtimeId, customer_id: &CustomerId) -> String {
    format!("showtime:{{{}}}:customer:{}", showtime_id, customer_id)
}

/// Prefix that turns a bare ticket id into its ticket key; atomic scripts
/// use it to rebuild keys from a stored hold-set.
pub fn ticket_key_prefix(showtime_id: &ShowtimeId) -> String {
    format!("showtime:{{{}}}:ticket:", showtime_id)
}
