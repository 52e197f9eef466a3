pub mod ids;
pub mod keys;
pub mod ledger;
pub mod memory;
pub mod settings;
pub mod holding;

pub use holding::TicketHoldingService;
pub use ids::{CustomerId, ShowtimeId, TicketId};
pub use ledger::{Ledger, LedgerError, LedgerResult, LedgerScript};
pub use memory::MemoryLedger;
pub use settings::HoldDuration;

#[derive(Debug, thiserror::Error)]
pub enum HoldError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type HoldResult<T> = Result<T, HoldError>;
