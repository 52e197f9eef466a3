use async_trait::async_trait;
use marquee_core::{Ledger, LedgerError, LedgerResult, LedgerScript};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, Script};
use tracing::{error, info};

/// Ledger backed by Redis. Atomic scripts run server-side as Lua, so every
/// service replica pointed at the same Redis observes one serial order.
// The scripts rebuild ticket keys from a stored hold-set instead of receiving
// them in KEYS. On Redis Cluster this relies on the showtime hash tag keeping
// every key of a showtime in one slot; key-scoped script ACLs are not supported.
#[derive(Clone)]
pub struct RedisLedger {
    conn_manager: ConnectionManager,
    hold_tickets: Script,
    release_hold: Script,
}

impl RedisLedger {
    pub async fn connect(connection_string: &str) -> Result<Self, RedisError> {
        let client = redis::Client::open(connection_string)?;
        let conn_manager = ConnectionManager::new(client).await?;
        info!("Connected to Redis ledger");
        Ok(Self {
            conn_manager,
            hold_tickets: Script::new(include_str!("scripts/hold_tickets.lua")),
            release_hold: Script::new(include_str!("scripts/release_hold.lua")),
        })
    }

    fn script(&self, script: LedgerScript) -> &Script {
        match script {
            LedgerScript::HoldTickets => &self.hold_tickets,
            LedgerScript::ReleaseHold => &self.release_hold,
        }
    }
}

#[async_trait]
impl Ledger for RedisLedger {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        let mut conn = self.conn_manager.clone();
        let value: Option<String> = conn.get(key).await.map_err(into_ledger_error)?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> LedgerResult<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn.del(key).await.map_err(into_ledger_error)?;
        Ok(())
    }

    async fn run_atomic(&self, script: LedgerScript, keys: &[String], args: &[String]) -> LedgerResult<i64> {
        let mut conn = self.conn_manager.clone();
        let mut invocation = self.script(script).prepare_invoke();
        for key in keys {
            invocation.key(key);
        }
        for arg in args {
            invocation.arg(arg);
        }

        // EVALSHA, falling back to EVAL when the script cache is cold
        invocation.invoke_async(&mut conn).await.map_err(|e| {
            error!("Redis script {} failed: {}", script.name(), e);
            into_ledger_error(e)
        })
    }
}

fn into_ledger_error(err: RedisError) -> LedgerError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
        LedgerError::Unavailable(err.to_string())
    } else {
        LedgerError::Script(err.to_string())
    }
}
