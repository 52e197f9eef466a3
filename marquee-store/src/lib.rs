pub mod app_config;
pub mod redis_ledger;

pub use redis_ledger::RedisLedger;
