use std::net::SocketAddr;
use std::sync::Arc;

use marquee_api::{app, AppState};
use marquee_core::{HoldDuration, Ledger, MemoryLedger, TicketHoldingService};
use marquee_store::app_config::{Config, LedgerBackend};
use marquee_store::RedisLedger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "marquee_api=debug,marquee_core=debug,marquee_store=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Marquee hold service on port {}", config.server.port);

    let ledger: Arc<dyn Ledger> = match config.ledger.backend {
        LedgerBackend::Redis => Arc::new(RedisLedger::connect(&config.redis.url).await?),
        LedgerBackend::Memory => {
            tracing::warn!("Using in-memory ledger; holds are local to this process");
            Arc::new(MemoryLedger::new())
        }
    };

    let holds = TicketHoldingService::new(ledger, HoldDuration::new(config.holds.hold_duration()));
    // Reject a zero duration from config the same way the admin endpoint does
    holds.set_hold_duration(config.holds.hold_duration())?;

    let app = app(AppState { holds });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
