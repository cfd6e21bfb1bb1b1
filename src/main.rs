use frontdesk::application::inbound::InboundCallService;
use frontdesk::application::status::CallStatusService;
use frontdesk::config::Config;
use frontdesk::domain::business::BusinessContextProvider;
use frontdesk::domain::call::CallRepository;
use frontdesk::domain::routing::RoutingStrategy;
use frontdesk::infrastructure::media::{BridgeSettings, MediaBridge};
use frontdesk::infrastructure::telephony::recorder::{
    CallRecorder, HttpCallRecorder, NoopCallRecorder,
};
use frontdesk::interface::api::{build_router, init_metrics, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "postgres")]
use frontdesk::infrastructure::persistence::{
    create_pool, run_migrations, PgBusinessDirectory, PgCallRepository,
};

#[cfg(not(feature = "postgres"))]
use frontdesk::infrastructure::persistence::{InMemoryBusinessDirectory, InMemoryCallRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontdesk=info,tower_http=info".into()),
        )
        .init();

    info!("Starting Frontdesk call service");

    // Load configuration
    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        public_host = %config.server.public_host,
        "Configuration loaded"
    );

    // Build repositories
    #[cfg(feature = "postgres")]
    let (calls, directory): (Arc<dyn CallRepository>, Arc<dyn BusinessContextProvider>) = {
        let pool = create_pool(&config.database).await?;
        run_migrations(&pool).await?;
        (
            Arc::new(PgCallRepository::new(pool.clone())),
            Arc::new(PgBusinessDirectory::new(pool)),
        )
    };

    #[cfg(not(feature = "postgres"))]
    let (calls, directory): (Arc<dyn CallRepository>, Arc<dyn BusinessContextProvider>) = {
        warn!("Running with in-memory stores; call records will not survive a restart");
        (
            Arc::new(InMemoryCallRepository::new()),
            Arc::new(InMemoryBusinessDirectory::new()),
        )
    };

    // Recording control needs provider REST credentials
    let recorder: Arc<dyn CallRecorder> = if config.telephony.account_sid.is_empty() {
        warn!("No provider account configured, call recording disabled");
        Arc::new(NoopCallRecorder)
    } else {
        Arc::new(HttpCallRecorder::new(
            config.telephony.api_base.clone(),
            config.telephony.account_sid.clone(),
            config.telephony.auth_token.clone(),
        ))
    };

    // Application services
    let inbound = Arc::new(InboundCallService::new(
        directory,
        calls.clone(),
        RoutingStrategy::AlwaysAi,
        config.server.public_host.clone(),
    ));
    let status = Arc::new(CallStatusService::new(calls));

    let bridge = MediaBridge::new(
        BridgeSettings {
            realtime_url: config.ai.realtime_url.clone(),
            handshake_timeout: Duration::from_secs(config.ai.handshake_timeout_secs),
            public_host: config.server.public_host.clone(),
            record_calls: config.telephony.record_calls,
        },
        recorder,
    );

    let signature_key = if config.telephony.validate_signatures {
        if config.telephony.auth_token.is_empty() {
            warn!("Signature validation enabled without an auth token, disabling");
            None
        } else {
            Some(config.telephony.auth_token.clone())
        }
    } else {
        None
    };

    // Initialize metrics exporter
    let prometheus_handle = init_metrics();

    let state = AppState {
        inbound,
        status,
        bridge,
        signature_key,
        public_host: config.server.public_host.clone(),
    };
    let app = build_router(state, prometheus_handle);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
