use awx_exporter_collector::{
    MetricsRegistry,
    Orchestrator,
    Scheduler,
};
use awx_exporter_config::{
    Args,
    Config,
};
use awx_exporter_http::create_router;
use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use tokio::{
    net::TcpListener,
    signal,
};
use tokio_util::sync::CancellationToken;
use tracing::{
    error,
    info,
    warn,
};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

fn init_logging() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))))
        .with(tracing_error::ErrorLayer::default())
        .init();
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn run(config: Config) -> Result<()> {
    info!(
        host = config.host(),
        port = config.listen_address.port(),
        interval = ?config.scrape_interval,
        targets = ?config.targets,
        "starting awx exporter"
    );

    let registry = Arc::new(MetricsRegistry::new()?);
    let orchestrator = Orchestrator::from_config(&config, registry.clone())?;
    let shutdown = CancellationToken::new();

    let listener = TcpListener::bind(config.listen_address).await?;
    info!("listening on {}", config.listen_address);

    let scheduler = Scheduler::new(orchestrator, config.scrape_interval).spawn(shutdown.clone());
    let server_shutdown = shutdown.clone();
    let mut server = tokio::task::spawn(async move {
        axum::serve(listener, create_router(registry))
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await
    });

    let early_exit = tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            None
        }
        result = &mut server => Some(result),
    };
    shutdown.cancel();

    let drain = async {
        let server = match early_exit {
            Some(result) => result,
            None => server.await,
        };
        (server, scheduler.await)
    };
    let Ok((server, scheduler)) = tokio::time::timeout(config.shutdown_grace, drain).await else {
        warn!(grace = ?config.shutdown_grace, "shutdown grace period elapsed, exiting");
        return Ok(());
    };

    scheduler?;
    server??;
    info!("shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let config = Config::from_args(Args::parse())?;
    run(config).await
}
