mod aggregate;
mod app;
mod config;
mod consumer;
mod dispatch;
mod error;
mod handlers;
mod job;
mod origin;
mod queue;
mod state;
mod store;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::{net::TcpListener, signal, sync::broadcast};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app, config::Config, consumer::Consumer, job::RefreshJob, origin::OriginClient,
    queue::SqsQueue, state::AppState, store::RedisStore,
};

/// Searchlist - aggregated search caching with queue-driven invalidation
#[derive(Parser, Debug)]
#[command(name = "searchlist")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the read API server
    Serve {
        /// Host address to bind the server to
        #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
        host: String,

        /// Port to listen on
        #[arg(long, short, default_value = "3000", env = "PORT")]
        port: u16,
    },
    /// Run the invalidation queue consumer
    Worker,
    /// Run one pass of the cache refresh job
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "searchlist=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match cli.command {
        Commands::Serve { host, port } => serve(config, &host, port).await,
        Commands::Worker => worker(config).await,
        Commands::Refresh => refresh(config).await,
    }
}

async fn serve(config: Config, host: &str, port: u16) -> Result<()> {
    let state = AppState::from_env(config).await?;
    let app = create_app(state);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn worker(config: Config) -> Result<()> {
    let store = Arc::new(RedisStore::new(&config.redis_url).await?);
    let queue = Arc::new(SqsQueue::from_env(&config.queue_url).await);
    let consumer = Consumer::new(store, queue, Arc::new(config));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });

    consumer.run(shutdown_rx).await;
    Ok(())
}

async fn refresh(config: Config) -> Result<()> {
    let store = Arc::new(RedisStore::new(&config.redis_url).await?);
    let origin = Arc::new(OriginClient::new(
        &config.origin_url,
        config.origin_login.clone(),
        config.origin_api_key.clone(),
    ));

    RefreshJob::new(store, origin, Arc::new(config)).run().await
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
