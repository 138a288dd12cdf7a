//! `roster-server` entry point.
//!
//! Usage: `roster-server [CONFIG_PATH]`. Without an argument the path comes
//! from `ROSTER_CONFIG_PATH`, then `config.toml` in the working directory.

use roster_db::DbPool;
use roster_server::config::{self, DatabaseConfig, LoggingConfig};
use roster_server::{app, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Picks the config file and reports where the choice came from.
fn config_location() -> (String, &'static str) {
    let from_arg = std::env::args().nth(1).filter(|p| !p.trim().is_empty());
    if let Some(path) = from_arg {
        return (path, "argument");
    }
    match std::env::var("ROSTER_CONFIG_PATH") {
        Ok(path) if !path.trim().is_empty() => (path, "ROSTER_CONFIG_PATH"),
        _ => (DEFAULT_CONFIG_PATH.to_string(), "default"),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|err| {
        eprintln!("invalid logging.level {:?} ({err}), using info", logging.level);
        EnvFilter::new("info")
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Opens the user database and brings its schema up to date.
fn open_store(database: &DatabaseConfig) -> DbPool {
    let pool = roster_db::create_pool(&database.path, database.runtime_settings())
        .unwrap_or_else(|err| panic!("cannot open user database {}: {err}", database.path));

    let conn = pool
        .get()
        .unwrap_or_else(|err| panic!("no connection available for schema setup: {err}"));
    match roster_db::run_migrations(&conn) {
        Ok(0) => tracing::debug!("user schema already current"),
        Ok(applied) => tracing::info!(applied, "user schema updated"),
        Err(err) => panic!("schema setup failed for {}: {err}", database.path),
    }
    pool
}

#[tokio::main]
async fn main() {
    let (config_path, source) = config_location();
    let config = config::load_config(Some(&config_path))
        .unwrap_or_else(|err| panic!("unusable config {config_path}: {err}"));

    init_logging(&config.logging);
    tracing::info!(path = %config_path, source, "configuration loaded");

    let pool = open_store(&config.database);
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|err| panic!("cannot listen on {addr}: {err}"));

    tracing::info!(%addr, db = %config.database.path, "roster listening");

    if let Err(err) = axum::serve(listener, app(AppState { pool }))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server stopped with an error");
        std::process::exit(1);
    }

    tracing::info!("roster stopped");
}

/// Resolves once SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "draining connections before exit");
}
