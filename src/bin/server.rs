use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bazaar::auth::TokenKeys;
use bazaar::config::{get_config, CliArgs, Config};
use bazaar::{create_app, db, run_migrations, AppState};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "bazaar=info,tower_http=info";

/// Sets up console logging plus, when `log_dir` is configured, a daily
/// rolling JSON log file
///
/// The returned guard must be kept alive for the file writer to flush.
fn init_logging(config: &Config, debug: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("bazaar=debug,tower_http=debug")
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    });

    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "bazaar.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// Makes sure the directory holding a file-backed database exists
fn ensure_database_dir(database_url: &str) -> anyhow::Result<()> {
    if database_url.starts_with("file:") || database_url == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(database_url).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env, if present
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let debug = args.debug;
    let config = get_config(args);
    let _guard = init_logging(&config, debug);

    info!("Using database {}", config.database_url);
    if let Some(dir) = &config.log_dir {
        info!("Writing JSON logs to {}", dir);
    }

    ensure_database_dir(&config.database_url)?;
    let pool = db::init_pool(&config.database_url)
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    {
        let mut conn = pool.get().context("Failed to get a database connection")?;
        run_migrations(&mut conn)?;
    }

    if config.token_ttl_hours <= 0 {
        warn!("token_ttl_hours is {}, issued tokens will already be expired", config.token_ttl_hours);
    }

    let state = AppState::new(
        Arc::new(pool),
        TokenKeys::new(&config.jwt_secret, config.token_ttl_hours),
    );
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
