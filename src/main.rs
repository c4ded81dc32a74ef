//! fmdash - a self-hosted Last.fm listening analytics dashboard server

mod api;
mod config;
mod core;
mod db;
mod lastfm;
mod models;
mod stores;
mod utils;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// fmdash - Last.fm listening dashboard
#[derive(Parser, Debug)]
#[command(name = "fmdash")]
#[command(version = "0.1.0")]
#[command(about = "Self-hosted Last.fm listening analytics dashboard server")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 1984)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };

    // silence per-request noise from the http stacks unless debugging
    let filter = tracing_subscriber::EnvFilter::new(format!(
        "{},hyper=warn,reqwest=warn,sqlx=warn",
        log_level
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("fmdash v0.1.0 starting...");

    let paths = config::Paths::init(args.config)?;
    info!("Config directory: {:?}", paths.config_dir());

    run_setup().await?;

    let addr = format!("{}:{}", args.host, args.port);
    info!("Server listening on http://{}", addr);

    use actix_cors::Cors;
    use actix_web::{middleware, App, HttpServer};

    HttpServer::new(|| {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(api::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}

async fn run_setup() -> Result<()> {
    use crate::config::UserConfig;
    use crate::db::setup_sqlite;

    let mut config = UserConfig::load()?;

    // Generate server ID if missing (used as the JWT secret and hash salt)
    if config.server_id.is_empty() {
        config.server_id = uuid::Uuid::new_v4().to_string();
        config.save()?;
    }

    if config.lastfm_api_key.is_empty() || config.lastfm_api_secret.is_empty() {
        tracing::warn!(
            "Last.fm API credentials are not configured. \
             Set lastfmApiKey and lastfmApiSecret in settings.json \
             (or FMDASH_LASTFM_API_KEY / FMDASH_LASTFM_API_SECRET)."
        );
    }

    setup_sqlite().await?;

    Ok(())
}
