mod cli;
mod config;
mod constants;
mod domain;
mod error;
mod logging;
mod routes;
mod services;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::{Args, Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use config::Config;
use constants::{DEFAULT_HOST, DEFAULT_PORT};
use services::backend::TweetBackend;
use services::twscrape::TwscrapeBackend;

struct AppState {
    backend: Arc<dyn TweetBackend>,
    config: Config,
}

#[derive(Debug, Parser)]
#[command(name = "tweet-fetch", version, about = "Fetch recent tweets for a user")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch tweets once and write them to a JSON file
    Fetch(cli::FetchArgs),
    /// Serve the HTTP API
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn app(state: Arc<AppState>) -> Router {
    routes::build_routes()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        backend: Arc::new(TwscrapeBackend::from_config(&config)),
        config,
    });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening");
    axum::serve(listener, app(state))
        .await
        .context("server failed")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let Cli { command } = Cli::parse();
    let config = Config::from_env();

    match command {
        Command::Fetch(args) => {
            let backend = TwscrapeBackend::from_config(&config);
            cli::run(args, &backend, &config).await
        }
        Command::Serve(args) => serve(args, config).await,
    }
}
