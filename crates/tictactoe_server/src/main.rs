//! Tic-tac-toe - server binary
//!
//! Runs the JSON API, applies migrations, or prints a stored game.

#![warn(missing_docs)]

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_server::{
    AppState, GameRepository, GameService, LobbyService, ServerConfig, router,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            database,
        } => run_server(config, host, port, database).await,
        Command::Migrate { database } => run_migrate(database),
        Command::AddUser { username, database } => add_user(&username, database),
        Command::Show { game_id, database } => show_game(game_id, database),
    }
}

/// Installs the fmt subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Opens the repository named by the resolved configuration.
fn open_repository(config: &ServerConfig) -> Result<GameRepository> {
    GameRepository::new(config.database().clone())
        .with_context(|| format!("Invalid database path '{}'", config.database()))
}

/// Migrate, then serve the API until Ctrl-C.
#[instrument(skip_all)]
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
) -> Result<()> {
    let config = ServerConfig::load(config_path.as_deref())?.with_overrides(host, port, database);
    init_tracing(config.log_filter());

    info!(database = %config.database(), "Starting tic-tac-toe server");
    let repository = open_repository(&config)?;
    let applied = repository.run_migrations()?;
    info!(applied, "Database ready");

    let app = router(AppState::new(repository));
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server ready at http://{}/", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Apply pending migrations and exit.
fn run_migrate(database: Option<String>) -> Result<()> {
    let config = ServerConfig::load(None)?.with_overrides(None, None, database);
    init_tracing(config.log_filter());

    let repository = open_repository(&config)?;
    let applied = repository.run_migrations()?;
    println!("Applied {} migration(s) to {}", applied, config.database());
    Ok(())
}

/// Register a user unless one with that name exists, and print it.
fn add_user(username: &str, database: Option<String>) -> Result<()> {
    let config = ServerConfig::load(None)?.with_overrides(None, None, database);
    init_tracing("warn");

    let repository = open_repository(&config)?;
    repository.run_migrations()?;
    let user = LobbyService::new(repository).get_or_create_user(username)?;
    println!("User {}: {}", user.id(), user.username());
    Ok(())
}

/// Print a game's players, status and board.
fn show_game(game_id: i32, database: Option<String>) -> Result<()> {
    let config = ServerConfig::load(None)?.with_overrides(None, None, database);
    init_tracing("warn");

    let service = GameService::new(open_repository(&config)?);
    let detail = service.game_detail(game_id)?;
    let game = detail.game.to_game()?;

    println!("Game {}: {}", game_id, game);
    println!("Status: {}", game.status());
    println!("{}", detail.render());
    for (index, record) in detail.moves.iter().enumerate() {
        let mv = record.to_move();
        if mv.comment.is_empty() {
            println!("{:>2}. {}", index + 1, mv);
        } else {
            println!("{:>2}. {} - {}", index + 1, mv, mv.comment);
        }
    }
    Ok(())
}
