//! Command-line interface for the tic-tac-toe server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe - two-player game server with a JSON API
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Tic-tac-toe game server backed by SQLite", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply migrations and run the HTTP server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file (created if it doesn't exist)
        #[arg(long)]
        database: Option<String>,
    },

    /// Apply pending database migrations
    Migrate {
        /// Path to the database file
        #[arg(long)]
        database: Option<String>,
    },

    /// Register a user, or print the existing one with that name
    AddUser {
        /// Name to register
        username: String,

        /// Path to the database file
        #[arg(long)]
        database: Option<String>,
    },

    /// Print a game's status and board
    Show {
        /// Game to show
        game_id: i32,

        /// Path to the database file
        #[arg(long)]
        database: Option<String>,
    },
}
