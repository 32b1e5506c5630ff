//! cli subcommands for skycourier.
//!
//! - `skycourier serve` - run the dispatch server
//! - `skycourier users create|promote|list` - manage users
//! - `skycourier drones create|list` - manage the fleet
//! - `skycourier tokens issue` - mint a bearer token for a principal

mod drones;
mod serve;
mod tokens;
mod users;

pub use drones::DronesCommand;
pub use serve::ServeCommand;
pub use tokens::TokensCommand;
pub use users::UsersCommand;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;

use skycourier_db::SkycourierDb;
use skycourier_types::Config;

/// skycourier - drone delivery dispatch server
#[derive(Parser, Debug)]
#[command(name = "skycourier")]
#[command(about = "Drone delivery dispatch server", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// run the dispatch server
    Serve(ServeCommand),

    /// manage users
    #[command(subcommand)]
    Users(UsersCommand),

    /// manage drones
    #[command(subcommand)]
    Drones(DronesCommand),

    /// mint bearer tokens
    #[command(subcommand)]
    Tokens(TokensCommand),
}

/// shared database arguments for management subcommands.
#[derive(Args, Debug)]
pub struct DbArgs {
    /// sqlite database file path
    #[arg(long, env = "SKYCOURIER_DB_PATH")]
    db_path: Option<String>,
}

impl DbArgs {
    pub(crate) async fn connect(&self) -> Result<SkycourierDb> {
        use color_eyre::eyre::Context;
        let mut config = Config::default();
        if let Some(path) = &self.db_path {
            config.database.path = path.clone();
        }
        SkycourierDb::new(&config)
            .await
            .context("failed to connect to database")
    }
}
