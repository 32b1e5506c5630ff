//! skycourier - drone delivery dispatch server.

use clap::Parser;
use color_eyre::eyre::Result;
use skycourier::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(cmd) => cmd.run().await,
        Command::Users(cmd) => cmd.run().await,
        Command::Drones(cmd) => cmd.run().await,
        Command::Tokens(cmd) => cmd.run().await,
    }
}
