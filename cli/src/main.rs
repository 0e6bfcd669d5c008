mod cli_interface;
mod commands;
mod console;

use clap::Parser;

use crate::cli_interface::{Commands, CLI};

#[tokio::main]
async fn main() {
    let cli = CLI::parse();

    match cli.command {
        Commands::Run { env_file } => commands::run::run(env_file).await,
    }
}
