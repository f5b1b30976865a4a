use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use shipquote::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();
    let command = args.get_command();

    // The server initializes tracing from its configuration; one-shot
    // commands keep stdout for their own output
    if !matches!(command, cli::Commands::Start) {
        init_tracing("warn", "pretty");
    }

    // Dispatch to appropriate command handler
    match command {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Estimate(estimate_args) => {
            commands::estimate::execute(&args.config, estimate_args)?;
        }
        cli::Commands::Rates { rates } => {
            commands::rates::execute(&args.config, rates.as_deref())?;
        }
        cli::Commands::HashPassword { password } => {
            commands::hash_password::execute(password)?;
        }
        cli::Commands::Version => {
            println!("shipquote v{}", env!("CARGO_PKG_VERSION"));
            println!("Rust {}", env!("CARGO_PKG_RUST_VERSION"));
        }
    }

    Ok(())
}
