use clap::{Parser, Subcommand};
use shipquote::pricing::{Destination, ShippingType, WeightTier};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shipquote", version, about = "Shipping quotation service")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the quotation server in the foreground (default)
    Start,

    /// Test configuration file and rate table validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Compute a one-shot price estimate
    Estimate(EstimateArgs),

    /// Print the active rate table
    Rates {
        /// Rate table file to print instead of the configured one
        #[arg(short, long)]
        rates: Option<PathBuf>,
    },

    /// Hash an admin password for `admin.password_hash`
    HashPassword {
        /// Password to hash (read from stdin when omitted)
        password: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EstimateArgs {
    /// Shipping method: postal or fast
    #[arg(short = 't', long)]
    pub shipping_type: ShippingType,

    /// Destination zone: "SWITZERLAND", "EU COUNTRIES", "USA, CANADA" or "OTHER COUNTRIES"
    #[arg(short, long)]
    pub destination: Destination,

    /// Weight tier: 1, 2, 5 or ">5"
    #[arg(short, long)]
    pub weight: WeightTier,

    /// Declared invoice value
    #[arg(short, long)]
    pub invoice_value: Option<f64>,

    /// Leave out the insurance line
    #[arg(long)]
    pub no_insurance: bool,

    /// Leave out the packaging line
    #[arg(long)]
    pub no_packaging: bool,

    /// Leave out the customs declaration line
    #[arg(long)]
    pub no_custom_declaration: bool,

    /// Leave out the forwarding line
    #[arg(long)]
    pub no_forwarding: bool,

    /// Rate table file to use instead of the configured one
    #[arg(short, long)]
    pub rates: Option<PathBuf>,

    /// Print the estimate as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}
