use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxcache::cli::setup::{setup, setup_at_path};
use fxcache::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxcache::AppCommand {
    fn from(cmd: Commands) -> fxcache::AppCommand {
        match cmd {
            Commands::Rates {
                base,
                search,
                refresh,
            } => fxcache::AppCommand::Rates {
                base,
                search,
                refresh,
            },
            Commands::Convert { query, refresh } => fxcache::AppCommand::Convert {
                query: query.join(" "),
                refresh,
            },
            Commands::Trend {
                from,
                to,
                base,
                refresh,
            } => fxcache::AppCommand::Trend {
                from,
                to,
                base,
                refresh,
            },
            Commands::News { currency, refresh } => fxcache::AppCommand::News { currency, refresh },
            Commands::Base { code } => fxcache::AppCommand::Base { code },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List latest rates against a base currency
    Rates {
        /// Base currency, defaults to the preferred base
        #[arg(short, long)]
        base: Option<String>,
        /// Filter by code or currency name
        #[arg(short, long)]
        search: Option<String>,
        /// Bypass the cache
        #[arg(short, long)]
        refresh: bool,
    },
    /// Convert an amount, e.g. `convert 100 USD to EUR`
    Convert {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Bypass the cache
        #[arg(short, long)]
        refresh: bool,
    },
    /// Show the seven day trend between two currencies
    Trend {
        from: String,
        to: String,
        /// Quote both rates against this currency
        #[arg(short, long)]
        base: Option<String>,
        /// Bypass the cache
        #[arg(short, long)]
        refresh: bool,
    },
    /// Show recent news for a currency
    News {
        currency: Option<String>,
        /// Bypass the cache
        #[arg(short, long)]
        refresh: bool,
    },
    /// Show or change the preferred base currency
    Base { code: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => setup_at_path(path),
            None => setup(),
        },
        Some(cmd) => fxcache::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
