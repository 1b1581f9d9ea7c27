use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xrate::core::log::init_logging;

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

impl From<Commands> for xrate::AppCommand {
    fn from(cmd: Commands) -> xrate::AppCommand {
        match cmd {
            Commands::Best {
                from,
                to,
                currencies,
            } => xrate::AppCommand::Best {
                from,
                to,
                currencies,
            },
            Commands::Paths {
                from,
                to,
                currencies,
            } => xrate::AppCommand::Paths {
                from,
                to,
                currencies,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Find the best direct and multi-hop conversion across exchanges
    Best {
        /// Currency to convert from
        from: String,
        /// Currency to convert into
        to: String,
        /// Extra currency to route through (repeatable)
        #[arg(long = "currency")]
        currencies: Vec<String>,
    },
    /// List every multi-hop conversion path
    Paths {
        /// Currency to convert from
        from: String,
        /// Currency to convert into
        to: String,
        /// Extra currency to route through (repeatable)
        #[arg(long = "currency")]
        currencies: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => xrate::cli::setup::setup_at_path(path),
            None => xrate::cli::setup::setup(),
        },
        Some(cmd) => xrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
