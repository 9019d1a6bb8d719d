use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Project metadata and Python virtualenv helper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the installed version
    Version {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show derived project metadata (owner/repo, requirements, python)
    Info {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Provision the project venv and install requirements
    Venv {
        /// Delete existing environment contents before creation
        #[arg(long)]
        clear: bool,

        /// Upgrade already-installed packages
        #[arg(short, long)]
        upgrade: bool,

        /// Install with the base interpreter instead of the venv
        #[arg(long, conflicts_with = "clear")]
        site: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version { json } => {
            commands::version::execute(json)?;
        }
        Commands::Info { json } => {
            commands::info::execute(json)?;
        }
        Commands::Venv {
            clear,
            upgrade,
            site,
        } => {
            commands::venv::execute(clear, upgrade, site)?;
        }
    }

    Ok(())
}
