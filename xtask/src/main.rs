//! See <https://github.com/matklad/cargo-xtask/>
//!
//! This binary defines various auxiliary build commands, which are not
//! expressible with just `cargo`.

use clap::Parser;

mod dynamodb;
mod prelude;

/// Development tasks for the feedrecords repository
#[derive(Debug, Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for feedrecords", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.silent
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Manage the DynamoDB records table
    Dynamodb(dynamodb::DynamodbCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dynamodb(cmd) => dynamodb::run(cmd, cli.global).await?,
    }

    Ok(())
}
