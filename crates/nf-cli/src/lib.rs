//! NiFi CLI library

pub mod connection;
pub mod flow;
pub mod list;
pub mod output;
pub mod setup;
pub mod version;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub use connection::ConnectionArgs;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nifi-cli")]
#[command(about = "Thin command-line client for the NiFi REST API")]
#[command(version, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that NiFi is ready and the credentials are accepted
    Setup(setup::SetupArgs),
    /// Create a GenerateFlowFile -> LogAttribute sample flow
    CreateFlow(flow::CreateFlowArgs),
    /// Start every processor in a process group
    StartFlow(flow::RunFlowArgs),
    /// Stop every processor in a process group
    StopFlow(flow::RunFlowArgs),
    /// List processors with their state
    List(list::ListArgs),
    /// Print the NiFi server version
    Version(version::VersionArgs),
}

impl Commands {
    pub async fn run(self, connection: &ConnectionArgs) -> Result<()> {
        let client = connection.connect()?;
        match self {
            Commands::Setup(args) => args.run(&client).await,
            Commands::CreateFlow(args) => args.run(&client).await,
            Commands::StartFlow(args) => args.start(&client).await,
            Commands::StopFlow(args) => args.stop(&client).await,
            Commands::List(args) => args.run(&client).await,
            Commands::Version(args) => args.run(&client).await,
        }
    }
}

/// Map `-v` repetitions to a default filter directive
pub fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the verbosity flag
pub fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
