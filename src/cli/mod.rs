use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod roles;
pub mod serve;

use test::TestKind;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "5000")]
        port: String,
    },
    /// Exercise the configured roles against the live model API
    Test {
        #[arg(long, value_enum, default_value = "all")]
        which: TestKind,

        /// Topic used for the conversation test
        #[arg(long, default_value = "AI in small business")]
        topic: String,
    },
    /// Print the role catalog
    Roles {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Test { which, topic }) => {
            test::run(which, &topic).await?;
        }
        Some(Command::Roles {}) => {
            roles::run()?;
        }
        None => {}
    }

    Ok(())
}
