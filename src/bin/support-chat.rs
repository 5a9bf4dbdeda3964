use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use support_relay::client::{ChatClient, DEFAULT_RELAY_URL};

#[derive(Parser)]
#[command(name = "support-chat")]
#[command(author, version, about = "Talk to a running support relay", long_about = None)]
struct Cli {
    /// Base URL of the relay
    #[arg(long, env = "SUPPORT_RELAY_URL", default_value = DEFAULT_RELAY_URL, global = true)]
    url: String,

    /// Abort a request that takes longer than this
    #[arg(long, default_value = "30", global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Send {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Probe the relay end to end and report latency and failures
    SelfTest,

    /// Check the relay's health endpoint
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ChatClient::new(&cli.url, Duration::from_secs(cli.timeout_secs))?;

    match cli.command {
        Commands::Send { text } => {
            let reply = client.submit(&text.join(" ")).await?;
            println!("{}", reply.message);
        }
        Commands::SelfTest => {
            let report = client.self_test().await;
            print!("{report}");
            if !report.is_healthy() {
                bail!("self-test failed");
            }
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("{} ({})", health.status, health.timestamp);
        }
    }

    Ok(())
}
