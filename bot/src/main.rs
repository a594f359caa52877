//! `VoiceChat` Bot - Main Entry Point

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

use vc_bot::cache::MemoryChannelCache;
use vc_bot::config::BotConfig;
use vc_bot::transport::HttpTransport;
use vc_bot::{telemetry, DmResolver};

#[derive(Debug, Parser)]
#[command(name = "vc-bot")]
#[command(about = "Kaiku Bot - Member moderation and direct messages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send a direct message to a user
    Dm {
        /// Recipient user ID (UUID)
        user_id: Uuid,

        /// Message text, joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env first so RUST_LOG from it applies
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = BotConfig::from_env()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        bot_id = %config.bot_user_id,
        api_url = %config.api_url,
        "Starting VoiceChat Bot"
    );

    match cli.command {
        Commands::Dm { user_id, message } => {
            let transport = Arc::new(HttpTransport::new(&config)?);
            let resolver = DmResolver::new(transport, MemoryChannelCache::new());

            let message = resolver.send_dm(user_id, &message.join(" ")).await?;
            info!(message_id = %message.id, channel_id = %message.channel_id, "Message delivered");
        }
    }

    Ok(())
}
