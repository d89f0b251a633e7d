//! Vlow.AI simulator CLI
//!
//! Interactive terminal chat against the simulator. Lines starting with `/`
//! are commands, everything else is sent as a visitor message.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use vlow_simulator_core::sim::conversation::SimulatorListener;
use vlow_simulator_core::{
    ClientConfig, ConversationMessage, ReplyKind, Sender, SimError, SimulatorClient,
    SupabaseConfig,
};

/// Vlow.AI simulator CLI
#[derive(Parser, Debug)]
#[command(name = "vlow-cli")]
#[command(about = "Vlow.AI chat simulator - talk to the configured AI agent", long_about = None)]
struct Args {
    /// Supabase project URL; omit to run offline
    #[arg(long, env = "VLOW_SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = "VLOW_SUPABASE_ANON_KEY")]
    supabase_anon_key: Option<String>,

    /// Local storage database
    #[arg(long, env = "VLOW_DB_URL", default_value = "sqlite://vlow_local.db?mode=rwc")]
    db_url: String,

    /// Use this webhook instead of the one in site settings
    #[arg(long, env = "VLOW_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Delay before a canned reply, in milliseconds
    #[arg(long, default_value = "1500")]
    reply_delay_ms: u64,

    /// Log level (default: info,vlow_simulator_core=debug)
    #[arg(long, default_value = "info,vlow_simulator_core=debug")]
    log_level: String,
}

/// Log to stdout and to debug.log
fn init_logger(log_level: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins over --log-level
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .context("failed to open debug.log")?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 logging to console and debug.log");
    Ok(())
}

struct CliListener;

#[async_trait::async_trait]
impl SimulatorListener for CliListener {
    async fn on_message_appended(&self, message_json: String) {
        debug!("[CLI/Chat] 🆕 appended: {}", message_json);
    }

    async fn on_typing_changed(&self, typing: bool) {
        if typing {
            info!("[CLI/Chat] ⌨️ assistant is typing...");
        }
    }

    async fn on_rate_limit_reached(&self, identifier: String) {
        warn!("[CLI/Chat] 🚫 message limit reached for {}", identifier);
    }
}

fn supabase_config(args: &Args) -> Option<SupabaseConfig> {
    match (&args.supabase_url, &args.supabase_anon_key) {
        (Some(url), Some(key)) => Some(SupabaseConfig::new(url.clone(), key.clone())),
        (Some(_), None) | (None, Some(_)) => {
            warn!("[CLI] Supabase URL and anon key must both be set, running offline");
            None
        }
        (None, None) => None,
    }
}

fn print_bubble(message: &ConversationMessage, agent_name: &str) {
    let who = match message.sender {
        Sender::Visitor => "You",
        Sender::Assistant => agent_name,
    };
    println!("[{}] {}: {}", message.timestamp, who, message.text);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level)?;

    info!("[CLI] 🚀 Vlow.AI simulator");

    let mut config = ClientConfig::new(supabase_config(&args));
    config.local_db_url = args.db_url.clone();
    config.webhook_url_override = args.webhook_url.clone();
    config.simulated_reply_delay = Duration::from_millis(args.reply_delay_ms);

    let mut client = SimulatorClient::connect(config).await?;
    client.set_listener(Arc::new(CliListener));

    let agent = client.agent_config().await;
    info!(
        "[CLI] ✅ ready, agent: {}, webhook: {}",
        agent.display_name,
        agent.webhook_url.as_deref().unwrap_or("none (canned replies)")
    );
    for message in client.messages().await {
        print_bubble(&message, &agent.display_name);
    }
    println!("Commands: /prompt <text>, /name <text>, /history, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim_end();

        if line == "/quit" {
            break;
        }

        if line == "/history" {
            let name = client.agent_config().await.display_name;
            for message in client.messages().await {
                print_bubble(&message, &name);
            }
            continue;
        }

        if let Some(prompt) = line.strip_prefix("/prompt ") {
            let name = client.agent_config().await.display_name;
            match client.update_agent_config(prompt.trim(), None).await {
                Ok(()) => {
                    println!("System prompt saved, conversation restarted.");
                    for message in client.messages().await {
                        print_bubble(&message, &name);
                    }
                }
                Err(e) => error!("[CLI] saving prompt failed: {:#}", e),
            }
            continue;
        }

        if let Some(name) = line.strip_prefix("/name ") {
            let prompt = client.agent_config().await.system_prompt;
            match client.update_agent_config(&prompt, Some(name.trim())).await {
                Ok(()) => println!("Agent name set to {}, conversation restarted.", name.trim()),
                Err(e) => error!("[CLI] saving name failed: {:#}", e),
            }
            continue;
        }

        match client.send_message(line).await {
            Ok(outcome) => {
                let name = client.agent_config().await.display_name;
                print_bubble(&outcome.reply, &name);
                if outcome.kind == ReplyKind::RateLimited {
                    info!("[CLI] further messages will not reach the agent");
                }
            }
            Err(SimError::EmptyMessage) => {}
            Err(e) => error!("[CLI] send failed: {}", e),
        }
    }

    info!("[CLI] 👋 bye");
    Ok(())
}
