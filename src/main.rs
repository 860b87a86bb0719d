//! stock-agent CLI entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stock_agent::adapters::{cli::CliChannel, http::HttpChannel, Channel};
use stock_agent::agent::{AgentLoop, Context, OpenAiClient};
use stock_agent::config::{self, Config};
use stock_agent::ui;

#[derive(Parser)]
#[command(name = "stock-agent")]
#[command(about = "📦 Chat assistant that can check product stock")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.stock-agent/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a question from the terminal
    Ask {
        /// Message to send; omit for interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Create or update the config file interactively
    Onboard,

    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stock_agent=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Onboard => {
            config::onboard(&config_path)?;
        }

        Commands::Serve { port } => {
            let mut config = config::load_from(&config_path)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            let (agent, context) = build_agent(&config)?;

            ui::print_header("HTTP server");
            ui::print_step(&format!("Model: {}", config.llm.model));
            ui::print_step(&format!("Listening on http://{}", config.listen_addr()));

            let channel = HttpChannel::new(agent, context, config.listen_addr());
            channel.start().await?;
        }

        Commands::Ask { message } => {
            let config = config::load_from(&config_path)?;
            let (agent, context) = build_agent(&config)?;
            let channel = CliChannel::new(agent, context);

            if let Some(msg) = message {
                let response = channel.run_once(&msg).await?;
                println!("\n📦 {}", response.content);
            } else {
                println!("📦 Interactive mode (type 'exit' to quit)\n");
                channel.start().await?;
            }
        }

        Commands::Status => {
            let config = config::load_from(&config_path)?;
            ui::print_header("Status");
            println!("Config file: {:?}", config_path);
            println!("Endpoint: {}", config.llm.base_url);
            println!("Model: {}", config.llm.model);
            println!(
                "API key: {}",
                if config.llm.api_key.is_empty() { "not set" } else { "✓" }
            );
            println!("Listen: {}", config.listen_addr());
            println!(
                "Inventory: {:?} backend, {} seed records",
                config.inventory.backend,
                config.inventory.seed.len()
            );

            if let Err(e) = config.validate() {
                ui::print_warning(&e.to_string());
            }
        }
    }

    Ok(())
}

/// Open the inventory, register tools, and build the completion client.
fn build_agent(config: &Config) -> Result<(AgentLoop<OpenAiClient>, Context)> {
    if let Err(e) = config.validate() {
        ui::print_error(&e.to_string());
        return Err(e.into());
    }

    let store = stock_agent::inventory::open(&config.inventory)?;
    tracing::info!("Inventory ready with {} records", store.len()?);

    let context = Context::new(config, Arc::from(store));
    let client = OpenAiClient::new(&config.llm)?;
    Ok((AgentLoop::new(client), context))
}
