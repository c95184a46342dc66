use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gita_chat::constants;
use gita_chat::logging::{self, LogTarget};
use gita_chat::repl::{self, format_reply};
use gita_chat::{tui, QueryClient};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the Q&A backend.
    #[arg(long, global = true, env = "GITA_API_URL", default_value_t = constants::GITA_API_URL.clone())]
    url: String,

    /// Directory for session log files.
    #[arg(long, global = true, env = "GITA_LOG_DIR", default_value_t = constants::GITA_LOG_DIR.clone())]
    log_dir: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Open the full-screen chat (the default).
    Tui,
    /// Chat line by line on stdin/stdout.
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        #[arg(help = "The question to send.")]
        query: String,
    },
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GITA_API_URL and friends)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    let target = match command {
        Commands::Tui => LogTarget::FileOnly,
        Commands::Chat | Commands::Ask { .. } => LogTarget::FileAndStderr,
    };
    let _guard = logging::init(&PathBuf::from(&cli.log_dir), target)
        .context("Failed to initialise logging")?;

    info!("gita-chat starting with command: {:?}", command);
    let client = QueryClient::new(&cli.url);

    match command {
        Commands::Tui => {
            tui::run(client).await.context("Terminal UI failed")?;
        }
        Commands::Chat => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run_chat(&client, stdin, tokio::io::stdout())
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask { query } => {
            let query = query.trim();
            if query.is_empty() {
                anyhow::bail!("The question is empty");
            }
            let message = client.send(query).await.into_message();
            print!("{}", format_reply(&message));
        }
    }

    info!("gita-chat finished");
    Ok(())
}
