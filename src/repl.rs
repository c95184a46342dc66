// Line-oriented chat for terminals without a full-screen UI.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::app_state::Message;
use crate::constants;
use crate::query_client::QueryClient;

const PROMPT: &str = "\nAsk a question (or type 'exit' to quit): ";

pub async fn run_chat<R, W>(client: &QueryClient, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(endpoint = client.endpoint(), "Starting line chat");
    let rule = "=".repeat(60);
    output
        .write_all(
            format!(
                "\n{rule}\nWelcome to the {}\nAsk questions about the Bhagavad Gita and get answers\n{rule}\n",
                constants::APP_TITLE
            )
            .as_bytes(),
        )
        .await?;

    let mut lines = input.lines();
    let mut last_answer: Option<String> = None;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let elaborating = line.eq_ignore_ascii_case("explain more") && last_answer.is_some();
        let query = match &last_answer {
            Some(answer) if elaborating => {
                info!("User requested elaboration on previous response");
                format!("{}{}", constants::EXPLAIN_PREFIX, answer)
            }
            _ => line.to_string(),
        };

        let outcome = client.send(&query).await;
        let answered = outcome.is_answer();
        let message = outcome.into_message();
        output.write_all(format_reply(&message).as_bytes()).await?;

        // An elaboration keeps the original answer as the one to expand on
        if answered && !elaborating {
            last_answer = Some(message.content);
            output
                .write_all(b"\nType 'explain more' if you want a more detailed explanation.\n")
                .await?;
        }
    }

    output.write_all(b"\n").await?;
    output.flush().await?;
    info!("Line chat finished");
    Ok(())
}

/// Plain-text rendering of a bot message, details always expanded.
pub fn format_reply(message: &Message) -> String {
    let mut out = String::from("\n");
    if message.is_fallback {
        out.push_str(&format!("[{}]\n", constants::FALLBACK_LABEL));
    }
    out.push_str(&message.content);
    out.push('\n');

    if !message.tools_used.is_empty() {
        out.push_str("\nTools Used:\n");
        for tool in &message.tools_used {
            out.push_str(&format!("  - {}\n", tool.display()));
        }
    }
    if !message.references.is_empty() {
        out.push_str("\nReferences:\n");
        for reference in &message.references {
            out.push_str(&format!("  - {}\n", reference));
        }
    }
    out
}
