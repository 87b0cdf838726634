//! Replay Example
//!
//! Feeds recorded gateway frames, one JSON object per line, through the qbot
//! event loop and logs what each handler receives.
//!
//! Blank lines and lines starting with `#` are skipped. Frames whose header
//! cannot be read are reported and skipped; everything else goes through the
//! dispatcher, so malformed bodies show up as decode failures in the summary.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package qbot-replay -- demos/replay/frames.jsonl
//! cat frames.jsonl | cargo run --package qbot-replay -- --concurrency 4
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use futures::{Stream, stream};
use qbot::prelude::*;
use qbot::runtime::ConfigLoader;
use qbot::runtime::config::validate_config;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Replay recorded gateway frames through the qbot dispatcher.
#[derive(Parser)]
#[command(name = "qbot-replay", version, about)]
struct Cli {
    /// File with one gateway frame per line; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Configuration file (defaults to `qbot.toml` in the current directory).
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Envelopes dispatched at the same time.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log envelopes that have no route.
    #[arg(long)]
    log_unhandled: bool,
}

// ============================================================================
// Handler Functions
// ============================================================================

async fn log_message(envelope: Arc<Envelope>, msg: Message) -> HandlerResult {
    let author = msg
        .author
        .as_ref()
        .map_or("unknown", |author| author.username.as_str());
    info!(
        event_type = %envelope.event_type,
        id = %msg.id,
        "{author}: {}",
        msg.content_without_mentions()
    );
    Ok(())
}

async fn log_deletion(envelope: Arc<Envelope>, deleted: MessageDelete) -> HandlerResult {
    info!(
        event_type = %envelope.event_type,
        id = %deleted.message.id,
        by_author = deleted.is_self_delete(),
        "Message deleted"
    );
    Ok(())
}

async fn log_member(envelope: Arc<Envelope>, member: Member) -> HandlerResult {
    info!(
        event_type = %envelope.event_type,
        guild = %member.guild_id,
        "Member {}",
        member.display_name()
    );
    Ok(())
}

async fn log_reaction(envelope: Arc<Envelope>, reaction: MessageReaction) -> HandlerResult {
    info!(
        event_type = %envelope.event_type,
        user = %reaction.user_id,
        target = ?reaction.target.kind(),
        emoji = %reaction.emoji.id,
        "Reaction"
    );
    Ok(())
}

async fn handle_interaction(envelope: Arc<Envelope>, interaction: Interaction) -> HandlerResult {
    let Some(button) = interaction.button_data() else {
        anyhow::bail!("interaction {} carries no button data", interaction.id);
    };
    info!(event_type = %envelope.event_type, %button, "Button pressed");
    Ok(())
}

async fn log_unrouted(envelope: Arc<Envelope>, frame: Arc<[u8]>) -> HandlerResult {
    info!(
        op = %envelope.op,
        event_type = %envelope.event_type,
        bytes = frame.len(),
        "Frame without a typed handler"
    );
    Ok(())
}

fn build_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .on_message(log_message)
        .on_at_message(log_message)
        .on_direct_message(log_message)
        .on_c2c_message(log_message)
        .on_group_at_message(log_message)
        .on_message_delete(log_deletion)
        .on_public_message_delete(log_deletion)
        .on_direct_message_delete(log_deletion)
        .on_guild_member(log_member)
        .on_message_reaction(log_reaction)
        .on_interaction(handle_interaction)
        .on_plain(log_unrouted);
    registry
}

// ============================================================================
// Frame Source
// ============================================================================

/// Turns a line-oriented reader into a stream of envelopes.
fn read_envelopes<R>(reader: R) -> impl Stream<Item = Envelope>
where
    R: AsyncBufRead + Unpin,
{
    stream::unfold((reader.lines(), 0usize), |(mut lines, mut line_no)| async move {
        loop {
            line_no += 1;
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let frame = line.trim();
                    if frame.is_empty() || frame.starts_with('#') {
                        continue;
                    }
                    match Envelope::from_frame(frame.as_bytes().to_vec()) {
                        Ok(envelope) => return Some((envelope, (lines, line_no))),
                        Err(e) => warn!(line = line_no, error = %e, "Skipping unreadable frame"),
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    error!(line = line_no, error = %e, "Failed to read input");
                    return None;
                }
            }
        }
    })
}

async fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new().with_current_dir();
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    let mut config = loader.load()?;
    if let Some(concurrency) = cli.concurrency {
        config.dispatch.concurrency = concurrency;
    }
    config.dispatch.log_unhandled |= cli.log_unhandled;
    validate_config(&config)?;

    let runtime = QbotRuntime::from_config(config);
    let input = open_input(cli.input.as_ref()).await?;

    let stats = runtime
        .run(build_registry(), read_envelopes(input))
        .await?;

    info!(%stats, "Replay finished");
    if stats.failures() > 0 {
        warn!(failures = stats.failures(), "Some envelopes failed");
    }
    Ok(())
}
