//! Hookscope Sender - posts a signed test webhook to a receiver.
//!
//! `--target NAME` reads `WEBHOOK_TARGET_<NAME>_URL` and
//! `WEBHOOK_TARGET_<NAME>_SECRET`; otherwise `WEBHOOK_TARGET_URL` and
//! `WEBHOOK_SECRET` are used. The event is wrapped as
//! `{"type": ..., "data": ...}` and the receiver's reply is printed.

use anyhow::{Context, Result};
use clap::Parser;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hookscope::{Target, WebhookClient};

#[derive(Debug, Parser)]
#[command(name = "hookscope-send", about = "Send a signed webhook")]
struct Args {
    /// Named target (e.g. GO, NEXTJS)
    #[arg(long)]
    target: Option<String>,

    /// Receiver endpoint; overrides the target's URL
    #[arg(long)]
    url: Option<String>,

    /// Message id; generated when omitted
    #[arg(long)]
    id: Option<String>,

    /// Event type
    #[arg(long = "type", default_value = "user.created")]
    event_type: String,

    /// Event data as a JSON document
    #[arg(long, default_value = "{}")]
    data: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    let args = Args::parse();

    let target = Target::from_env(args.target.as_deref(), args.url)?;

    let data: Value = serde_json::from_str(&args.data).context("--data is not valid JSON")?;
    let body = serde_json::to_vec(&json!({ "type": args.event_type, "data": data }))
        .context("Failed to serialize event")?;

    let msg_id = args.id.unwrap_or_else(generate_msg_id);

    info!(target_url = %target.url, webhook_id = %msg_id, "send_starting");
    let client = WebhookClient::new(target.url, &target.secret)?;
    let outcome = client.send(&msg_id, &body).await?;

    info!(webhook_id = %msg_id, status = outcome.status.as_u16(), "send_complete");
    println!("{} {}", outcome.status, outcome.body);

    Ok(())
}

fn generate_msg_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("msg_{}", suffix)
}
