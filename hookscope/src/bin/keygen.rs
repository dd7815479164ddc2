//! Hookscope Keygen - prints fresh `whsec_` webhook secrets.
//!
//! ```text
//! hookscope-keygen [--bytes 32] [-n 1]
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;

use hookscope::WebhookSecret;

const MIN_KEY_BYTES: usize = 24;
const MAX_KEY_BYTES: usize = 64;

#[derive(Debug, Parser)]
#[command(name = "hookscope-keygen", about = "Generate webhook signing secrets")]
struct Args {
    /// Key length in bytes (24-64)
    #[arg(long, default_value_t = 32)]
    bytes: usize,

    /// Number of keys to generate
    #[arg(short = 'n', default_value_t = 1)]
    count: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !(MIN_KEY_BYTES..=MAX_KEY_BYTES).contains(&args.bytes) {
        bail!(
            "key length must be between {} and {} bytes",
            MIN_KEY_BYTES,
            MAX_KEY_BYTES
        );
    }

    for _ in 0..args.count {
        let secret = WebhookSecret::generate(args.bytes).context("Failed to generate key")?;
        println!("{}", secret.to_base64_string());
    }

    Ok(())
}
