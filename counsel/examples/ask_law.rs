//! Ask a legal question and print the answer as it streams.
//!
//! Run with:
//! ```bash
//! COUNSEL_API_BASE=http://localhost:8000 RUST_LOG=counsel=debug \
//!     cargo run --example ask_law -- "What is the legal marriage age?" nepal
//! ```

use counsel::prelude::*;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let question = args
        .next()
        .unwrap_or_else(|| "What are tenant rights when a lease ends early?".to_string());
    let jurisdiction = args.next();

    let client = CounselClient::from_env()?;
    tracing::info!(base_url = %client.config().base_url, "Connecting");

    if let Ok(health) = client.health().await {
        tracing::debug!(%health, "Backend health");
    }

    println!("Q: {question}\n");
    let mut sources = Vec::new();
    let mut failure = None;
    let outcome = client
        .ask_law_question(
            question,
            jurisdiction,
            None,
            StreamCallbacks::new()
                .on_metadata(|meta| sources = meta.sources())
                .on_content(|fragment| {
                    print!("{fragment}");
                    let _ = io::stdout().flush();
                })
                .on_error(|message| failure = Some(message)),
        )
        .await?;
    println!("\n");

    if let Some(message) = failure {
        anyhow::bail!("server reported an error: {message}");
    }
    if !sources.is_empty() {
        println!("Sources:");
        for source in &sources {
            println!("  - {source}");
        }
    }
    tracing::info!(?outcome, "Done");
    Ok(())
}
