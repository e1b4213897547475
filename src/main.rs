//! Coin Ledger CLI
//!
//! Command-line interface for operating a coin ledger stored in SQLite.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- register alice
//! cargo run -- --as <ACCOUNT_ID> create-coin "Team Coin" TC
//! cargo run -- --as <ACCOUNT_ID> issue <COIN_ID> <ACCOUNT_ID> 100
//! cargo run -- --as <ACCOUNT_ID> send <COIN_ID> <ACCOUNT_ID> 5 --message lunch
//! cargo run -- --as <ACCOUNT_ID> send --charge <COIN_ID> <ACCOUNT_ID> 5
//! cargo run -- --as <ACCOUNT_ID> transactions --cursor 42
//! ```
//!
//! Results are written to stdout as CSV; logs go to stderr and are filtered
//! with `RUST_LOG` (default `coin_ledger=info`). A paged listing with more
//! rows ends with a blank line and a `next_cursor` block.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (unknown user, insufficient funds, database not reachable, etc.)

use coin_ledger::cli;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coin_ledger=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let mut output = std::io::stdout();
    if let Err(e) = cli::run(args, &mut output).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
