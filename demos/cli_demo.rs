//! A small CLI that loads a CSV v1 flag file and repeatedly checks a
//! named flag against tags supplied as alternating `key value` pairs.
//!
//! ```text
//! cargo run --example cli_demo -- flags.csv my_flag host_name apibox_123
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use flagset::backend::csv_backend::CsvBackend;
use flagset::tag_args::AlternatingPairs;
use flagset::{Flagset, FlagsetOptions};

#[derive(Parser)]
struct Args {
    /// Path to a CSV v1 flag file (`name,rate` per row).
    flags_path: String,
    /// Name of the flag to evaluate.
    flag_name: String,
    /// Alternating key/value tag tokens, e.g. `host_name apibox_123`.
    tags: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let backend = Arc::new(CsvBackend::new(&args.flags_path));
    let flagset = Flagset::new(backend, FlagsetOptions::new());

    // give the immediate refresh a moment to land before the first query
    tokio::time::sleep(Duration::from_millis(50)).await;

    let tokens: Vec<&str> = args.tags.iter().map(String::as_str).collect();
    let enabled = flagset.enabled(&args.flag_name, AlternatingPairs(&tokens));
    println!("{} = {}", args.flag_name, enabled);

    flagset.close().await;
}
