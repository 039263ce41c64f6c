use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;

use isnad_split::processing::{self, ProcessingConfig, RunStats};
use isnad_split::store::{HadithStore, StoreConfig};
use isnad_split::ChainSegmenter;

#[derive(Parser, Debug)]
#[command(name = "isnad-split")]
#[command(about = "Normalize hadith records and split each text into narrator chain and body")]
#[command(version)]
struct Args {
    /// SQLite database holding the `hadiths` table
    #[arg(default_value = "data/hadiths.db")]
    db_path: PathBuf,

    /// Number of records per batch
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Process every selected record instead of one batch
    #[arg(long, conflicts_with = "limit")]
    all: bool,

    /// Also process records without an English chain
    #[arg(long)]
    include_missing_english_chain: bool,

    /// Only select records whose chain has not been written yet
    #[arg(long)]
    unprocessed_only: bool,

    /// Roll back all updates at the end of the run
    #[arg(long)]
    dry_run: bool,

    /// Worker tasks for segmentation (defaults to CPU count)
    #[arg(long)]
    workers: Option<usize>,

    /// Abort on first malformed record
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting isnad-split");
    info!(?args, "Parsed CLI arguments");

    let run_start = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let store_config = StoreConfig {
        limit: if args.all { None } else { Some(args.limit) },
        require_english_chain: !args.include_missing_english_chain,
        unprocessed_only: args.unprocessed_only,
        dry_run: args.dry_run,
    };
    let mut store = HadithStore::open(&args.db_path, store_config)?;

    let processing_config = ProcessingConfig {
        workers: args.workers.unwrap_or_else(|| ProcessingConfig::default().workers),
    };
    let segmenter = Arc::new(ChainSegmenter::with_default_rules()?);

    println!("Processing: split hadith chain and body");

    let records = store.fetch_batch(args.fail_fast)?;
    let records_fetched = records.len() as u64;

    let progress = if args.no_progress {
        None
    } else {
        let bar = ProgressBar::new(records_fetched);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} records")?,
        );
        Some(bar)
    };

    let start = Instant::now();
    let processed = processing::process_records_parallel(
        segmenter,
        records,
        &processing_config,
        progress.clone(),
    )
    .await?;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let mut stats = RunStats::from_processed(&processed);
    stats.finish(start.elapsed());
    stats.run_start = run_start;
    stats.records_fetched = records_fetched;
    stats.dry_run = args.dry_run;

    stats.records_updated = store.apply_updates(&processed)? as u64;

    processing::write_stats(&args.stats_out, &stats).await?;

    println!("Segmentation complete:");
    println!("  Records fetched: {}", stats.records_fetched);
    println!("  Chains detected: {}", stats.records_with_chain);
    if args.dry_run {
        println!("  Records that would be updated: {} (dry run)", stats.records_updated);
    } else {
        println!("  Records updated: {}", stats.records_updated);
    }

    info!(
        "Run completed: {} fetched, {} with chain, {} updated",
        stats.records_fetched, stats.records_with_chain, stats.records_updated
    );

    Ok(())
}
