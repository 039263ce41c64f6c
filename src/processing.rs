// WHY: per-record pipeline plus the batch fan-out used by the CLI
// Records are independent, so the core runs on worker threads while writes stay serialized

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::isnad::{normalize_arabic, normalize_english, BoundaryRule, ChainSegmenter, Segmentation};
use crate::store::{HadithRecord, RecordKey};

/// Configuration for the processing phase
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Number of worker tasks running the segmenter
    pub workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
        }
    }
}

/// Output fields of one record, ready for write-back
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub key: RecordKey,
    pub text: String,
    pub text_en: String,
    /// Mirrors `text_en`; English text is not split
    pub body_en: String,
    pub segmentation: Segmentation,
}

/// Normalize and segment a single record
pub fn process_record(segmenter: &ChainSegmenter, record: &HadithRecord) -> ProcessedRecord {
    let text_en = normalize_english(record.text_en.as_deref().unwrap_or(""));
    let text = normalize_arabic(record.text.as_deref().unwrap_or(""));
    let segmentation = segmenter.segment_normalized(&text);

    debug!(
        "Segmented {}: {} chain words, {} body words ({:?})",
        record.key,
        segmentation.chain.split_whitespace().count(),
        segmentation.body.split_whitespace().count(),
        segmentation.rule
    );

    ProcessedRecord {
        key: record.key.clone(),
        text,
        body_en: text_en.clone(),
        text_en,
        segmentation,
    }
}

/// Segment records on a blocking worker pool, preserving retrieval order
///
/// Records are split into one contiguous chunk per worker and reassembled
/// in the original order.
pub async fn process_records_parallel(
    segmenter: Arc<ChainSegmenter>,
    records: Vec<HadithRecord>,
    config: &ProcessingConfig,
    progress: Option<ProgressBar>,
) -> Result<Vec<ProcessedRecord>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let workers = config.workers.max(1);
    let chunk_size = records.len().div_ceil(workers);
    info!(
        "Segmenting {} records with {} workers (chunk size {})",
        records.len(),
        workers,
        chunk_size
    );

    let mut tasks = Vec::with_capacity(workers);
    let mut remaining = records;
    while !remaining.is_empty() {
        let rest = remaining.split_off(chunk_size.min(remaining.len()));
        let chunk = std::mem::replace(&mut remaining, rest);
        let segmenter = Arc::clone(&segmenter);
        let progress = progress.clone();

        tasks.push(tokio::task::spawn_blocking(move || {
            chunk
                .iter()
                .map(|record| {
                    let processed = process_record(&segmenter, record);
                    if let Some(ref bar) = progress {
                        bar.inc(1);
                    }
                    processed
                })
                .collect::<Vec<_>>()
        }));
    }

    let chunks = futures::future::try_join_all(tasks)
        .await
        .context("Segmentation worker panicked")?;

    Ok(chunks.into_iter().flatten().collect())
}

/// Per-rule tallies for one run
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCounts {
    pub explicit_subject: u64,
    pub narrator_free_segment: u64,
    pub last_segment_fallback: u64,
    pub no_segments: u64,
}

impl RuleCounts {
    pub fn record(&mut self, rule: BoundaryRule) {
        match rule {
            BoundaryRule::ExplicitSubject => self.explicit_subject += 1,
            BoundaryRule::NarratorFreeSegment => self.narrator_free_segment += 1,
            BoundaryRule::LastSegmentFallback => self.last_segment_fallback += 1,
            BoundaryRule::NoSegments => self.no_segments += 1,
        }
    }
}

/// Statistics for one batch run, written as JSON
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    /// Seconds since the Unix epoch when the run started
    pub run_start: u64,
    pub records_fetched: u64,
    pub records_segmented: u64,
    pub records_with_chain: u64,
    pub records_updated: u64,
    pub rule_counts: RuleCounts,
    pub processing_time_ms: u64,
    pub records_per_sec: f64,
    pub dry_run: bool,
}

impl RunStats {
    /// Tally segmentation outcomes of a processed batch
    pub fn from_processed(processed: &[ProcessedRecord]) -> Self {
        let mut stats = Self {
            records_segmented: processed.len() as u64,
            ..Default::default()
        };
        for record in processed {
            stats.rule_counts.record(record.segmentation.rule);
            if record.segmentation.has_chain() {
                stats.records_with_chain += 1;
            }
        }
        stats
    }

    /// Fill timing fields from the elapsed processing time
    pub fn finish(&mut self, elapsed: std::time::Duration) {
        self.processing_time_ms = elapsed.as_millis() as u64;
        let secs = elapsed.as_secs_f64();
        self.records_per_sec = if secs > 0.0 {
            self.records_segmented as f64 / secs
        } else {
            0.0
        };
    }
}

/// Write run statistics as pretty JSON
pub async fn write_stats(path: &Path, stats: &RunStats) -> Result<()> {
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create stats file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let json = serde_json::to_string_pretty(stats)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    info!("Wrote run stats to {}", path.display());
    Ok(())
}
