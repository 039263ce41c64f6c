// WHY: inspect chain/body heuristics on ad-hoc text without a database
// Reads one narration per line and prints one JSON object per line

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use isnad_split::{normalize_arabic, BoundaryRule, BoundaryRules, ChainSegmenter};

#[derive(Parser, Debug)]
#[command(name = "segment-text")]
#[command(about = "Split Arabic narrations (one per line) into chain and body as JSON lines")]
struct Args {
    /// Input file; reads stdin when omitted
    input: Option<PathBuf>,

    /// Word count a narrator-free segment must exceed to start the body
    #[arg(long, default_value_t = 7)]
    min_body_words: usize,
}

#[derive(Serialize)]
struct SegmentedLine<'a> {
    line: usize,
    text: &'a str,
    chain: &'a str,
    body: &'a str,
    rule: BoundaryRule,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let rules = BoundaryRules {
        min_body_words: args.min_body_words,
        ..Default::default()
    };
    let segmenter = ChainSegmenter::new(rules)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(io::BufReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let mut count = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        let text = normalize_arabic(&line);
        let segmentation = segmenter.segment_normalized(&text);

        let output = SegmentedLine {
            line: index + 1,
            text: &text,
            chain: &segmentation.chain,
            body: &segmentation.body,
            rule: segmentation.rule,
        };
        serde_json::to_writer(&mut writer, &output)?;
        writer.write_all(b"\n")?;
        count += 1;
    }

    writer.flush()?;
    info!("Segmented {} lines", count);
    Ok(())
}
