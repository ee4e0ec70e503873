//! Batch processing command for multiple invoice files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use svcinv_core::invoice::{ExtractionResult, ServiceInvoiceParser};
use svcinv_core::models::record::Classification;
use svcinv_core::rag::extract_batch;

use super::process::{format_record, OutputFormat};
use super::{expand_inputs, load_config, read_document, SourceDocument};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file records
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (default: one per CPU)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

/// One processed input file.
struct BatchItem {
    path: PathBuf,
    result: ExtractionResult,
    /// Text source error, if the file could not be read.
    source_error: Option<String>,
}

impl BatchItem {
    fn error(&self) -> Option<String> {
        self.source_error
            .clone()
            .or_else(|| self.result.record.failure.map(|f| f.to_string()))
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.input)?;

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut sources: Vec<SourceDocument> = Vec::with_capacity(files.len());
    for path in &files {
        sources.push(read_document(path, &config));
        pb.inc(1);
    }
    pb.finish_with_message("Read");

    let documents: Vec<(String, String)> = sources
        .iter()
        .map(|s| (s.document_id.clone(), s.text.clone()))
        .collect();

    let parser = ServiceInvoiceParser::from_config(&config.extraction);
    let results = match args.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()?
            .install(|| extract_batch(&parser, &documents)),
        None => extract_batch(&parser, &documents),
    };

    let items: Vec<BatchItem> = sources
        .into_iter()
        .zip(results)
        .map(|(source, result)| BatchItem {
            path: source.path,
            result,
            source_error: source.error,
        })
        .collect();

    if let Some(output_dir) = &args.output_dir {
        let paths: Vec<&Path> = items.iter().map(|i| i.path.as_path()).collect();
        let names = output_names(&paths, args.format.extension());

        for (item, name) in items.iter().zip(names) {
            let output_path = output_dir.join(name);
            fs::write(&output_path, format_record(&item.result.record, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &items)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let count = |c: Classification| {
        items
            .iter()
            .filter(|i| i.result.record.classification == c)
            .count()
    };
    let failed: Vec<&BatchItem> = items
        .iter()
        .filter(|i| i.result.record.classification == Classification::Failed)
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        items.len(),
        start.elapsed()
    );
    println!(
        "   {} complete, {} header-only, {} failed",
        style(count(Classification::Complete)).green(),
        style(count(Classification::HeaderOnly)).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for item in &failed {
            let reason = item.error().unwrap_or_else(|| "unknown error".to_string());
            warn!("Failed to structure {}: {}", item.path.display(), reason);
            println!("  - {}: {}", item.path.display(), reason);
        }
    }

    Ok(())
}

/// Output file names for `paths`: the input file name plus `extension`, so
/// `inv.pdf` and `inv.txt` stay apart. Inputs sharing a file name get a
/// numeric suffix.
fn output_names(paths: &[&Path], extension: &str) -> Vec<String> {
    let mut used: BTreeSet<String> = BTreeSet::new();

    paths
        .iter()
        .map(|path| {
            let base = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");
            let mut name = format!("{}.{}", base, extension);
            let mut n = 1;
            while !used.insert(name.clone()) {
                n += 1;
                name = format!("{}-{}.{}", base, n, extension);
            }
            if n > 1 {
                warn!(
                    "Output for {} written as {} to avoid overwriting",
                    path.display(),
                    name
                );
            }
            name
        })
        .collect()
}

fn write_summary(path: &Path, items: &[BatchItem]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "classification",
        "invoice_id",
        "date",
        "customer",
        "vehicle",
        "entries",
        "processing_time_ms",
        "error",
    ])?;

    for item in items {
        let filename = item.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let record = &item.result.record;
        let header = &record.header;
        let vehicle = header.vehicle.describe();
        let entries = record.services.len().to_string();
        let elapsed = item.result.processing_time_ms.to_string();
        let error = item.error().unwrap_or_default();

        wtr.write_record([
            filename,
            record.classification.as_str(),
            header.invoice_id.as_deref().unwrap_or_default(),
            header.date.as_deref().unwrap_or_default(),
            header.customer.name.as_deref().unwrap_or_default(),
            vehicle.as_str(),
            entries.as_str(),
            elapsed.as_str(),
            error.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
