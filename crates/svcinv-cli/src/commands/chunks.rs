//! Chunks command - print the retrieval chunks for invoice files.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{info, warn};

use svcinv_core::chunk::{chunks_for_record, Chunk};
use svcinv_core::invoice::ServiceInvoiceParser;
use svcinv_core::models::record::Classification;
use svcinv_core::rag::extract_batch;

use super::{expand_inputs, load_config, read_document};

/// Arguments for the chunks command.
#[derive(Args)]
pub struct ChunksArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    format: ChunkFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ChunkFormat {
    /// One JSON object per line
    Jsonl,
    /// A single JSON array
    Json,
    /// Chunk texts separated by rules
    Text,
}

pub fn run(args: ChunksArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let files = expand_inputs(&args.input)?;

    let documents: Vec<(String, String)> = files
        .iter()
        .map(|path| read_document(path, &config))
        .map(|doc| (doc.document_id, doc.text))
        .collect();

    let parser = ServiceInvoiceParser::from_config(&config.extraction);
    let results = extract_batch(&parser, &documents);

    let mut chunks: Vec<Chunk> = Vec::new();
    for result in &results {
        let record = &result.record;
        let document_id = record.document_id.as_deref().unwrap_or_default();
        match record.classification {
            Classification::Complete => chunks.extend(chunks_for_record(record)),
            Classification::HeaderOnly => info!("Skipping header-only document {}", document_id),
            Classification::Failed => warn!(
                "Skipping {}: {}",
                document_id,
                record
                    .failure
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            ),
        }
    }

    let output = format_chunks(&chunks, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Wrote {} chunks to {}",
            style("✓").green(),
            chunks.len(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn format_chunks(chunks: &[Chunk], format: ChunkFormat) -> anyhow::Result<String> {
    match format {
        ChunkFormat::Jsonl => {
            let mut output = String::new();
            for chunk in chunks {
                output.push_str(&serde_json::to_string(chunk)?);
                output.push('\n');
            }
            Ok(output)
        }
        ChunkFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(chunks)?)),
        ChunkFormat::Text => {
            let mut output = String::new();
            for (i, chunk) in chunks.iter().enumerate() {
                if i > 0 {
                    output.push_str("\n---\n\n");
                }
                output.push_str(&format!("[{}]\n{}\n", chunk.id, chunk.text));
            }
            Ok(output)
        }
    }
}
