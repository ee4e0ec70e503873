//! Process command - structure a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use svcinv_core::invoice::{InvoiceParser, ServiceInvoiceParser};
use svcinv_core::models::record::{Classification, InvoiceRecord};

use super::{load_config, read_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per service entry
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Reading document...");

    let document = read_document(&args.input, &config);
    if let Some(error) = &document.error {
        pb.finish_and_clear();
        anyhow::bail!("Could not read {}: {}", args.input.display(), error);
    }

    pb.set_message("Extracting invoice data...");
    let parser = ServiceInvoiceParser::from_config(&config.extraction);
    let result = parser.parse(&document.document_id, &document.text);
    pb.finish_and_clear();

    let record = &result.record;
    let output = format_record(record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    match record.classification {
        Classification::Complete => {}
        Classification::HeaderOnly => eprintln!(
            "{} {} has no service entries",
            style("ℹ").blue(),
            document.document_id
        ),
        Classification::Failed => eprintln!(
            "{} {} could not be structured: {}",
            style("✗").red(),
            document.document_id,
            record
                .failure
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        ),
    }

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    debug!(
        "Total processing time: {:?} (extraction {}ms)",
        start.elapsed(),
        result.processing_time_ms
    );

    Ok(())
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let header = &record.header;
    let vehicle = &header.vehicle;

    wtr.write_record([
        "invoice_id",
        "date",
        "customer",
        "vehicle",
        "vin",
        "mileage",
        "entry",
        "complaint",
        "cause",
        "correction",
        "labor_hours",
        "labor_rate",
        "parts",
    ])?;

    for (i, entry) in record.services.iter().enumerate() {
        let labor = entry.labor.as_ref();
        let row: Vec<String> = vec![
            header.invoice_id.clone().unwrap_or_default(),
            header.date.clone().unwrap_or_default(),
            header.customer.name.clone().unwrap_or_default(),
            vehicle.describe(),
            vehicle.vin.clone().unwrap_or_default(),
            vehicle.mileage.map(|m| m.to_string()).unwrap_or_default(),
            (i + 1).to_string(),
            entry.complaint.clone().unwrap_or_default(),
            entry.cause.clone().unwrap_or_default(),
            entry.correction.clone().unwrap_or_default(),
            labor.map(|l| l.hours.to_string()).unwrap_or_default(),
            labor
                .and_then(|l| l.rate)
                .map(|r| r.to_string())
                .unwrap_or_default(),
            entry.parts.join("; "),
        ];
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let header = &record.header;
    let vehicle = &header.vehicle;
    let mut output = String::new();

    output.push_str(&format!(
        "Invoice: {}\n",
        header.invoice_id.as_deref().unwrap_or("-")
    ));
    match header.parsed_date() {
        Some(date) => output.push_str(&format!(
            "Date: {} ({})\n",
            header.date.as_deref().unwrap_or_default(),
            date.format("%Y-%m-%d")
        )),
        None => output.push_str(&format!(
            "Date: {}\n",
            header.date.as_deref().unwrap_or("-")
        )),
    }
    output.push_str(&format!(
        "Customer: {}\n",
        header.customer.name.as_deref().unwrap_or("-")
    ));
    if let Some(email) = &header.customer.email {
        output.push_str(&format!("  Email: {}\n", email));
    }

    output.push_str("\nVehicle:\n");
    let description = vehicle.describe();
    if !description.is_empty() {
        output.push_str(&format!("  {}\n", description));
    }
    if let Some(vin) = &vehicle.vin {
        output.push_str(&format!("  VIN: {}\n", vin));
    }
    if let Some(mileage) = vehicle.mileage {
        output.push_str(&format!("  Mileage: {}\n", mileage));
    }

    for (i, entry) in record.services.iter().enumerate() {
        output.push_str(&format!("\nService {}:\n", i + 1));
        if let Some(complaint) = &entry.complaint {
            output.push_str(&format!("  Complaint: {}\n", indent(complaint)));
        }
        if let Some(cause) = &entry.cause {
            output.push_str(&format!("  Cause: {}\n", indent(cause)));
        }
        if let Some(correction) = &entry.correction {
            output.push_str(&format!("  Correction: {}\n", indent(correction)));
        }
        if let Some(labor) = entry.labor {
            match labor.cost() {
                Some(cost) => output.push_str(&format!(
                    "  Labor: {} hrs @ ${}/hr = ${}\n",
                    labor.hours,
                    labor.rate.unwrap_or_default(),
                    cost.round_dp(2)
                )),
                None => output.push_str(&format!("  Labor: {} hrs\n", labor.hours)),
            }
        }
        if !entry.parts.is_empty() {
            output.push_str(&format!("  Parts: {}\n", entry.parts.join(", ")));
        }
    }

    output.push_str(&format!("\nStatus: {}\n", record.classification));
    if let Some(failure) = record.failure {
        output.push_str(&format!("Reason: {}\n", failure));
    }

    output
}

fn indent(value: &str) -> String {
    value.replace('\n', "\n    ")
}
