use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::SourceFormat;
use crate::parsing::{self, json, Extraction};
use crate::utils::format::format_count;

#[derive(Args)]
pub struct ConvertArgs {
    /// Catalog file: HMDB XML (.xml) or LIPID MAPS SDF (.sdf), optionally gzipped
    #[arg(required = true)]
    pub input: PathBuf,

    /// Source format (detected from the file extension by default)
    #[arg(long, value_enum)]
    pub source: Option<SourceFormat>,

    /// Output JSON file [default: metabolites.json or lipids.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute convert subcommand
///
/// # Errors
///
/// Returns an error if the format cannot be determined, the input cannot be
/// read, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ConvertArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let source = args
        .source
        .or_else(|| SourceFormat::detect(&args.input))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Cannot tell the format of '{}' from its name; pass --source hmdb or --source lipidmaps",
                args.input.display()
            )
        })?;

    if verbose {
        eprintln!("Reading {} as {source}", args.input.display());
    }

    let extraction = parsing::extract_dataset(&args.input, source)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}s.json", source.label())));
    json::write_dataset(&output, &extraction.dataset)?;

    match format {
        OutputFormat::Text => print_text_summary(&args, &output, &extraction),
        OutputFormat::Json => print_json_summary(&args, &output, source, &extraction)?,
        OutputFormat::Tsv => print_tsv_summary(&output, &extraction),
    }

    Ok(())
}

fn print_text_summary(args: &ConvertArgs, output: &std::path::Path, extraction: &Extraction) {
    println!("Conversion completed");
    println!("{}", "=".repeat(60));
    println!("  Input: {}", args.input.display());
    println!("  Output: {}", output.display());
    println!("  Records: {}", format_count(extraction.dataset.len()));
    println!("  Skipped (malformed): {}", extraction.skipped);
}

fn print_json_summary(
    args: &ConvertArgs,
    output: &std::path::Path,
    source: SourceFormat,
    extraction: &Extraction,
) -> anyhow::Result<()> {
    let summary = serde_json::json!({
        "input": args.input.display().to_string(),
        "output": output.display().to_string(),
        "source": source,
        "label": extraction.dataset.label,
        "records": extraction.dataset.len(),
        "skipped": extraction.skipped,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_tsv_summary(output: &std::path::Path, extraction: &Extraction) {
    println!("output\tlabel\trecords\tskipped");
    println!(
        "{}\t{}\t{}\t{}",
        output.display(),
        extraction.dataset.label,
        extraction.dataset.len(),
        extraction.skipped
    );
}
