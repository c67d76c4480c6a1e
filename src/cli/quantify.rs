use std::path::PathBuf;

use clap::Args;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::core::{Dataset, KeyField, SourceFormat};
use crate::layout::{
    render_svg, solve, Areas, CircleGeometry, Diagram, RenderContext, SolverConfig,
    DEFAULT_REFERENCE_AREA,
};
use crate::matching::{extract_values, ReconciliationReport, ReconciliationResult};
use crate::parsing::{self, Extraction};
use crate::utils::export::OutputBatch;
use crate::utils::format::format_count;

const LABEL_A: &str = "Metabolites";
const LABEL_B: &str = "Lipids";

#[derive(Args)]
pub struct QuantifyArgs {
    /// HMDB metabolites: raw XML (.xml, .xml.gz) or normalized JSON
    #[arg(long, required = true)]
    pub metabolites: PathBuf,

    /// LIPID MAPS lipids: raw SDF (.sdf, .sdf.gz) or normalized JSON
    #[arg(long, required = true)]
    pub lipids: PathBuf,

    /// Key space that drives the diagram
    #[arg(long, value_enum, default_value = "identity-key")]
    pub key: KeyField,

    /// Also report InChIKey, SMILES and formula overlaps
    #[arg(long)]
    pub all_keys: bool,

    /// Write metabolite, lipid and shared key lists to this directory
    #[arg(long)]
    pub export_keys: Option<PathBuf>,

    /// Area given to the metabolite circle
    #[arg(long, default_value_t = DEFAULT_REFERENCE_AREA)]
    pub reference_area: f64,

    /// Accepted error on the overlap area
    #[arg(long, default_value_t = 1e-6)]
    pub tolerance: f64,

    /// Iteration cap for the overlap search
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,

    /// Fail instead of using an approximate layout
    #[arg(long)]
    pub strict_geometry: bool,

    /// Write the diagram as JSON
    #[arg(long)]
    pub layout_json: Option<PathBuf>,

    /// Write the diagram as SVG
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Add catalog captions inside the circles
    #[arg(long)]
    pub decorate: bool,

    /// Draw the common-area disc as well as its label
    #[arg(long)]
    pub draw_common: bool,

    /// Open the SVG after writing it
    #[arg(long, requires = "svg")]
    pub open: bool,
}

/// Pipeline settings, independent of where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct QuantifyConfig {
    /// Key space that feeds the layout
    pub key: KeyField,

    /// Every key space to reconcile; always includes `key`
    pub fields: Vec<KeyField>,

    pub reference_area: f64,
    pub solver: SolverConfig,
    pub strict_geometry: bool,
}

impl Default for QuantifyConfig {
    fn default() -> Self {
        Self {
            key: KeyField::IdentityKey,
            fields: vec![KeyField::IdentityKey],
            reference_area: DEFAULT_REFERENCE_AREA,
            solver: SolverConfig::default(),
            strict_geometry: false,
        }
    }
}

impl From<&QuantifyArgs> for QuantifyConfig {
    fn from(args: &QuantifyArgs) -> Self {
        let mut fields = vec![args.key];
        if args.all_keys {
            fields.extend(KeyField::REPORTED.iter().filter(|&&f| f != args.key));
        }

        Self {
            key: args.key,
            fields,
            reference_area: args.reference_area,
            solver: SolverConfig {
                tolerance: args.tolerance,
                max_iterations: args.max_iterations,
            },
            strict_geometry: args.strict_geometry,
        }
    }
}

/// Everything the pipeline computes from two datasets
#[derive(Debug, Clone)]
pub struct Quantification {
    pub report: ReconciliationReport,
    pub areas: Areas,
    pub geometry: CircleGeometry,
    pub diagram: Diagram,
}

impl Quantification {
    /// The result that drives the layout
    #[must_use]
    pub fn primary(&self) -> &ReconciliationResult {
        // `analyze` always puts the layout key first
        &self.report.results[0]
    }
}

/// Reconcile `metabolites` against `lipids` and lay out the overlap
///
/// # Errors
///
/// Returns an error if the metabolite dataset has no values for a key
/// space, the counts give invalid areas, or `strict_geometry` is set and the
/// overlap search did not converge.
pub fn analyze(
    metabolites: &Dataset,
    lipids: &Dataset,
    config: &QuantifyConfig,
) -> anyhow::Result<Quantification> {
    let mut fields = vec![config.key];
    fields.extend(config.fields.iter().filter(|&&f| f != config.key));

    let report = ReconciliationReport::build(metabolites, lipids, &fields)?;
    let primary = &report.results[0];

    let areas = Areas::from_counts(
        primary.dataset_a_size,
        primary.dataset_b_size,
        primary.intersection_size,
        config.reference_area,
    )?;

    let mut geometry = solve(&areas, &config.solver);
    if geometry.approximate {
        if config.strict_geometry {
            geometry = geometry.require_exact(areas.common)?;
        } else {
            warn!(
                target_area = areas.common,
                achieved = geometry.achieved_common,
                "Using approximate layout; overlap area is off target"
            );
        }
    }

    let diagram = Diagram::from_geometry(&geometry, primary, LABEL_A, LABEL_B);

    Ok(Quantification {
        report,
        areas,
        geometry,
        diagram,
    })
}

/// Execute quantify subcommand
///
/// # Errors
///
/// Returns an error if either input cannot be loaded, any pipeline stage
/// fails, or an output file cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: QuantifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let metabolites = parsing::load_input(&args.metabolites, SourceFormat::HmdbXml)?;
    let lipids = parsing::load_input(&args.lipids, SourceFormat::LipidMapsSdf)?;

    if verbose {
        eprintln!(
            "Metabolites: {} records ({} skipped)",
            metabolites.dataset.len(),
            metabolites.skipped
        );
        eprintln!(
            "Lipids: {} records ({} skipped)",
            lipids.dataset.len(),
            lipids.skipped
        );
    }

    let config = QuantifyConfig::from(&args);
    let quantification = analyze(&metabolites.dataset, &lipids.dataset, &config)?;

    // Outputs only once every stage has succeeded
    write_outputs(&args, &metabolites.dataset, &lipids.dataset, &quantification)?;

    match format {
        OutputFormat::Text => print_text_report(&metabolites, &lipids, &quantification),
        OutputFormat::Json => print_json_report(&args, &metabolites, &lipids, &quantification)?,
        OutputFormat::Tsv => print_tsv_report(&quantification),
    }

    Ok(())
}

/// Stage every requested output, then move them all into place
fn write_outputs(
    args: &QuantifyArgs,
    metabolites: &Dataset,
    lipids: &Dataset,
    quantification: &Quantification,
) -> anyhow::Result<()> {
    let mut batch = OutputBatch::new();

    if let Some(path) = &args.svg {
        let ctx = RenderContext {
            decorate: args.decorate,
            draw_common_disc: args.draw_common,
            ..RenderContext::default()
        };
        batch.stage(path, render_svg(&quantification.diagram, &ctx).as_bytes())?;
    }

    if let Some(path) = &args.layout_json {
        let layout = serde_json::json!({
            "areas": quantification.areas,
            "geometry": quantification.geometry,
            "diagram": quantification.diagram,
        });
        batch.stage(path, (serde_json::to_string_pretty(&layout)? + "\n").as_bytes())?;
    }

    // Last, since it may create the export directory
    if let Some(dir) = &args.export_keys {
        let result = quantification.primary();
        let field = result.field_a.as_str();
        batch.stage_key_set(
            dir,
            &format!("metabolite_{field}"),
            &extract_values(metabolites, result.field_a),
        )?;
        batch.stage_key_set(
            dir,
            &format!("lipid_{field}"),
            &extract_values(lipids, result.field_b),
        )?;
        batch.stage_key_set(dir, &format!("common_{field}"), &result.intersection_set)?;
    }

    batch.commit()?;

    if let (Some(path), true) = (&args.svg, args.open) {
        open::that(path)?;
    }

    Ok(())
}

fn print_text_report(metabolites: &Extraction, lipids: &Extraction, q: &Quantification) {
    println!("Reconciliation Results");
    println!("{}", "=".repeat(60));
    println!(
        "  Metabolite records: {} ({} skipped)",
        format_count(metabolites.dataset.len()),
        metabolites.skipped
    );
    println!(
        "  Lipid records: {} ({} skipped)",
        format_count(lipids.dataset.len()),
        lipids.skipped
    );

    for result in &q.report.results {
        println!();
        println!("{}", result.field_a.display_name());
        println!("{}", "-".repeat(60));
        println!(
            "  In metabolite dataset: {}",
            format_count(result.dataset_a_size)
        );
        println!("  In lipid dataset: {}", format_count(result.dataset_b_size));
        println!("  Shared: {}", format_count(result.intersection_size));
        println!("  Shared / metabolites: {:.2}%", result.percentage);
        if let Some(pct) = result.dataset_b_percentage() {
            println!("  Shared / lipids: {pct:.2}%");
        }
    }

    for field in &q.report.undefined {
        println!();
        println!("{}", field.display_name());
        println!("{}", "-".repeat(60));
        println!("  Undefined: no values in metabolite dataset");
    }

    let g = &q.geometry;
    println!();
    println!("Layout ({})", q.primary().field_a.display_name());
    println!("{}", "-".repeat(60));
    println!(
        "  Areas: {:.4} / {:.4} / {:.4}",
        q.areas.a, q.areas.b, q.areas.common
    );
    println!("  Radii: {:.4} / {:.4}", g.radius_a, g.radius_b);
    println!("  Center distance: {:.6}", g.distance());
    if g.approximate {
        println!(
            "  Approximate: overlap {:.6} after {} iterations",
            g.achieved_common, g.iterations
        );
    }
}

fn print_json_report(
    args: &QuantifyArgs,
    metabolites: &Extraction,
    lipids: &Extraction,
    q: &Quantification,
) -> anyhow::Result<()> {
    let results: Vec<_> = q
        .report
        .results
        .iter()
        .map(|r| {
            serde_json::json!({
                "field": r.field_a,
                "dataset_a_size": r.dataset_a_size,
                "dataset_b_size": r.dataset_b_size,
                "intersection_size": r.intersection_size,
                "percentage": r.percentage,
                "dataset_b_percentage": r.dataset_b_percentage(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "metabolites": {
            "path": args.metabolites.display().to_string(),
            "records": metabolites.dataset.len(),
            "skipped": metabolites.skipped,
        },
        "lipids": {
            "path": args.lipids.display().to_string(),
            "records": lipids.dataset.len(),
            "skipped": lipids.skipped,
        },
        "results": results,
        "undefined": q.report.undefined,
        "layout": {
            "areas": q.areas,
            "geometry": q.geometry,
            "diagram": q.diagram,
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_report(q: &Quantification) {
    println!("field\tdataset_a_size\tdataset_b_size\tintersection_size\tpercentage\tdataset_b_percentage");
    for r in &q.report.results {
        println!(
            "{}\t{}\t{}\t{}\t{:.2}\t{}",
            r.field_a,
            r.dataset_a_size,
            r.dataset_b_size,
            r.intersection_size,
            r.percentage,
            r.dataset_b_percentage()
                .map_or_else(|| "NA".to_string(), |p| format!("{p:.2}"))
        );
    }
    for field in &q.report.undefined {
        println!("{field}\t0\tNA\tNA\tNA\tNA");
    }
}
