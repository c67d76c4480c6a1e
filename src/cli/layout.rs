use clap::Args;

use crate::cli::OutputFormat;
use crate::layout::{solve, Areas, CircleGeometry, SolverConfig};

#[derive(Args)]
pub struct LayoutArgs {
    /// Area of circle A
    #[arg(long, required = true)]
    pub area_a: f64,

    /// Area of circle B
    #[arg(long, required = true)]
    pub area_b: f64,

    /// Target overlap area
    #[arg(long, required = true)]
    pub area_common: f64,

    /// Accepted error on the overlap area
    #[arg(long, default_value_t = 1e-6)]
    pub tolerance: f64,

    /// Iteration cap for the overlap search
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,

    /// Fail instead of printing an approximate layout
    #[arg(long)]
    pub strict_geometry: bool,
}

/// Execute layout subcommand
///
/// # Errors
///
/// Returns an error for invalid areas, or for an approximate layout when
/// `--strict-geometry` is set.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: LayoutArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let areas = Areas::new(args.area_a, args.area_b, args.area_common)?;
    let config = SolverConfig {
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
    };

    let mut geometry = solve(&areas, &config);
    if args.strict_geometry {
        geometry = geometry.require_exact(areas.common)?;
    }

    if verbose {
        eprintln!("Solved in {} iterations", geometry.iterations);
    }

    match format {
        OutputFormat::Text => print_text_geometry(&areas, &geometry),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "areas": areas,
                "geometry": geometry,
                "distance": geometry.distance(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => print_tsv_geometry(&geometry),
    }

    Ok(())
}

fn print_text_geometry(areas: &Areas, g: &CircleGeometry) {
    println!("Circle Layout");
    println!("{}", "=".repeat(60));
    println!(
        "  Areas: {} / {} / {}",
        areas.a, areas.b, areas.common
    );
    println!("  Radius A: {:.6}", g.radius_a);
    println!("  Radius B: {:.6}", g.radius_b);
    println!("  Center A: ({:.6}, {:.6})", g.center_a.x, g.center_a.y);
    println!("  Center B: ({:.6}, {:.6})", g.center_b.x, g.center_b.y);
    println!(
        "  Common label: ({:.6}, {:.6})",
        g.center_common.x, g.center_common.y
    );
    println!("  Distance: {:.6}", g.distance());
    println!("  Overlap: {:.6}", g.achieved_common);
    if g.approximate {
        println!("  Approximate after {} iterations", g.iterations);
    }
}

fn print_tsv_geometry(g: &CircleGeometry) {
    println!("radius_a\tradius_b\tdistance\tachieved_common\titerations\tapproximate");
    println!(
        "{:.6}\t{:.6}\t{:.6}\t{:.6}\t{}\t{}",
        g.radius_a,
        g.radius_b,
        g.distance(),
        g.achieved_common,
        g.iterations,
        g.approximate
    );
}
