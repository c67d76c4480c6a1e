//! Command-line interface for lipid-quantifier.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **convert**: Stream an HMDB XML or LIPID MAPS SDF file into normalized JSON
//! - **quantify**: Reconcile the two catalogs and lay out the overlap diagram
//! - **layout**: Solve the two-circle layout for given areas
//!
//! ## Usage
//!
//! ```text
//! # Convert the raw downloads once
//! lipid-quantifier convert data/hmdb_metabolites.xml -o metabolites.json
//! lipid-quantifier convert data/structures.sdf -o lipids.json
//!
//! # Count shared InChIKeys and draw the diagram
//! lipid-quantifier quantify --metabolites metabolites.json --lipids lipids.json --svg overlap.svg
//!
//! # All key spaces, JSON output for scripting
//! lipid-quantifier quantify --metabolites metabolites.json --lipids lipids.json --all-keys --format json
//!
//! # Solve a layout by hand
//! lipid-quantifier layout --area-a 10 --area-b 3 --area-common 2
//! ```

use clap::{Parser, Subcommand};

pub mod convert;
pub mod layout;
pub mod quantify;

#[derive(Parser)]
#[command(name = "lipid-quantifier")]
#[command(version)]
#[command(about = "Quantify lipids shared between the HMDB and LIPID MAPS catalogs")]
#[command(
    long_about = "lipid-quantifier streams the HMDB metabolite catalog (XML) and the LIPID MAPS structure database (SDF) into a common record schema, counts the entries both catalogs share, and lays out an area-proportional two-circle diagram of the overlap.\n\nEntries are matched exactly by InChIKey by default; SMILES strings and chemical formulas can be compared as well."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a catalog file to normalized JSON
    Convert(convert::ConvertArgs),

    /// Reconcile metabolites with lipids and lay out the overlap diagram
    Quantify(quantify::QuantifyArgs),

    /// Solve the two-circle layout for given areas
    Layout(layout::LayoutArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
