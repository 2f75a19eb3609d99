//! tilequilt CLI - Command-line interface
//!
//! Quilts MBTiles chart panels into a TMS tile tree using the tilequilt
//! library.

mod error;
mod runner;

use clap::{Args as ClapArgs, Parser, ValueEnum};
use std::path::PathBuf;
use tilequilt::quilt::MetadataMode;

use crate::runner::CliRunner;

/// Metadata annotation selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum MetadataUnits {
    /// Annotate tiles with {"units": "feet"}
    Feet,
    /// Annotate tiles with {"units": "metric"}
    Metric,
    /// Copy each tile's annotation from the archive's legacy `map` table
    #[value(alias = "oldFormatMBTiles")]
    Legacy,
    /// Write tiles without annotation
    None,
}

impl From<MetadataUnits> for MetadataMode {
    fn from(units: MetadataUnits) -> Self {
        match units {
            MetadataUnits::Feet => MetadataMode::Feet,
            MetadataUnits::Metric => MetadataMode::Metric,
            MetadataUnits::Legacy => MetadataMode::LegacyLookup,
            MetadataUnits::None => MetadataMode::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ClapArgs)]
#[group(multiple = false)]
pub struct VerbosityArgs {
    /// Report every skipped record with its coordinate
    #[arg(long)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Parser)]
#[command(name = "tilequilt")]
#[command(version = tilequilt::VERSION)]
#[command(about = "Quilt MBTiles chart panels into a TMS tile tree", long_about = None)]
pub struct Args {
    /// Panels to process, in order (defaults to the configured panel list)
    pub panels: Vec<String>,

    /// Configuration file (default: ~/.tilequilt/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the archives
    #[arg(long)]
    pub indir: Option<PathBuf>,

    /// Root of the output tile tree
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Keep archive row numbering instead of flipping to TMS
    #[arg(long)]
    pub no_flip_y: bool,

    /// Overwrite existing tiles instead of blending onto them
    #[arg(long)]
    pub no_merge: bool,

    /// Metadata annotation written into each tile
    #[arg(long, value_enum)]
    pub metadata_units: Option<MetadataUnits>,

    /// Colour made transparent (#rrggbb); repeat for several colours
    #[arg(long = "color-key", value_name = "COLOR")]
    pub color_keys: Vec<String>,

    /// Archives processed concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    #[command(flatten)]
    pub verbosity: VerbosityArgs,
}

fn main() {
    let args = Args::parse();

    let result = CliRunner::new(&args).and_then(|runner| runner.run());
    if let Err(e) = result {
        e.exit();
    }
}
