//! CLI runner: config resolution, logging setup and the quilt run.

use crate::error::CliError;
use crate::Args;
use tilequilt::config::ConfigFile;
use tilequilt::logging::{init_logging, LoggingGuard, Verbosity};
use tilequilt::quilt::{QuiltConfig, QuiltOrchestrator, QuiltReport};
use tilequilt::raster::{ColorKey, ColorKeySet};
use tracing::info;

/// Runner that manages the CLI lifecycle.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: QuiltConfig,
}

impl CliRunner {
    /// Load the config file, overlay command line flags and start logging.
    pub fn new(args: &Args) -> Result<Self, CliError> {
        let file = match &args.config {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        let config = resolve_config(args, &file)?;

        let logging_guard = init_logging(
            &file.logging.directory,
            &file.logging.file,
            config.verbosity,
        )
        .map_err(CliError::LoggingInit)?;

        info!(
            version = tilequilt::VERSION,
            archives = config.archives.len(),
            input = %config.input_dir.display(),
            output = %config.output_dir.display(),
            metadata = %config.metadata,
            workers = config.workers,
            "tilequilt starting"
        );

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Run the quilt and print the per-archive summary.
    pub fn run(self) -> Result<(), CliError> {
        let orchestrator = QuiltOrchestrator::new(self.config);
        let report = orchestrator.run()?;
        print_summary(&report);

        if report.all_failed() {
            return Err(CliError::AllArchivesFailed {
                count: report.archives.len(),
            });
        }
        Ok(())
    }
}

/// Build the run configuration: command line flags win over the config file.
pub fn resolve_config(args: &Args, file: &ConfigFile) -> Result<QuiltConfig, CliError> {
    let mut config = file.to_quilt_config();

    if !args.panels.is_empty() {
        config.archives = args.panels.clone();
    }
    if let Some(dir) = &args.indir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &args.outdir {
        config.output_dir = dir.clone();
    }
    if args.no_flip_y {
        config.flip_y = false;
    }
    if args.no_merge {
        config.merge = false;
    }
    if let Some(units) = args.metadata_units {
        config.metadata = units.into();
    }
    if !args.color_keys.is_empty() {
        config.color_keys = resolve_color_keys(&args.color_keys)?;
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err(CliError::Config("--workers must be at least 1".to_string()));
        }
        config = config.with_workers(workers);
    }

    Ok(config.with_verbosity(resolve_verbosity(args)))
}

fn resolve_color_keys(values: &[String]) -> Result<ColorKeySet, CliError> {
    values
        .iter()
        .map(|v| v.parse::<ColorKey>().map_err(CliError::Config))
        .collect()
}

fn resolve_verbosity(args: &Args) -> Verbosity {
    if args.verbosity.verbose {
        Verbosity::Verbose
    } else if args.verbosity.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    }
}

fn print_summary(report: &QuiltReport) {
    println!();
    for archive in &report.archives {
        match &archive.result {
            Ok(stats) => println!("  {:<8} {}", archive.id, stats),
            Err(e) => println!("  {:<8} FAILED: {}", archive.id, e),
        }
    }
    println!();
    println!("Total: {}", report.totals());
}
