//! # CLI Module
//!
//! This module provides the command-line interface for llc-plotter, including:
//! - Argument parsing with clap
//! - Configuration file loading (JSON/YAML)
//! - Environment variable support with the LLC_PLOTTER_ prefix
//! - Merging of configuration sources with a fixed priority
//! - Subcommands for flattening, inspection, validation and completions

use crate::input::PlotJobConfig;
use crate::output::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Flatten LLC ocean model grids into 2D datasets for visualization
#[derive(Parser, Debug)]
#[command(name = "llc-plotter")]
#[command(about = "Flatten LLC (Lat-Lon-Cap) grid datasets into plottable 2D grids")]
#[command(version)]
#[command(long_about = "
llc-plotter reshapes datasets on the LLC (Lat-Lon-Cap) grid used by ECCO and
other MITgcm configurations into a single 2D grid. The faces of the parent
dataset are stacked along the north-south 'j' axis; one 2D data variable can be
bound and reshaped the same way, then exported for a plotting tool.

EXAMPLES:
  # Flatten the grid and bind sea surface height
  llc-plotter flatten ecco_llc90.nc ssh.parquet -n SSH

  # Export the flattened dataset as xarray-dict JSON
  llc-plotter flatten ecco_llc90.nc grid.json

  # Using a config file
  llc-plotter --config job.yaml flatten

  # Which variables can be plotted?
  llc-plotter info ecco_llc90.nc

  # Generate completions
  llc-plotter completions bash > ~/.bash_completion.d/llc-plotter
")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format for structured data
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Configuration file path (JSON or YAML)
    #[arg(short, long, global = true, env = "LLC_PLOTTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten an LLC dataset and export it
    #[command(long_about = "
Flatten the LLC grid of a dataset and export the result.

The parent's XC/YC/XG/YG coordinates are concatenated face by face along 'j'.
With -n, one data variable is reshaped the same way and stored as 'var_to_plot'.
Variables with a vertical axis (k, k_u, k_l, k_p1) are rejected.

EXAMPLES:
  llc-plotter flatten ecco_llc90.nc ssh.parquet -n SSH
  llc-plotter flatten ecco_llc90.json grid.out --format json
  llc-plotter --config base.json flatten --dry-run
")]
    Flatten {
        /// Parent dataset path (NetCDF or xarray-dict JSON)
        #[arg(value_name = "INPUT", env = "LLC_PLOTTER_INPUT")]
        input: Option<String>,

        /// Output path
        #[arg(value_name = "OUTPUT", env = "LLC_PLOTTER_OUTPUT")]
        output: Option<String>,

        /// Data variable to bind
        #[arg(short = 'n', long, env = "LLC_PLOTTER_VARIABLE")]
        variable: Option<String>,

        /// Export format (default: inferred from the output extension)
        #[arg(long, value_enum, env = "LLC_PLOTTER_FORMAT")]
        format: Option<ExportFormat>,

        /// Force overwrite existing output files
        #[arg(long, env = "LLC_PLOTTER_FORCE")]
        force: bool,

        /// Dry run - validate configuration without processing
        #[arg(long, env = "LLC_PLOTTER_DRY_RUN")]
        dry_run: bool,
    },

    /// Show information about a dataset
    #[command(long_about = "
Inspect a dataset and report its dimensions, coordinates and data variables,
including whether each data variable can be bound by the flattener.

EXAMPLES:
  llc-plotter info ecco_llc90.nc
  llc-plotter info ecco_llc90.nc -n SSH --format json
")]
    Info {
        /// Dataset path (NetCDF or xarray-dict JSON)
        file: String,

        /// Show only specific variable info
        #[arg(short = 'n', long)]
        variable: Option<String>,

        /// Output format for dataset information
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate a job configuration file
    Validate {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON structured output
    Json,
    /// YAML structured output
    Yaml,
}

/// Builds the job configuration for `flatten`.
///
/// Priority: command-line arguments (and their environment variables) >
/// configuration file.
pub fn resolve_job_config(
    base: Option<PlotJobConfig>,
    input: Option<String>,
    output: Option<String>,
    variable: Option<String>,
    format: Option<ExportFormat>,
) -> Result<PlotJobConfig, String> {
    let (base_input, base_output, base_variable, base_format) = match base {
        Some(config) => (
            Some(config.input),
            Some(config.output),
            config.variable,
            config.format,
        ),
        None => (None, None, None, None),
    };

    let input = input
        .or(base_input)
        .ok_or("Input dataset path is required (argument, LLC_PLOTTER_INPUT or config file)")?;
    let output = output
        .or(base_output)
        .ok_or("Output path is required (argument, LLC_PLOTTER_OUTPUT or config file)")?;

    Ok(PlotJobConfig {
        input,
        output,
        variable: variable.or(base_variable),
        format: format.or(base_format),
    })
}

/// Refuses to overwrite an existing local file unless `force` is set.
pub fn check_output_path(output: &str, force: bool) -> Result<(), String> {
    if !force && Path::new(output).exists() {
        return Err(format!(
            "Output file '{}' already exists (use --force to overwrite)",
            output
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PlotJobConfig {
        PlotJobConfig {
            input: "base.nc".to_string(),
            output: "base.parquet".to_string(),
            variable: Some("SSH".to_string()),
            format: None,
        }
    }

    #[test]
    fn test_resolve_prefers_arguments() {
        let config = resolve_job_config(
            Some(base()),
            Some("cli.nc".to_string()),
            None,
            Some("ETAN".to_string()),
            Some(ExportFormat::Json),
        )
        .unwrap();
        assert_eq!(config.input, "cli.nc");
        assert_eq!(config.output, "base.parquet");
        assert_eq!(config.variable.as_deref(), Some("ETAN"));
        assert_eq!(config.format, Some(ExportFormat::Json));
    }

    #[test]
    fn test_resolve_falls_back_to_config() {
        let config = resolve_job_config(Some(base()), None, None, None, None).unwrap();
        assert_eq!(config, base());
    }

    #[test]
    fn test_resolve_requires_paths() {
        assert!(resolve_job_config(None, None, Some("o.json".into()), None, None).is_err());
        assert!(resolve_job_config(None, Some("i.nc".into()), None, None, None).is_err());
        let config =
            resolve_job_config(None, Some("i.nc".into()), Some("o.json".into()), None, None)
                .unwrap();
        assert_eq!(config.variable, None);
    }

    #[test]
    fn test_check_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("grid.json");
        std::fs::write(&existing, "{}").unwrap();
        let existing = existing.to_str().unwrap();

        assert!(check_output_path(existing, false).is_err());
        assert!(check_output_path(existing, true).is_ok());

        let fresh = dir.path().join("new.json");
        assert!(check_output_path(fresh.to_str().unwrap(), false).is_ok());
    }
}
