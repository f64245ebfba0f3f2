//! # Input Configuration Module
//!
//! This module provides configuration parsing and validation for llc-plotter jobs.
//! A job names a parent LLC dataset, the variable to bind (if any) and the
//! destination of the flattened dataset.
//!
//! ## Configuration Structure
//!
//! - **input**: Path to the parent dataset (NetCDF or xarray-dict JSON)
//! - **output**: Path for the flattened dataset
//! - **variable**: Optional data variable to bind as `var_to_plot`
//! - **format**: Optional export format (`parquet` or `json`), inferred from
//!   the output extension when absent
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use llc_plotter::input::PlotJobConfig;
//!
//! // Load from file (JSON or YAML, by extension)
//! let config = PlotJobConfig::from_file("job.yaml")?;
//!
//! // Load from JSON string
//! let json = r#"
//! {
//!   "input": "ecco_llc90.nc",
//!   "output": "ssh.parquet",
//!   "variable": "SSH"
//! }"#;
//! let config = PlotJobConfig::from_json(json)?;
//! # Ok::<(), llc_plotter::error::PlotterError>(())
//! ```

use crate::error::{PlotterError, PlotterResult};
use crate::output::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure for llc-plotter jobs.
///
/// # Examples
///
/// ```rust
/// use llc_plotter::input::PlotJobConfig;
/// use llc_plotter::output::ExportFormat;
///
/// let config = PlotJobConfig {
///     input: "ecco_llc90.nc".to_string(),
///     output: "ssh.parquet".to_string(),
///     variable: Some("SSH".to_string()),
///     format: None,
/// };
/// assert_eq!(config.export_format().unwrap(), ExportFormat::Parquet);
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PlotJobConfig {
    /// Path to the parent dataset
    pub input: String,
    /// Path for the flattened dataset
    pub output: String,
    /// Data variable to bind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// Export format; inferred from `output` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
}

impl PlotJobConfig {
    /// Loads a job configuration from a JSON or YAML file.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else
    /// as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlotterResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Loads a job configuration from a JSON string.
    pub fn from_json(json_str: &str) -> PlotterResult<Self> {
        let config: PlotJobConfig = serde_json::from_str(json_str)?;
        Ok(config)
    }

    /// Loads a job configuration from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> PlotterResult<Self> {
        let config: PlotJobConfig = serde_yaml::from_str(yaml_str)?;
        Ok(config)
    }

    /// The explicit format, or the one implied by the output extension.
    pub fn export_format(&self) -> PlotterResult<ExportFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => ExportFormat::from_path(&self.output).ok_or_else(|| {
                PlotterError::Config(format!(
                    "cannot infer export format from '{}'; use a .parquet or .json extension or set 'format'",
                    self.output
                ))
            }),
        }
    }

    /// Checks the configuration without touching the filesystem.
    pub fn validate(&self) -> PlotterResult<()> {
        if self.input.trim().is_empty() {
            return Err(PlotterError::Config("input path is empty".into()));
        }
        if self.output.trim().is_empty() {
            return Err(PlotterError::Config("output path is empty".into()));
        }
        if let Some(variable) = &self.variable {
            if variable.trim().is_empty() {
                return Err(PlotterError::Config("variable name is empty".into()));
            }
        }
        self.export_format()?;
        Ok(())
    }
}
