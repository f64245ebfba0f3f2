//! # llc-plotter
//!
//! Flattens datasets on the LLC (Lat-Lon-Cap) grid used by ocean general
//! circulation models such as ECCO into a single 2D grid, ready to be handed
//! to a visualization layer.
//!
//! ## Features
//!
//! - **Face flattening**: per-face `XC`, `YC`, `XG`, `YG` coordinates stacked along `j`
//! - **Variable binding**: one 2D (optionally time-dependent) variable reshaped the same way
//! - **Validation**: shape, vertical-axis and layout checks with typed errors
//! - **Inputs**: NetCDF files and xarray-dict JSON
//! - **Outputs**: long-format Parquet tables and xarray-dict JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llc_plotter::plotter::LlcPlotter;
//! use llc_plotter::reader::open_dataset;
//!
//! let parent = open_dataset("ecco_llc90.nc")?;
//! let mut plotter = LlcPlotter::new(&parent)?;
//! plotter.set_data_variable("SSH")?;
//!
//! let flattened = plotter.dataset();
//! println!("{}", flattened);
//! # Ok::<(), llc_plotter::error::PlotterError>(())
//! ```
//!
//! ## Configuration Example
//!
//! ```json
//! {
//!   "input": "ecco_llc90.nc",
//!   "output": "ssh.parquet",
//!   "variable": "SSH"
//! }
//! ```

pub mod cli;
pub mod dataset;
pub mod error;
pub mod info;
pub mod input;
pub mod log;
pub mod output;
pub mod plotter;
pub mod reader;

#[cfg(test)]
mod cli_tests;

use crate::error::PlotterResult;
use crate::input::PlotJobConfig;
use crate::output::{ExportFormat, export};
use crate::plotter::{LlcPlotter, TIME_DIM};
use crate::reader::open_dataset;
use ::log::debug;
use serde::Serialize;

/// What a finished job produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub faces: usize,
    pub grid_shape: (usize, usize),
    pub variable: Option<String>,
    pub time_steps: Option<usize>,
    pub output: String,
    pub format: ExportFormat,
}

/// Pipeline stages reported by [`process_plot_job_with_progress`], in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Loading,
    Flattening,
    Binding,
    Exporting,
}

impl JobStage {
    pub const ALL: [JobStage; 4] = [
        JobStage::Loading,
        JobStage::Flattening,
        JobStage::Binding,
        JobStage::Exporting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Loading => "loading dataset",
            JobStage::Flattening => "flattening grid",
            JobStage::Binding => "binding variable",
            JobStage::Exporting => "exporting",
        }
    }
}

/// Runs a flattening job according to the provided configuration.
///
/// This function orchestrates the entire pipeline:
/// 1. Validates the configuration
/// 2. Opens the parent dataset
/// 3. Flattens the LLC grid coordinates
/// 4. Binds the configured variable, if any
/// 5. Exports the flattened dataset
///
/// # Examples
///
/// ```rust,no_run
/// use llc_plotter::{process_plot_job, input::PlotJobConfig};
///
/// let config = PlotJobConfig::from_file("job.json")?;
/// let summary = process_plot_job(&config)?;
/// println!("{:?}", summary.grid_shape);
/// # Ok::<(), llc_plotter::error::PlotterError>(())
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration is invalid
/// - The dataset cannot be opened or is not on the LLC grid
/// - The variable cannot be bound
/// - The output cannot be written
pub fn process_plot_job(config: &PlotJobConfig) -> PlotterResult<JobSummary> {
    process_plot_job_with_progress(config, |_| {})
}

/// [`process_plot_job`], calling `on_stage` as each [`JobStage`] starts.
pub fn process_plot_job_with_progress<F: FnMut(JobStage)>(
    config: &PlotJobConfig,
    mut on_stage: F,
) -> PlotterResult<JobSummary> {
    config.validate()?;
    let format = config.export_format()?;

    on_stage(JobStage::Loading);
    let parent = open_dataset(&config.input)?;

    on_stage(JobStage::Flattening);
    let mut plotter = LlcPlotter::new(&parent)?;

    on_stage(JobStage::Binding);
    if let Some(variable) = &config.variable {
        plotter.set_data_variable(variable)?;
    }

    on_stage(JobStage::Exporting);
    export(plotter.dataset(), &config.output, format)?;

    let summary = JobSummary {
        faces: plotter.face_count(),
        grid_shape: plotter.grid_shape(),
        variable: plotter.bound_variable().map(str::to_string),
        time_steps: plotter.var_to_plot().and_then(|v| v.len_of(TIME_DIM)),
        output: config.output.clone(),
        format,
    };
    debug!("Job summary: {:?}", summary);
    Ok(summary)
}
