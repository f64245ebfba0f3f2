//! # Export Module
//!
//! Hands a flattened LLC dataset over to a visualization layer. Rendering is
//! not done here; instead the grid is exported in forms plotting tools read
//! directly:
//!
//! - **Long-format table**: one row per grid point (and time step), with the
//!   point's indices, center and corner coordinates and the bound variable
//! - **Parquet**: that table written through Polars
//! - **JSON**: the whole dataset in xarray `Dataset.to_dict()` layout
//!

use crate::dataset::Dataset;
use crate::error::{PlotterError, PlotterResult};
use crate::plotter::{TIME_DIM, VAR_TO_PLOT};
use clap::ValueEnum;
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// File formats the flattened dataset can be written as.
#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Long-format Parquet table
    Parquet,
    /// xarray dictionary JSON
    Json,
}

impl ExportFormat {
    /// Infers the format from the output file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "parquet" | "pq" => Some(ExportFormat::Parquet),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Parquet => "parquet",
            ExportFormat::Json => "json",
        }
    }
}

/// Converts a flattened dataset into a long-format DataFrame.
///
/// Columns are `time` (only when the bound variable has a time axis), `j`,
/// `i`, `XC`, `YC`, `XG`, `YG` and `var_to_plot` (only when a variable is
/// bound). Rows run over `time`, then `j`, then `i`.
///
/// # Errors
///
/// Returns an error if the dataset lacks the flattened grid coordinates.
pub fn to_dataframe(ds: &Dataset) -> PlotterResult<DataFrame> {
    let grid = |name: &str| {
        ds.coord(name)
            .filter(|c| c.ndim() == 2)
            .ok_or_else(|| PlotterError::MissingCoordinate(name.to_string()))
    };
    let xc = grid("XC")?;
    let yc = grid("YC")?;
    let xg = grid("XG")?;
    let yg = grid("YG")?;
    let (rows, cols) = (xc.shape()[0], xc.shape()[1]);

    let axis_values = |name: &str, len: usize| -> PlotterResult<Vec<f64>> {
        match ds.coord(name) {
            Some(coord) => coord.values_1d(),
            None => Ok((0..len).map(|v| v as f64).collect()),
        }
    };
    let j_values = axis_values("j", rows)?;
    let i_values = axis_values("i", cols)?;

    let var = ds.data_var(VAR_TO_PLOT);
    let time_values = match var {
        Some(v) if v.has_dim(TIME_DIM) => Some(axis_values(TIME_DIM, v.shape()[0])?),
        _ => None,
    };
    let steps = time_values.as_ref().map_or(1, Vec::len);
    let points = rows * cols;

    let mut columns = Vec::new();
    if let Some(times) = &time_values {
        let time_col: Vec<f64> = times
            .iter()
            .flat_map(|t| std::iter::repeat_n(*t, points))
            .collect();
        columns.push(Series::new(TIME_DIM.into(), time_col).into());
    }

    let mut j_col = Vec::with_capacity(points * steps);
    let mut i_col = Vec::with_capacity(points * steps);
    for _ in 0..steps {
        for j in &j_values {
            for i in &i_values {
                j_col.push(*j);
                i_col.push(*i);
            }
        }
    }
    columns.push(Series::new("j".into(), j_col).into());
    columns.push(Series::new("i".into(), i_col).into());

    for (name, coord) in [("XC", xc), ("YC", yc), ("XG", xg), ("YG", yg)] {
        let values: Vec<f64> = (0..steps)
            .flat_map(|_| coord.data().iter().copied())
            .collect();
        columns.push(Series::new(name.into(), values).into());
    }

    if let Some(v) = var {
        let values: Vec<f64> = v.data().iter().copied().collect();
        if values.len() != points * steps {
            return Err(PlotterError::InvalidArray(format!(
                "{} has {} values but the grid has {} points per step",
                VAR_TO_PLOT,
                values.len(),
                points
            )));
        }
        columns.push(Series::new(VAR_TO_PLOT.into(), values).into());
    }

    let df = DataFrame::new(columns)?;
    Ok(df)
}

/// Writes a DataFrame to a Parquet file.
///
/// # Errors
///
/// This function will return an error if:
/// - The output path is not writable
/// - The DataFrame contains unsupported data types for Parquet
pub fn write_parquet<P: AsRef<Path>>(df: &DataFrame, output_path: P) -> PlotterResult<()> {
    let output_path = output_path.as_ref();
    debug!("Writing DataFrame to parquet file: {}", output_path.display());
    debug!("DataFrame shape: {:?}", df.shape());
    debug!("DataFrame schema:\n{:?}", df.schema());

    let file = File::create(output_path)?;
    let writer = ParquetWriter::new(file);
    let mut df = df.clone();
    writer.finish(&mut df)?;

    debug!("Successfully wrote parquet file: {}", output_path.display());
    Ok(())
}

/// Writes the dataset as pretty-printed xarray dictionary JSON.
pub fn write_json<P: AsRef<Path>>(ds: &Dataset, output_path: P) -> PlotterResult<()> {
    let output_path = output_path.as_ref();
    debug!("Writing dataset JSON: {}", output_path.display());
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, &ds.to_value())?;
    Ok(())
}

/// Writes the flattened dataset in the requested format.
pub fn export<P: AsRef<Path>>(
    ds: &Dataset,
    output_path: P,
    format: ExportFormat,
) -> PlotterResult<()> {
    match format {
        ExportFormat::Parquet => {
            let df = to_dataframe(ds)?;
            write_parquet(&df, output_path)
        }
        ExportFormat::Json => write_json(ds, output_path),
    }
}
