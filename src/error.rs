//! # Error Types
//!
//! Every fallible operation in the crate returns [`PlotterError`]. Variants are
//! grouped into a small taxonomy ([`ErrorKind`]) so callers can react to the
//! class of failure without matching every variant:
//!
//! - **Type**: the input is not a labeled dataset at all
//! - **Shape**: coordinate or array shapes are inconsistent
//! - **Lookup**: a named variable or coordinate does not exist
//! - **Domain**: the variable exists but cannot be flattened (vertical axis, non-LLC layout)
//! - **Io** / **Config**: file access, decoding and configuration problems

use thiserror::Error;

/// Errors that can occur while loading, flattening or exporting LLC datasets
#[derive(Error, Debug)]
pub enum PlotterError {
    #[error("LLC plotter must be constructed from a labeled dataset: {0}")]
    NotADataset(String),

    #[error(
        "Coordinate shape mismatch: XC {xc:?}, YC {yc:?}, XG {xg:?}, YG {yg:?} must all share one face layout"
    )]
    ShapeMismatch {
        xc: Vec<usize>,
        yc: Vec<usize>,
        xg: Vec<usize>,
        yg: Vec<usize>,
    },

    #[error("Coordinate '{name}' is not a face-wise (face, j, i) array: {reason}")]
    InvalidCoordinate { name: String, reason: String },

    #[error("Coordinate '{0}' is not contained in the parent dataset")]
    MissingCoordinate(String),

    #[error("Variable '{0}' is not contained in the parent dataset")]
    UnknownVariable(String),

    #[error(
        "The current plotter implementation only accepts 2-dimensional data: '{name}' has vertical dimension '{dim}'"
    )]
    VerticalDimension { name: String, dim: String },

    #[error(
        "The plotter doesn't know what to do with non-LLC data: '{0}' has no 'face' dimension"
    )]
    NotLlcData(String),

    #[error(
        "Variable '{name}' has unsupported per-face layout {dims:?}; expected (j, i) or (time, j, i)"
    )]
    UnsupportedLayout { name: String, dims: Vec<String> },

    #[error("Variable '{name}' flattens to {found:?} but the grid is {expected:?}")]
    GridMismatch {
        name: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid array: {0}")]
    InvalidArray(String),

    #[error(
        "Dimension '{dim}' has length {found} but the dataset already defines it with length {expected}"
    )]
    DimensionConflict {
        dim: String,
        expected: usize,
        found: usize,
    },

    #[error("Index {index} is out of bounds for dimension '{dim}' of length {len}")]
    IndexOutOfBounds { dim: String, index: usize, len: usize },

    #[error("Dimension '{0}' not found")]
    UnknownDimension(String),

    #[error("Array shape error: {0}")]
    Array(#[from] ndarray::ShapeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`PlotterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Shape,
    Lookup,
    Domain,
    Io,
    Config,
}

impl PlotterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlotterError::NotADataset(_) => ErrorKind::Type,
            PlotterError::ShapeMismatch { .. }
            | PlotterError::InvalidCoordinate { .. }
            | PlotterError::GridMismatch { .. }
            | PlotterError::InvalidArray(_)
            | PlotterError::DimensionConflict { .. }
            | PlotterError::Array(_) => ErrorKind::Shape,
            PlotterError::MissingCoordinate(_)
            | PlotterError::UnknownVariable(_)
            | PlotterError::IndexOutOfBounds { .. }
            | PlotterError::UnknownDimension(_) => ErrorKind::Lookup,
            PlotterError::VerticalDimension { .. }
            | PlotterError::NotLlcData(_)
            | PlotterError::UnsupportedLayout { .. } => ErrorKind::Domain,
            PlotterError::Io(_)
            | PlotterError::NetCdf(_)
            | PlotterError::Json(_)
            | PlotterError::Yaml(_)
            | PlotterError::Polars(_) => ErrorKind::Io,
            PlotterError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Result type for plotter operations
pub type PlotterResult<T> = Result<T, PlotterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PlotterError::NotADataset("list".into()).kind(), ErrorKind::Type);
        assert_eq!(PlotterError::UnknownVariable("SSH".into()).kind(), ErrorKind::Lookup);
        assert_eq!(PlotterError::NotLlcData("SSH".into()).kind(), ErrorKind::Domain);
        assert_eq!(PlotterError::Config("empty".into()).kind(), ErrorKind::Config);

        let err = PlotterError::VerticalDimension {
            name: "THETA".into(),
            dim: "k".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(err.to_string().contains("2-dimensional"));
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = PlotterError::ShapeMismatch {
            xc: vec![26, 2],
            yc: vec![26, 3],
            xg: vec![26, 2],
            yg: vec![26, 2],
        };
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert!(err.to_string().contains("YC [26, 3]"));
    }
}
