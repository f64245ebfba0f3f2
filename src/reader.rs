//! # Dataset Readers
//!
//! Loads a parent [`Dataset`] from disk. The format is detected from the path:
//!
//! - `*.json`: xarray `Dataset.to_dict()` layout (see [`crate::dataset`])
//! - anything else: NetCDF, read through the `netcdf` crate
//!
//! NetCDF files carry no explicit coordinate/data split, so the reader follows
//! the CF conventions xarray uses: variables named after a dimension and
//! variables listed in another variable's `coordinates` attribute become
//! coordinates, all other numeric variables become data variables.

use crate::dataset::{DataArray, Dataset};
use crate::error::PlotterResult;
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// On-disk dataset formats understood by [`open_dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    NetCdf,
    Json,
}

impl InputFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => InputFormat::Json,
            _ => InputFormat::NetCdf,
        }
    }
}

/// Opens a dataset, picking the reader from the file extension.
pub fn open_dataset<P: AsRef<Path>>(path: P) -> PlotterResult<Dataset> {
    let path = path.as_ref();
    match InputFormat::from_path(path) {
        InputFormat::Json => read_json(path),
        InputFormat::NetCdf => read_netcdf(path),
    }
}

/// Reads an xarray-dict JSON file.
pub fn read_json<P: AsRef<Path>>(path: P) -> PlotterResult<Dataset> {
    debug!("Reading JSON dataset: {}", path.as_ref().display());
    let content = fs::read_to_string(path)?;
    Dataset::from_json_str(&content)
}

/// Reads every numeric variable of a NetCDF file into memory.
pub fn read_netcdf<P: AsRef<Path>>(path: P) -> PlotterResult<Dataset> {
    debug!("Opening NetCDF file: {}", path.as_ref().display());
    let file = netcdf::open(path.as_ref())?;

    let mut coord_names: HashSet<String> = file
        .dimensions()
        .map(|dim| dim.name().to_string())
        .collect();
    for var in file.variables() {
        if let Some(listed) = string_attribute(&var, "coordinates") {
            coord_names.extend(listed.split_whitespace().map(str::to_string));
        }
    }

    let mut ds = Dataset::new();
    for attr in file.attributes() {
        if let Ok(value) = attr.value() {
            ds.set_attr(attr.name(), &format_attribute_value(&value));
        }
    }

    for var in file.variables() {
        let name = var.name();
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        let values = match var.get_values::<f64, _>(..) {
            Ok(values) => values,
            Err(e) => {
                warn!("Skipping non-numeric variable '{}': {}", name, e);
                continue;
            }
        };

        let mut array = DataArray::from_shape_vec(dims, shape, values)?;
        let mut attrs = BTreeMap::new();
        for attr in var.attributes() {
            if let Ok(value) = attr.value() {
                attrs.insert(attr.name().to_string(), format_attribute_value(&value));
            }
        }
        array.set_attrs(attrs);

        if coord_names.contains(&name) {
            ds.insert_coord(&name, array)?;
        } else {
            ds.insert_data_var(&name, array)?;
        }
    }

    file.close()?;
    debug!("Loaded dataset:\n{}", ds);
    Ok(ds)
}

fn string_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Strings verbatim, everything else in debug form.
fn format_attribute_value(value: &netcdf::AttributeValue) -> String {
    match value {
        netcdf::AttributeValue::Str(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_format_from_path() {
        assert_eq!(InputFormat::from_path("grid.json"), InputFormat::Json);
        assert_eq!(InputFormat::from_path("GRID.JSON"), InputFormat::Json);
        assert_eq!(InputFormat::from_path("ecco_llc90.nc"), InputFormat::NetCdf);
        assert_eq!(InputFormat::from_path("ecco_llc90"), InputFormat::NetCdf);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = open_dataset("/nonexistent/llc.json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
