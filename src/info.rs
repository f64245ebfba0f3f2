//! # Dataset Information Module
//!
//! This module inspects a parent dataset and reports its dimensions and
//! variables, including whether each data variable can be bound to an
//! [`LlcPlotter`](crate::plotter::LlcPlotter) and, if not, why.

use crate::dataset::{DataArray, Dataset};
use crate::plotter::check_plottable;
use crate::reader::open_dataset;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a dataset dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
}

/// Information about a dataset variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub is_coordinate: bool,
    pub dimensions: Vec<String>,
    pub shape: Vec<usize>,
    pub attributes: BTreeMap<String, String>,
    /// Whether `set_data_variable` would accept this variable
    pub plottable: bool,
    /// Why the variable cannot be bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Complete information about a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub path: String,
    pub dimensions: Vec<DimensionInfo>,
    pub variables: Vec<VariableInfo>,
    pub global_attributes: BTreeMap<String, String>,
    pub has_llc_grid: bool,
    pub total_variables: usize,
    pub total_dimensions: usize,
}

/// Opens `file_path` and summarizes it.
pub fn get_dataset_info(file_path: &str, variable: Option<&str>) -> Result<DatasetInfo> {
    debug!("Inspecting dataset: {}", file_path);
    let ds = open_dataset(file_path)
        .with_context(|| format!("Failed to open dataset: {}", file_path))?;
    Ok(describe_dataset(file_path, &ds, variable))
}

/// Summarizes an in-memory dataset; `variable` limits the variable list.
pub fn describe_dataset(path: &str, ds: &Dataset, variable: Option<&str>) -> DatasetInfo {
    let dimensions: Vec<DimensionInfo> = ds
        .dims()
        .into_iter()
        .map(|(name, length)| DimensionInfo { name, length })
        .collect();

    let wanted = |name: &str| variable.is_none_or(|v| v == name);
    let mut variables = Vec::new();
    for (name, array) in ds.coords() {
        if wanted(name.as_str()) {
            variables.push(variable_info(name, array, true));
        }
    }
    for (name, array) in ds.data_vars() {
        if wanted(name.as_str()) {
            variables.push(variable_info(name, array, false));
        }
    }

    let has_llc_grid = ["XC", "YC", "XG", "YG"]
        .iter()
        .all(|name| ds.get(name).is_some_and(|c| c.has_dim("face")));

    DatasetInfo {
        path: path.to_string(),
        total_dimensions: dimensions.len(),
        total_variables: variables.len(),
        dimensions,
        variables,
        global_attributes: ds.attrs().clone(),
        has_llc_grid,
    }
}

fn variable_info(name: &str, array: &DataArray, is_coordinate: bool) -> VariableInfo {
    let (plottable, reason) = if is_coordinate {
        (false, Some("coordinates cannot be bound".to_string()))
    } else {
        match check_plottable(name, array) {
            Ok(_) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        }
    };
    VariableInfo {
        name: name.to_string(),
        is_coordinate,
        dimensions: array.dims().to_vec(),
        shape: array.shape().to_vec(),
        attributes: array.attrs().clone(),
        plottable,
        reason,
    }
}

/// Print dataset info in human-readable format
pub fn print_dataset_info_human(info: &DatasetInfo) {
    println!("Dataset Information:");
    println!("  Path: {}", info.path);
    println!(
        "  LLC grid (XC/YC/XG/YG on faces): {}",
        if info.has_llc_grid { "yes" } else { "no" }
    );
    println!("  Dimensions: {} total", info.total_dimensions);
    for dim in &info.dimensions {
        println!("    {} ({})", dim.name, dim.length);
    }
    println!("  Variables: {} total", info.total_variables);
    for var in &info.variables {
        let role = if var.is_coordinate { "coordinate" } else { "data" };
        println!(
            "    {} ({}) - dimensions: [{}]",
            var.name,
            role,
            var.dimensions.join(", ")
        );
        if !var.is_coordinate {
            match &var.reason {
                None => println!("      plottable"),
                Some(reason) => println!("      not plottable: {}", reason),
            }
        }
        for (name, value) in &var.attributes {
            println!("      @{}: {}", name, value);
        }
    }
    if !info.global_attributes.is_empty() {
        println!("  Global Attributes:");
        for (name, value) in &info.global_attributes {
            println!("    @{}: {}", name, value);
        }
    }
}

/// Print dataset info in JSON format
pub fn print_dataset_info_json(info: &DatasetInfo) -> Result<()> {
    let json =
        serde_json::to_string_pretty(info).context("Failed to serialize dataset info to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print dataset info in YAML format
pub fn print_dataset_info_yaml(info: &DatasetInfo) -> Result<()> {
    let yaml = serde_yaml::to_string(info).context("Failed to serialize dataset info to YAML")?;
    println!("{}", yaml);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let grid = || {
            DataArray::from_shape_vec(vec!["face", "j", "i"], vec![2, 1, 1], vec![0.0, 1.0])
                .unwrap()
        };
        let theta = DataArray::from_shape_vec(
            vec!["k", "face", "j", "i"],
            vec![1, 2, 1, 1],
            vec![0.0, 1.0],
        )
        .unwrap();
        Dataset::new()
            .with_coord("XC", grid())
            .unwrap()
            .with_coord("YC", grid())
            .unwrap()
            .with_coord("XG", grid())
            .unwrap()
            .with_coord("YG", grid())
            .unwrap()
            .with_data_var("SSH", grid().with_attr("units", "m"))
            .unwrap()
            .with_data_var("THETA", theta)
            .unwrap()
    }

    #[test]
    fn test_describe_dataset() {
        let info = describe_dataset("memory", &sample(), None);
        assert!(info.has_llc_grid);
        assert_eq!(info.total_variables, 6);
        assert_eq!(info.total_dimensions, 4);

        let ssh = info.variables.iter().find(|v| v.name == "SSH").unwrap();
        assert!(ssh.plottable);
        assert_eq!(ssh.attributes["units"], "m");

        let theta = info.variables.iter().find(|v| v.name == "THETA").unwrap();
        assert!(!theta.plottable);
        assert!(theta.reason.as_ref().unwrap().contains("vertical dimension 'k'"));
    }

    #[test]
    fn test_describe_single_variable() {
        let info = describe_dataset("memory", &sample(), Some("SSH"));
        assert_eq!(info.total_variables, 1);
        assert_eq!(info.variables[0].name, "SSH");
    }

    #[test]
    fn test_info_serializes_to_json() {
        let info = describe_dataset("memory", &sample(), Some("SSH"));
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["variables"][0]["plottable"], true);
        assert!(value["variables"][0].get("reason").is_none());
    }
}
