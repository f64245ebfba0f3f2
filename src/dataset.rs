//! # Labeled Datasets
//!
//! A minimal labeled-array model: named dimensions over `f64` n-dimensional
//! arrays, grouped into a dataset of coordinates and data variables. This is
//! the input contract of the [`LlcPlotter`](crate::plotter::LlcPlotter) and the
//! container it produces.
//!
//! ## Key Components
//!
//! - [`DataArray`]: an `ndarray` array with one name per axis and string attributes
//! - [`Dataset`]: coordinates + data variables sharing consistent dimension lengths
//! - [`LabeledDataset`]: the capability the plotter needs from a parent dataset
//!
//! ## JSON Layout
//!
//! Datasets encode to and decode from the layout produced by xarray's
//! `Dataset.to_dict()`:
//!
//! ```json
//! {
//!   "coords": { "XC": { "dims": ["face", "j", "i"], "data": [[[0.0]]], "attrs": {} } },
//!   "data_vars": { "SSH": { "dims": ["face", "j", "i"], "data": [[[0.1]]], "attrs": {} } },
//!   "attrs": {},
//!   "dims": { "face": 1, "j": 1, "i": 1 }
//! }
//! ```
//!
//! Missing values are `NaN` in memory and `null` in JSON.

use crate::error::{PlotterError, PlotterResult};
use ndarray::{Array1, ArrayD, ArrayViewD, Axis, IxDyn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// An n-dimensional `f64` array with named dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    dims: Vec<String>,
    data: ArrayD<f64>,
    attrs: BTreeMap<String, String>,
}

impl DataArray {
    /// Wraps `data` with one dimension name per axis.
    ///
    /// # Errors
    ///
    /// Returns [`PlotterError::InvalidArray`] if the number of names differs from
    /// the number of axes or a name is repeated.
    pub fn new<S: Into<String>>(dims: Vec<S>, data: ArrayD<f64>) -> PlotterResult<Self> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(PlotterError::InvalidArray(format!(
                "{} dimension names given for an array with {} axes",
                dims.len(),
                data.ndim()
            )));
        }
        for (pos, dim) in dims.iter().enumerate() {
            if dims[..pos].contains(dim) {
                return Err(PlotterError::InvalidArray(format!(
                    "dimension '{}' appears more than once",
                    dim
                )));
            }
        }
        Ok(DataArray {
            dims,
            data,
            attrs: BTreeMap::new(),
        })
    }

    /// Builds an array from row-major values and an explicit shape.
    pub fn from_shape_vec<S: Into<String>>(
        dims: Vec<S>,
        shape: Vec<usize>,
        values: Vec<f64>,
    ) -> PlotterResult<Self> {
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
        DataArray::new(dims, data)
    }

    /// Integer index coordinate `0..len` along a single dimension.
    pub fn range(dim: &str, len: usize) -> Self {
        let data = Array1::from_iter((0..len).map(|v| v as f64)).into_dyn();
        DataArray {
            dims: vec![dim.to_string()],
            data,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn set_attrs(&mut self, attrs: BTreeMap<String, String>) {
        self.attrs = attrs;
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// Position of `dim` in this array's dimension list.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Length of the named dimension.
    pub fn len_of(&self, dim: &str) -> Option<usize> {
        self.axis_of(dim).map(|axis| self.data.len_of(Axis(axis)))
    }

    /// Borrowed view of one index along `dim`, with that dimension dropped.
    pub fn index_view(&self, dim: &str, index: usize) -> PlotterResult<ArrayViewD<'_, f64>> {
        let axis = self
            .axis_of(dim)
            .ok_or_else(|| PlotterError::UnknownDimension(dim.to_string()))?;
        let len = self.data.len_of(Axis(axis));
        if index >= len {
            return Err(PlotterError::IndexOutOfBounds {
                dim: dim.to_string(),
                index,
                len,
            });
        }
        Ok(self.data.index_axis(Axis(axis), index))
    }

    /// Selects one index along `dim`, dropping the dimension (`sel(face=3)`).
    pub fn sel(&self, dim: &str, index: usize) -> PlotterResult<DataArray> {
        let data = self.index_view(dim, index)?.to_owned();
        let dims = self.dims.iter().filter(|d| *d != dim).cloned().collect();
        Ok(DataArray {
            dims,
            data,
            attrs: self.attrs.clone(),
        })
    }

    /// Values of a one-dimensional array in order.
    pub fn values_1d(&self) -> PlotterResult<Vec<f64>> {
        if self.ndim() != 1 {
            return Err(PlotterError::InvalidArray(format!(
                "expected a 1-dimensional array, found dimensions {:?}",
                self.dims
            )));
        }
        Ok(self.data.iter().copied().collect())
    }

    fn from_value(name: &str, value: &Value) -> PlotterResult<Self> {
        let entry = value.as_object().ok_or_else(|| {
            PlotterError::InvalidArray(format!("entry '{}' must be a mapping", name))
        })?;

        let dims = match entry.get("dims") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|d| {
                    d.as_str().map(str::to_string).ok_or_else(|| {
                        PlotterError::InvalidArray(format!(
                            "entry '{}' has a non-string dimension name",
                            name
                        ))
                    })
                })
                .collect::<PlotterResult<Vec<String>>>()?,
            Some(Value::String(single)) => vec![single.clone()],
            _ => {
                return Err(PlotterError::InvalidArray(format!(
                    "entry '{}' is missing its 'dims' list",
                    name
                )));
            }
        };

        let raw = entry.get("data").ok_or_else(|| {
            PlotterError::InvalidArray(format!("entry '{}' is missing its 'data'", name))
        })?;

        let mut shape = Vec::new();
        let mut probe = raw;
        while let Value::Array(items) = probe {
            shape.push(items.len());
            match items.first() {
                Some(first) => probe = first,
                None => break,
            }
        }
        if shape.len() != dims.len() {
            return Err(PlotterError::InvalidArray(format!(
                "entry '{}' has {} dimensions but its data is nested {} deep",
                name,
                dims.len(),
                shape.len()
            )));
        }

        let mut values = Vec::with_capacity(shape.iter().product());
        collect_values(name, raw, &shape, 0, &mut values)?;

        let mut array = DataArray::from_shape_vec(dims, shape, values)?;
        if let Some(Value::Object(attrs)) = entry.get("attrs") {
            array.attrs = attrs_from_value(attrs);
        }
        Ok(array)
    }

    fn to_value(&self) -> Value {
        let mut entry = Map::new();
        entry.insert(
            "dims".to_string(),
            Value::Array(self.dims.iter().cloned().map(Value::String).collect()),
        );
        entry.insert("data".to_string(), array_to_value(self.data.view()));
        entry.insert("attrs".to_string(), attrs_to_value(&self.attrs));
        Value::Object(entry)
    }
}

fn collect_values(
    name: &str,
    value: &Value,
    shape: &[usize],
    depth: usize,
    out: &mut Vec<f64>,
) -> PlotterResult<()> {
    if depth == shape.len() {
        let number = match value {
            Value::Null => f64::NAN,
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            other => {
                return Err(PlotterError::InvalidArray(format!(
                    "entry '{}' contains a non-numeric value: {}",
                    name, other
                )));
            }
        };
        out.push(number);
        return Ok(());
    }

    match value {
        Value::Array(items) if items.len() == shape[depth] => {
            for item in items {
                collect_values(name, item, shape, depth + 1, out)?;
            }
            Ok(())
        }
        _ => Err(PlotterError::InvalidArray(format!(
            "entry '{}' has ragged data at depth {}",
            name, depth
        ))),
    }
}

fn array_to_value(view: ArrayViewD<'_, f64>) -> Value {
    if view.ndim() == 0 {
        let v = view.iter().next().copied().unwrap_or(f64::NAN);
        return serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    Value::Array(view.outer_iter().map(array_to_value).collect())
}

fn attrs_from_value(attrs: &Map<String, Value>) -> BTreeMap<String, String> {
    attrs
        .iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect()
}

fn attrs_to_value(attrs: &BTreeMap<String, String>) -> Value {
    Value::Object(
        attrs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// What the plotter needs from a parent dataset.
///
/// Implement this for any container that can hand out named, dimension-labeled
/// arrays. [`Dataset`] is the in-crate implementation.
pub trait LabeledDataset {
    /// Looks up a coordinate or a data variable.
    fn variable(&self, name: &str) -> Option<&DataArray>;

    /// Looks up a data variable only.
    fn data_var(&self, name: &str) -> Option<&DataArray>;
}

/// A collection of coordinates and data variables with consistent dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    coords: BTreeMap<String, DataArray>,
    data_vars: BTreeMap<String, DataArray>,
    attrs: BTreeMap<String, String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`PlotterError::DimensionConflict`] if one of the array's
    /// dimensions already exists in the dataset with a different length.
    pub fn insert_coord(&mut self, name: &str, array: DataArray) -> PlotterResult<()> {
        self.check_dims(name, &array)?;
        self.data_vars.remove(name);
        self.coords.insert(name.to_string(), array);
        Ok(())
    }

    /// Adds or replaces a data variable.
    pub fn insert_data_var(&mut self, name: &str, array: DataArray) -> PlotterResult<()> {
        self.check_dims(name, &array)?;
        self.coords.remove(name);
        self.data_vars.insert(name.to_string(), array);
        Ok(())
    }

    /// Builder-style [`insert_coord`](Self::insert_coord).
    pub fn with_coord(mut self, name: &str, array: DataArray) -> PlotterResult<Self> {
        self.insert_coord(name, array)?;
        Ok(self)
    }

    /// Builder-style [`insert_data_var`](Self::insert_data_var).
    pub fn with_data_var(mut self, name: &str, array: DataArray) -> PlotterResult<Self> {
        self.insert_data_var(name, array)?;
        Ok(self)
    }

    /// Removes a coordinate or data variable by name.
    pub fn remove(&mut self, name: &str) -> Option<DataArray> {
        self.coords
            .remove(name)
            .or_else(|| self.data_vars.remove(name))
    }

    pub fn coord(&self, name: &str) -> Option<&DataArray> {
        self.coords.get(name)
    }

    pub fn data_var(&self, name: &str) -> Option<&DataArray> {
        self.data_vars.get(name)
    }

    /// Coordinate first, then data variable.
    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.coords.get(name).or_else(|| self.data_vars.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn coords(&self) -> impl Iterator<Item = (&String, &DataArray)> {
        self.coords.iter()
    }

    pub fn data_vars(&self) -> impl Iterator<Item = (&String, &DataArray)> {
        self.data_vars.iter()
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_string(), value.to_string());
    }

    /// Dimension name to length, across every array in the dataset.
    pub fn dims(&self) -> BTreeMap<String, usize> {
        let mut dims = BTreeMap::new();
        for array in self.coords.values().chain(self.data_vars.values()) {
            for (dim, len) in array.dims().iter().zip(array.shape()) {
                dims.insert(dim.clone(), *len);
            }
        }
        dims
    }

    fn check_dims(&self, name: &str, array: &DataArray) -> PlotterResult<()> {
        let mut existing = BTreeMap::new();
        for (other, arr) in self.coords.iter().chain(self.data_vars.iter()) {
            // a replaced entry does not constrain its replacement
            if other == name {
                continue;
            }
            for (dim, len) in arr.dims().iter().zip(arr.shape()) {
                existing.insert(dim.as_str(), *len);
            }
        }
        for (dim, len) in array.dims().iter().zip(array.shape()) {
            if let Some(&expected) = existing.get(dim.as_str()) {
                if expected != *len {
                    return Err(PlotterError::DimensionConflict {
                        dim: dim.clone(),
                        expected,
                        found: *len,
                    });
                }
            }
        }
        Ok(())
    }

    /// Decodes a dataset from the xarray `to_dict()` layout.
    ///
    /// # Errors
    ///
    /// Returns [`PlotterError::NotADataset`] when `value` is not a mapping with
    /// `coords` or `data_vars` entries (a plain list of numbers, a scalar, a
    /// single data array, an arbitrary mapping), and shape errors for
    /// malformed entries.
    pub fn from_value(value: &Value) -> PlotterResult<Self> {
        let root = match value {
            Value::Object(root) => root,
            Value::Array(_) => {
                return Err(PlotterError::NotADataset(
                    "found a plain array, expected a mapping with 'coords' and 'data_vars'".into(),
                ));
            }
            other => {
                return Err(PlotterError::NotADataset(format!(
                    "found a {} value, expected a mapping with 'coords' and 'data_vars'",
                    json_type_name(other)
                )));
            }
        };

        if !root.contains_key("coords") && !root.contains_key("data_vars") {
            let reason = if root.contains_key("dims") && root.contains_key("data") {
                "found a single data array, expected a dataset".to_string()
            } else {
                "mapping has no 'coords' or 'data_vars' entries".to_string()
            };
            return Err(PlotterError::NotADataset(reason));
        }

        let mut ds = Dataset::new();
        for (section, is_coord) in [("coords", true), ("data_vars", false)] {
            match root.get(section) {
                None | Some(Value::Null) => {}
                Some(Value::Object(entries)) => {
                    for (name, entry) in entries {
                        let array = DataArray::from_value(name, entry)?;
                        if is_coord {
                            ds.insert_coord(name, array)?;
                        } else {
                            ds.insert_data_var(name, array)?;
                        }
                    }
                }
                Some(_) => {
                    return Err(PlotterError::NotADataset(format!(
                        "'{}' must be a mapping of named arrays",
                        section
                    )));
                }
            }
        }
        if let Some(Value::Object(attrs)) = root.get("attrs") {
            ds.attrs = attrs_from_value(attrs);
        }
        Ok(ds)
    }

    pub fn from_json_str(json_str: &str) -> PlotterResult<Self> {
        let value: Value = serde_json::from_str(json_str)?;
        Dataset::from_value(&value)
    }

    /// Encodes the dataset in the xarray `to_dict()` layout.
    pub fn to_value(&self) -> Value {
        let section = |entries: &BTreeMap<String, DataArray>| {
            Value::Object(
                entries
                    .iter()
                    .map(|(name, array)| (name.clone(), array.to_value()))
                    .collect(),
            )
        };
        let dims = Value::Object(
            self.dims()
                .into_iter()
                .map(|(dim, len)| (dim, Value::from(len)))
                .collect(),
        );

        let mut root = Map::new();
        root.insert("coords".to_string(), section(&self.coords));
        root.insert("attrs".to_string(), attrs_to_value(&self.attrs));
        root.insert("dims".to_string(), dims);
        root.insert("data_vars".to_string(), section(&self.data_vars));
        Value::Object(root)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

impl LabeledDataset for Dataset {
    fn variable(&self, name: &str) -> Option<&DataArray> {
        self.get(name)
    }

    fn data_var(&self, name: &str) -> Option<&DataArray> {
        self.data_vars.get(name)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self
            .dims()
            .iter()
            .map(|(dim, len)| format!("{}: {}", dim, len))
            .collect();
        writeln!(f, "<Dataset>")?;
        writeln!(f, "Dimensions: ({})", dims.join(", "))?;
        writeln!(f, "Coordinates:")?;
        for (name, array) in &self.coords {
            writeln!(f, "    {} ({})", name, array.dims().join(", "))?;
        }
        writeln!(f, "Data variables:")?;
        for (name, array) in &self.data_vars {
            writeln!(f, "    {} ({})", name, array.dims().join(", "))?;
        }
        Ok(())
    }
}
