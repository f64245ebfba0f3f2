//! # LLC Plotter
//!
//! Wraps a parent dataset on the LLC (Lat-Lon-Cap) grid used by the ECCO
//! project and flattens its faces into a single 2D grid that a visualization
//! layer can draw directly.
//!
//! The workflow is: construct an [`LlcPlotter`] from a parent dataset, bind the
//! data variable to draw with [`LlcPlotter::set_data_variable`], then hand
//! [`LlcPlotter::dataset`] to the renderer (see [`crate::output`]).
//!
//! Faces are always stacked along the north-south `j` axis in face-index
//! order; face `k` of a grid with `J` rows per face occupies output rows
//! `k*J..(k+1)*J`.
//!
//! ```rust
//! use llc_plotter::dataset::{DataArray, Dataset};
//! use llc_plotter::plotter::LlcPlotter;
//!
//! let coord = |offset: f64| {
//!     DataArray::from_shape_vec(
//!         vec!["face", "j", "i"],
//!         vec![2, 2, 3],
//!         (0..12).map(|v| v as f64 + offset).collect(),
//!     )
//! };
//! let parent = Dataset::new()
//!     .with_coord("XC", coord(0.0)?)?
//!     .with_coord("YC", coord(100.0)?)?
//!     .with_coord("XG", coord(-0.5)?)?
//!     .with_coord("YG", coord(99.5)?)?
//!     .with_data_var("SSH", coord(0.25)?)?;
//!
//! let mut plotter = LlcPlotter::new(&parent)?;
//! plotter.set_data_variable("SSH")?;
//! assert_eq!(plotter.grid_shape(), (4, 3));
//! assert_eq!(plotter.var_to_plot().unwrap().shape(), &[4, 3]);
//! # Ok::<(), llc_plotter::error::PlotterError>(())
//! ```

use crate::dataset::{DataArray, Dataset, LabeledDataset};
use crate::error::{PlotterError, PlotterResult};
use log::debug;
use ndarray::{Array2, ArrayView2, ArrayViewD, Axis, Ix3, concatenate};

/// Name under which the bound data variable is stored in the flattened dataset.
pub const VAR_TO_PLOT: &str = "var_to_plot";

pub const FACE_DIM: &str = "face";
pub const TIME_DIM: &str = "time";

/// Vertical index spellings on the LLC grid: `k`, `k_u`, `k_l`, `k_p1`.
pub const VERTICAL_DIMS: [&str; 4] = ["k", "k_u", "k_l", "k_p1"];

/// Returns the first vertical dimension in `dims`, if any.
pub fn vertical_dim<S: AsRef<str>>(dims: &[S]) -> Option<&str> {
    dims.iter()
        .map(AsRef::as_ref)
        .find(|dim| VERTICAL_DIMS.contains(dim))
}

/// Helper to make sure a variable is two dimensional data.
pub fn has_vertical_dim<S: AsRef<str>>(dims: &[S]) -> bool {
    vertical_dim(dims).is_some()
}

/// Per-face dimension ordering of a bindable variable once `face` is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceLayout {
    /// `(j, i)`
    Surface,
    /// `(time, j, i)`
    TimeSeries,
}

impl SliceLayout {
    /// Matches a per-face dimension list against the supported layouts.
    pub fn detect<S: AsRef<str>>(dims: &[S], j_name: &str, i_name: &str) -> Option<Self> {
        let dims: Vec<&str> = dims.iter().map(AsRef::as_ref).collect();
        match dims.as_slice() {
            [j, i] if *j == j_name && *i == i_name => Some(SliceLayout::Surface),
            [t, j, i] if *t == TIME_DIM && *j == j_name && *i == i_name => {
                Some(SliceLayout::TimeSeries)
            }
            _ => None,
        }
    }

    /// Axis along which faces are stacked.
    pub fn j_axis(self) -> usize {
        match self {
            SliceLayout::Surface => 0,
            SliceLayout::TimeSeries => 1,
        }
    }

    pub fn i_axis(self) -> usize {
        self.j_axis() + 1
    }
}

/// Axis names and layout of a variable that passed [`check_plottable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotAxes {
    pub j_name: &'static str,
    pub i_name: &'static str,
    pub layout: SliceLayout,
}

/// Checks that `var` can be bound: no vertical axis, a `face` axis, and a
/// per-face layout of `(j, i)` or `(time, j, i)` on center or corner axes.
pub fn check_plottable(name: &str, var: &DataArray) -> PlotterResult<PlotAxes> {
    if let Some(dim) = vertical_dim(var.dims()) {
        return Err(PlotterError::VerticalDimension {
            name: name.to_string(),
            dim: dim.to_string(),
        });
    }
    if !var.has_dim(FACE_DIM) {
        return Err(PlotterError::NotLlcData(name.to_string()));
    }

    let j_name = if var.has_dim("j") { "j" } else { "j_g" };
    let i_name = if var.has_dim("i") { "i" } else { "i_g" };

    let per_face: Vec<&str> = var
        .dims()
        .iter()
        .map(String::as_str)
        .filter(|dim| *dim != FACE_DIM)
        .collect();
    let layout = SliceLayout::detect(&per_face, j_name, i_name).ok_or_else(|| {
        PlotterError::UnsupportedLayout {
            name: name.to_string(),
            dims: var.dims().to_vec(),
        }
    })?;

    Ok(PlotAxes {
        j_name,
        i_name,
        layout,
    })
}

/// Plotter for data on the LLC grid.
///
/// Borrows its parent dataset for variable lookups and owns the flattened
/// dataset holding `XC`, `YC` on `(j, i)`, `XG`, `YG` on `(j_g, i_g)`, the
/// index coordinates, and at most one bound [`VAR_TO_PLOT`].
#[derive(Debug)]
pub struct LlcPlotter<'a, D: LabeledDataset + ?Sized = Dataset> {
    parent: &'a D,
    ds: Dataset,
    faces: usize,
    bound: Option<String>,
}

impl<'a, D: LabeledDataset + ?Sized> LlcPlotter<'a, D> {
    /// Builds the flattened coordinate dataset from the parent's `XC`, `YC`,
    /// `XG` and `YG`.
    ///
    /// # Errors
    ///
    /// - [`PlotterError::MissingCoordinate`] if one of the four is absent
    /// - [`PlotterError::InvalidCoordinate`] if one is not a non-empty `(face, j, i)` array
    /// - [`PlotterError::ShapeMismatch`] if the flattened center and corner grids differ
    pub fn new(parent: &'a D) -> PlotterResult<Self> {
        let (xc, faces) = flatten_coordinate(parent, "XC")?;
        let (yc, _) = flatten_coordinate(parent, "YC")?;
        let (xg, _) = flatten_coordinate(parent, "XG")?;
        let (yg, _) = flatten_coordinate(parent, "YG")?;

        if xc.shape() != yc.shape() || xg.shape() != yg.shape() || xc.shape() != xg.shape() {
            return Err(PlotterError::ShapeMismatch {
                xc: xc.shape().to_vec(),
                yc: yc.shape().to_vec(),
                xg: xg.shape().to_vec(),
                yg: yg.shape().to_vec(),
            });
        }

        let (jdim, idim) = xc.dim();
        let mut ds = Dataset::new();
        ds.insert_coord("i", DataArray::range("i", idim))?;
        ds.insert_coord("j", DataArray::range("j", jdim))?;
        ds.insert_coord("i_g", DataArray::range("i_g", idim))?;
        ds.insert_coord("j_g", DataArray::range("j_g", jdim))?;
        ds.insert_coord("XC", DataArray::new(vec!["j", "i"], xc.into_dyn())?)?;
        ds.insert_coord("YC", DataArray::new(vec!["j", "i"], yc.into_dyn())?)?;
        ds.insert_coord("XG", DataArray::new(vec!["j_g", "i_g"], xg.into_dyn())?)?;
        ds.insert_coord("YG", DataArray::new(vec!["j_g", "i_g"], yg.into_dyn())?)?;

        debug!("Flattened {} faces into a {}x{} grid", faces, jdim, idim);

        Ok(LlcPlotter {
            parent,
            ds,
            faces,
            bound: None,
        })
    }

    /// Sets the data variable to be plotted.
    ///
    /// The variable must be a data variable of the parent, two dimensional
    /// per face (optionally with a leading `time` axis) and still in LLC
    /// layout with a `face` dimension. Its faces are stacked along `j` as for
    /// the coordinates and stored as [`VAR_TO_PLOT`], replacing any previous
    /// binding. On error nothing changes.
    pub fn set_data_variable(&mut self, var_name: &str) -> PlotterResult<&mut Self> {
        let parent = self.parent;
        let var = parent
            .data_var(var_name)
            .ok_or_else(|| PlotterError::UnknownVariable(var_name.to_string()))?;
        let axes = check_plottable(var_name, var)?;

        let face_count = var.len_of(FACE_DIM).unwrap_or(0);
        let slices = (0..face_count)
            .map(|face| var.index_view(FACE_DIM, face))
            .collect::<PlotterResult<Vec<ArrayViewD<'_, f64>>>>()?;
        if slices.is_empty() {
            return Err(PlotterError::InvalidArray(format!(
                "variable '{}' has an empty 'face' dimension",
                var_name
            )));
        }
        let raw = concatenate(Axis(axes.layout.j_axis()), &slices)?;

        let rows = raw.len_of(Axis(axes.layout.j_axis()));
        let cols = raw.len_of(Axis(axes.layout.i_axis()));
        if (rows, cols) != self.grid_shape() {
            return Err(PlotterError::GridMismatch {
                name: var_name.to_string(),
                expected: self.grid_shape(),
                found: (rows, cols),
            });
        }

        let i_coord = self.parent_coordinate(axes.i_name, cols)?;
        let time_coord = match axes.layout {
            SliceLayout::TimeSeries => {
                let steps = raw.len_of(Axis(0));
                Some(self.parent_coordinate(TIME_DIM, steps)?)
            }
            SliceLayout::Surface => None,
        };

        let mut dims = vec![axes.j_name, axes.i_name];
        if time_coord.is_some() {
            dims.insert(0, TIME_DIM);
        }
        let mut bound = DataArray::new(dims, raw)?;
        bound.set_attrs(var.attrs().clone());

        let mut next = self.ds.clone();
        next.remove(VAR_TO_PLOT);
        next.remove(TIME_DIM);
        next.insert_coord(axes.j_name, DataArray::range(axes.j_name, rows))?;
        next.insert_coord(axes.i_name, i_coord)?;
        if let Some(time) = time_coord {
            next.insert_coord(TIME_DIM, time)?;
        }
        next.insert_data_var(VAR_TO_PLOT, bound)?;

        debug!(
            "Bound '{}' ({:?} layout, axes {}/{}) as {}",
            var_name, axes.layout, axes.j_name, axes.i_name, VAR_TO_PLOT
        );
        self.ds = next;
        self.bound = Some(var_name.to_string());
        Ok(self)
    }

    /// The parent's 1-D coordinate for `dim`, or an index range when the
    /// parent has none.
    fn parent_coordinate(&self, dim: &str, len: usize) -> PlotterResult<DataArray> {
        match self.parent.variable(dim) {
            Some(coord) if coord.dims().len() == 1 && coord.dims()[0] == dim => {
                if coord.shape()[0] != len {
                    return Err(PlotterError::DimensionConflict {
                        dim: dim.to_string(),
                        expected: len,
                        found: coord.shape()[0],
                    });
                }
                Ok(coord.clone())
            }
            _ => Ok(DataArray::range(dim, len)),
        }
    }

    /// The flattened dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.ds
    }

    pub fn into_dataset(self) -> Dataset {
        self.ds
    }

    pub fn parent(&self) -> &D {
        self.parent
    }

    /// The bound variable, once [`set_data_variable`](Self::set_data_variable) succeeded.
    pub fn var_to_plot(&self) -> Option<&DataArray> {
        self.ds.data_var(VAR_TO_PLOT)
    }

    /// Name of the parent variable currently bound.
    pub fn bound_variable(&self) -> Option<&str> {
        self.bound.as_deref()
    }

    /// `(rows, columns)` of the flattened grid.
    pub fn grid_shape(&self) -> (usize, usize) {
        let dims = self.ds.dims();
        (
            dims.get("j").copied().unwrap_or(0),
            dims.get("i").copied().unwrap_or(0),
        )
    }

    pub fn face_count(&self) -> usize {
        self.faces
    }
}

/// Stacks every `(j, i)` face of a `(face, j, i)` coordinate along `j`.
fn flatten_coordinate<D: LabeledDataset + ?Sized>(
    parent: &D,
    name: &str,
) -> PlotterResult<(Array2<f64>, usize)> {
    let coord = parent
        .variable(name)
        .ok_or_else(|| PlotterError::MissingCoordinate(name.to_string()))?;
    let invalid = || PlotterError::InvalidCoordinate {
        name: name.to_string(),
        reason: format!("expected dimensions (face, j, i), found {:?}", coord.dims()),
    };
    if coord.ndim() != 3 || coord.axis_of(FACE_DIM) != Some(0) {
        return Err(invalid());
    }
    let faces = coord
        .data()
        .view()
        .into_dimensionality::<Ix3>()
        .map_err(|_| invalid())?;

    let slices: Vec<ArrayView2<'_, f64>> = faces.outer_iter().collect();
    if slices.is_empty() {
        return Err(PlotterError::InvalidCoordinate {
            name: name.to_string(),
            reason: "the face axis is empty".to_string(),
        });
    }
    let flat = concatenate(Axis(0), &slices)?;
    Ok((flat, slices.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_vertical_dim() {
        assert!(has_vertical_dim(&["face", "k", "j", "i"]));
        assert!(has_vertical_dim(&["k_l", "face", "j", "i"]));
        assert!(has_vertical_dim(&["face", "k_u"]));
        assert!(has_vertical_dim(&["k_p1"]));
        assert!(!has_vertical_dim(&["time", "face", "j", "i"]));
        assert!(!has_vertical_dim(&["kk", "k_x", "face"]));
        assert!(!has_vertical_dim::<&str>(&[]));
    }

    #[test]
    fn test_vertical_dim_reports_spelling() {
        assert_eq!(vertical_dim(&["face", "k_l"]), Some("k_l"));
        assert_eq!(vertical_dim(&["face", "j", "i"]), None);
    }

    #[test]
    fn test_slice_layout_detect() {
        assert_eq!(
            SliceLayout::detect(&["j", "i"], "j", "i"),
            Some(SliceLayout::Surface)
        );
        assert_eq!(
            SliceLayout::detect(&["time", "j_g", "i"], "j_g", "i"),
            Some(SliceLayout::TimeSeries)
        );
        assert_eq!(SliceLayout::detect(&["i", "j"], "j", "i"), None);
        assert_eq!(SliceLayout::detect(&["j", "time", "i"], "j", "i"), None);
        assert_eq!(SliceLayout::detect(&["j"], "j", "i"), None);
    }

    #[test]
    fn test_slice_layout_axes() {
        assert_eq!(SliceLayout::Surface.j_axis(), 0);
        assert_eq!(SliceLayout::Surface.i_axis(), 1);
        assert_eq!(SliceLayout::TimeSeries.j_axis(), 1);
        assert_eq!(SliceLayout::TimeSeries.i_axis(), 2);
    }

    #[test]
    fn test_check_plottable_axis_flavors() {
        let var = DataArray::from_shape_vec(
            vec!["face", "j_g", "i"],
            vec![1, 2, 2],
            vec![0.0; 4],
        )
        .unwrap();
        let axes = check_plottable("VVEL", &var).unwrap();
        assert_eq!(axes.j_name, "j_g");
        assert_eq!(axes.i_name, "i");
        assert_eq!(axes.layout, SliceLayout::Surface);
    }

    #[test]
    fn test_check_plottable_errors() {
        let vertical = DataArray::from_shape_vec(
            vec!["k", "face", "j", "i"],
            vec![1, 1, 1, 1],
            vec![0.0],
        )
        .unwrap();
        assert!(matches!(
            check_plottable("THETA", &vertical),
            Err(PlotterError::VerticalDimension { .. })
        ));

        let no_face =
            DataArray::from_shape_vec(vec!["j", "i"], vec![1, 1], vec![0.0]).unwrap();
        assert!(matches!(
            check_plottable("lat", &no_face),
            Err(PlotterError::NotLlcData(_))
        ));

        let transposed =
            DataArray::from_shape_vec(vec!["face", "i", "j"], vec![1, 1, 1], vec![0.0]).unwrap();
        assert!(matches!(
            check_plottable("SSH", &transposed),
            Err(PlotterError::UnsupportedLayout { .. })
        ));
    }
}
