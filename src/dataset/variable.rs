use super::{Attributes, AttrValue, DatasetError, Dim};
use crate::metadata::GeometryMetadata;
use crate::utils;

use ndarray::{ArrayD, ArrayViewD, Axis, Ix1, Slice};
use std::ops::Range;
use std::sync::Arc;

/// A single labelled array: the dimension names of each axis, the values, and the
/// attributes attached to it.
///
/// Zero-dimensional variables hold scalar constants (guard widths, separatrix indices)
/// and are split out of grid datasets into [`GeometryMetadata`] during fusion.
#[derive(Debug, Clone)]
pub struct Variable {
    dims: Vec<Dim>,
    data: ArrayD<f64>,
    attrs: Attributes,
    grid: Option<Arc<GeometryMetadata>>,
}

impl Variable {
    /// label the axes of `data` with `dims`, in order
    pub fn new(dims: Vec<Dim>, data: ArrayD<f64>) -> Result<Self, DatasetError> {
        if dims.len() != data.ndim() {
            return Err(DatasetError::AxisCount {
                dims: dims.len(),
                axes: data.ndim(),
            });
        }

        for (idx, dim) in dims.iter().enumerate() {
            if dims[..idx].contains(dim) {
                return Err(DatasetError::RepeatedDimension { dim: *dim });
            }
        }

        Ok(Self {
            dims,
            data,
            attrs: Attributes::new(),
            grid: None,
        })
    }

    /// a zero-dimensional variable
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            data: ArrayD::from_elem(ndarray::IxDyn(&[]), value),
            attrs: Attributes::new(),
            grid: None,
        }
    }

    /// builder-style attribute setter
    pub fn with_attr<K: Into<String>, V: Into<AttrValue>>(mut self, key: K, value: V) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// the value of a zero-dimensional variable
    pub fn scalar_value(&self) -> Option<f64> {
        if self.is_scalar() {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    /// position of `dim` among this variable's axes
    pub fn axis_of(&self, dim: Dim) -> Option<usize> {
        self.dims.iter().position(|d| *d == dim)
    }

    pub fn len_of(&self, dim: Dim) -> Option<usize> {
        self.axis_of(dim).map(|axis| self.data.len_of(Axis(axis)))
    }

    /// the "grid" attribute group: the constants of the grid file this variable
    /// was fused with
    pub fn grid_metadata(&self) -> Option<&GeometryMetadata> {
        self.grid.as_deref()
    }

    pub(crate) fn with_grid(mut self, grid: Option<Arc<GeometryMetadata>>) -> Self {
        self.grid = grid;
        self
    }

    /// same dimensions, same attributes, same values (NaN compares equal to NaN)
    pub fn identical(&self, other: &Variable) -> bool {
        self.dims == other.dims
            && self.attrs == other.attrs
            && utils::arrays_identical(&self.data, &other.data)
    }

    /// values along `dim`, taking index 0 along every other axis
    ///
    /// Returns `None` if the variable does not depend on `dim` or any other axis is empty.
    pub fn profile(&self, dim: Dim) -> Option<ndarray::Array1<f64>> {
        let axis = self.axis_of(dim)?;

        if self.shape().iter().enumerate().any(|(i, len)| i != axis && *len == 0) {
            return None;
        }

        let mut view: ArrayViewD<'_, f64> = self.data.view();

        // remove the highest axes first so the lower axis indices stay valid
        for other in (0..self.ndim()).rev() {
            if other != axis {
                view = view.index_axis_move(Axis(other), 0);
            }
        }

        view.into_dimensionality::<Ix1>().ok().map(|v| v.to_owned())
    }

    /// select `range` along `dim`. Variables that do not depend on `dim` are
    /// returned unchanged.
    ///
    /// the caller is responsible for `range` being in bounds
    pub(crate) fn isel(&self, dim: Dim, range: Range<usize>) -> Variable {
        match self.axis_of(dim) {
            Some(axis) => Variable {
                dims: self.dims.clone(),
                data: self.data.slice_axis(Axis(axis), Slice::from(range)).to_owned(),
                attrs: self.attrs.clone(),
                grid: self.grid.clone(),
            },
            None => self.clone(),
        }
    }

    /// concatenate `self` and `other` along `dim`, which both must depend on
    pub(crate) fn concatenate(&self, other: &Variable, dim: Dim) -> Option<Variable> {
        let axis = self.axis_of(dim)?;

        if self.dims != other.dims || self.attrs != other.attrs {
            return None;
        }

        let data = ndarray::concatenate(Axis(axis), &[self.data.view(), other.data.view()]).ok()?;

        Some(Variable {
            dims: self.dims.clone(),
            data,
            attrs: self.attrs.clone(),
            grid: self.grid.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn field(nx: usize, ny: usize) -> Variable {
        let arr = Array2::from_shape_fn((nx, ny), |(i, j)| (100 * i + j) as f64);
        Variable::new(vec![Dim::X, Dim::Y], arr.into_dyn()).unwrap()
    }

    #[test]
    fn rejects_mismatched_axis_count() {
        let arr = Array2::<f64>::zeros((2, 3)).into_dyn();
        let out = Variable::new(vec![Dim::X], arr);
        assert_eq!(out.unwrap_err(), DatasetError::AxisCount { dims: 1, axes: 2 });
    }

    #[test]
    fn rejects_repeated_dimension() {
        let arr = Array2::<f64>::zeros((2, 2)).into_dyn();
        let out = Variable::new(vec![Dim::Y, Dim::Y], arr);
        assert_eq!(out.unwrap_err(), DatasetError::RepeatedDimension { dim: Dim::Y });
    }

    #[test]
    fn isel_only_touches_selected_axis() {
        let var = field(4, 6);
        let out = var.isel(Dim::Y, 1..4);

        assert_eq!(out.shape(), &[4, 3]);
        assert_eq!(out.data()[[2, 0]], 201.0);

        let untouched = var.isel(Dim::Z, 0..1);
        assert!(untouched.identical(&var));
    }

    #[test]
    fn profile_takes_first_index_elsewhere() {
        let var = field(3, 5);
        let along_y = var.profile(Dim::Y).unwrap();
        assert_eq!(along_y.to_vec(), vec![0., 1., 2., 3., 4.]);

        let along_x = var.profile(Dim::X).unwrap();
        assert_eq!(along_x.to_vec(), vec![0., 100., 200.]);

        assert!(var.profile(Dim::Z).is_none());
    }

    #[test]
    fn nan_values_are_identical() {
        let a = Variable::scalar(f64::NAN);
        let b = Variable::scalar(f64::NAN);
        assert!(a.identical(&b));
        assert!(!a.identical(&Variable::scalar(1.0)));
    }

    #[test]
    fn concatenate_requires_matching_attributes() {
        let a = field(2, 3).with_attr("units", "m");
        let b = field(2, 3);
        assert!(a.concatenate(&b, Dim::Y).is_none());

        let joined = a.concatenate(&a, Dim::Y).unwrap();
        assert_eq!(joined.shape(), &[2, 6]);
    }
}
