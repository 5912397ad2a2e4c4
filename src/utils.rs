use crate::InvalidScalar;

use ndarray::ArrayD;
use num_traits::ToPrimitive;

/// element-wise equality of two arrays of the same shape, treating NaN as equal to NaN
///
/// guard cells are routinely filled with NaN, so plain `==` would never consider two
/// copies of the same grid field equal
pub(crate) fn arrays_identical(a: &ArrayD<f64>, b: &ArrayD<f64>) -> bool {
    a.shape() == b.shape()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
}

/// the integer held in a floating point scalar, if it is one
pub(crate) fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        value.to_i64()
    } else {
        None
    }
}

/// read an integer grid constant such as a separatrix index
pub(crate) fn index(name: &str, value: f64) -> crate::Result<i64> {
    integral(value).ok_or_else(|| InvalidScalar::new(name.into(), value, "an integer").into())
}

/// read a guard-cell width or other count
pub(crate) fn width(name: &str, value: f64) -> crate::Result<usize> {
    integral(value)
        .and_then(|v| v.to_usize())
        .ok_or_else(|| InvalidScalar::new(name.into(), value, "a non-negative integer").into())
}
