// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Broadcasting of shapes.
//!
//! Uses the [NumPy broadcasting rules]
//! (https://numpy.org/doc/stable/user/basics.broadcasting.html#general-broadcasting-rules):
//! shapes are aligned at their last axis, and along each axis the lengths
//! must be equal or one of them must be 1.

use itertools::izip;

use crate::error::{incompatible_shapes, ShapeError};
use crate::Shape;

/// Calculate the common shape a pair of shapes can be broadcast to.
fn co_broadcast(shape1: &[usize], shape2: &[usize]) -> Result<Vec<usize>, ShapeError> {
    let (k, overflow) = shape1.len().overflowing_sub(shape2.len());
    // Swap the order if shape2 is longer.
    if overflow {
        return co_broadcast(shape2, shape1);
    }
    let mut out = shape1.to_vec();
    for (out, &s2) in izip!(&mut out[k..], shape2) {
        if *out != s2 {
            if *out == 1 {
                *out = s2
            } else if s2 != 1 {
                return Err(incompatible_shapes(shape1, shape2));
            }
        }
    }
    Ok(out)
}

/// Resolve the dimensions that all of `shapes` broadcast to.
///
/// No shapes at all broadcast to the scalar shape.
///
/// ```
/// use ndview::broadcast_shape;
///
/// let out = broadcast_shape(&[&[8, 1, 6, 1], &[7, 1, 5]]).unwrap();
/// assert_eq!(out, vec![8, 7, 6, 5]);
/// assert!(broadcast_shape(&[&[3], &[4]]).is_err());
/// ```
pub fn broadcast_shape(shapes: &[&[usize]]) -> Result<Vec<usize>, ShapeError> {
    let mut out = Vec::new();
    for &dim in shapes {
        out = co_broadcast(&out, dim)?;
    }
    Ok(out)
}

/// Broadcast two shapes against each other.
///
/// Both results have the common dimensions; axes that were stretched or
/// prepended have stride 0 and the offsets are unchanged.
pub fn broadcast(a: &Shape, b: &Shape) -> Result<(Shape, Shape), ShapeError> {
    let dim = co_broadcast(a.dim(), b.dim())?;
    Ok((a.broadcast_to(&dim)?, b.broadcast_to(&dim)?))
}

/// Broadcast any number of shapes to their common dimensions.
pub fn broadcast_all(shapes: &[&Shape]) -> Result<Vec<Shape>, ShapeError> {
    let dims: Vec<&[usize]> = shapes.iter().map(|s| s.dim()).collect();
    let dim = broadcast_shape(&dims)?;
    shapes.iter().map(|s| s.broadcast_to(&dim)).collect()
}

impl Shape {
    /// Broadcast this shape to `dim`, like `np.broadcast_to`.
    ///
    /// Only this shape is stretched: every axis must either equal the
    /// target length or be 1, and leading axes may be missing.
    ///
    /// **Errors** if the shape can not be broadcast to `dim`.
    pub fn broadcast_to(&self, dim: &[usize]) -> Result<Shape, ShapeError> {
        if dim.len() < self.ndim() {
            return Err(incompatible_shapes(self.dim(), dim));
        }
        let k = dim.len() - self.ndim();
        let mut strides = vec![0isize; dim.len()];
        let mut stretched = vec![false; dim.len()];
        for (axis, &len) in dim.iter().enumerate() {
            if axis < k {
                stretched[axis] = len > 1;
                continue;
            }
            let own = axis - k;
            let (d, s) = (self.dim()[own], self.strides()[own]);
            if d == len {
                strides[axis] = s;
                stretched[axis] = self.is_stretched(own);
            } else if d == 1 {
                stretched[axis] = len > 1;
            } else {
                return Err(incompatible_shapes(self.dim(), dim));
            }
        }
        if dim == self.dim() && !stretched.iter().any(|&s| s) {
            return Ok(self.clone());
        }
        Ok(self.with_broadcast(dim.to_vec(), strides, stretched))
    }
}
