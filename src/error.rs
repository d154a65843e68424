// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

/// An error related to slicing, indexing, shape or layout.
///
/// Every variant maps to a stable [`ErrorKind`], which is what callers
/// should match on; the payloads exist for the error message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// malformed slice expression
    #[error("invalid slice expression `{text}`: {reason}")]
    Parse { text: String, reason: &'static str },
    /// scalar index outside `[-len, len - 1]`, or an offset the shape does not address
    #[error("index {index} is out of bounds for axis {axis} with size {len}")]
    IndexOutOfBounds { index: isize, axis: usize, len: usize },
    /// shapes that can not be broadcast or reshaped into each other
    #[error("incompatible shapes, attempted from: {from:?}, to: {to:?}")]
    IncompatibleShape { from: Vec<usize>, to: Vec<usize> },
    /// the memory layout does not allow the operation without a copy
    #[error("incompatible layout (not contiguous) for shape {dim:?} with strides {strides:?}")]
    IncompatibleLayout { dim: Vec<usize>, strides: Vec<isize> },
    /// wrong number of axes, strides or coordinates
    #[error("dimension mismatch: {reason} (expected {expected}, got {got})")]
    Dimension { reason: &'static str, expected: usize, got: usize },
    /// write through a broadcast view
    #[error("assignment destination is read-only (broadcast view of shape {dim:?})")]
    NotWriteable { dim: Vec<usize> },
}

/// Error code for a [`ShapeError`].
///
/// This enumeration is not exhaustive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// malformed slice text, zero step, duplicate ellipsis
    Parse,
    /// index out of bounds
    IndexOutOfBounds,
    /// incompatible shapes
    IncompatibleShape,
    /// incompatible layout: not contiguous
    IncompatibleLayout,
    /// axis count mismatch
    Dimension,
    /// write to a broadcast view
    NotWriteable,
}

impl ShapeError {
    /// Return the `ErrorKind` of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match *self {
            ShapeError::Parse { .. } => ErrorKind::Parse,
            ShapeError::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
            ShapeError::IncompatibleShape { .. } => ErrorKind::IncompatibleShape,
            ShapeError::IncompatibleLayout { .. } => ErrorKind::IncompatibleLayout,
            ShapeError::Dimension { .. } => ErrorKind::Dimension,
            ShapeError::NotWriteable { .. } => ErrorKind::NotWriteable,
        }
    }

    /// Return `true` for the shape-mismatch family (incompatible shapes or layout).
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::IncompatibleShape | ErrorKind::IncompatibleLayout
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            ErrorKind::Parse => "parse error",
            ErrorKind::IndexOutOfBounds => "index out of bounds",
            ErrorKind::IncompatibleShape => "incompatible shapes",
            ErrorKind::IncompatibleLayout => "incompatible layout (not contiguous)",
            ErrorKind::Dimension => "dimension mismatch",
            ErrorKind::NotWriteable => "not writeable",
        };
        f.write_str(s)
    }
}

pub(crate) fn parse_error(text: &str, reason: &'static str) -> ShapeError {
    ShapeError::Parse {
        text: text.to_owned(),
        reason,
    }
}

pub(crate) fn incompatible_shapes(from: &[usize], to: &[usize]) -> ShapeError {
    ShapeError::IncompatibleShape {
        from: from.to_vec(),
        to: to.to_vec(),
    }
}

pub(crate) fn out_of_bounds(index: isize, axis: usize, len: usize) -> ShapeError {
    ShapeError::IndexOutOfBounds { index, axis, len }
}

pub(crate) fn dimension_mismatch(reason: &'static str, expected: usize, got: usize) -> ShapeError {
    ShapeError::Dimension {
        reason,
        expected,
        got,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(parse_error("x", "not an integer").kind(), ErrorKind::Parse);
        assert_eq!(out_of_bounds(10, 0, 3).kind(), ErrorKind::IndexOutOfBounds);
        assert!(incompatible_shapes(&[3], &[4]).is_shape_mismatch());
        assert!(!dimension_mismatch("too many indices", 2, 3).is_shape_mismatch());
    }

    #[test]
    fn messages() {
        let e = out_of_bounds(-11, 1, 10);
        assert_eq!(e.to_string(), "index -11 is out of bounds for axis 1 with size 10");
        let e = incompatible_shapes(&[3, 1], &[2, 4]);
        assert_eq!(
            e.to_string(),
            "incompatible shapes, attempted from: [3, 1], to: [2, 4]"
        );
        assert_eq!(ErrorKind::IncompatibleLayout.to_string(), "incompatible layout (not contiguous)");
    }
}
