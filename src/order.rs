// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// Array order
///
/// Order refers to how a linear sequence of elements is laid out as a
/// multi-dimensional array when a fresh shape is constructed.
///
/// - `RowMajor` means that the index along the last axis is the most rapidly changing
/// - `ColumnMajor` means that the index along the first axis is the most rapidly changing
///
/// Given a sequence like: 1, 2, 3, 4, 5, 6
///
/// If it is laid it out in a 2 x 3 matrix using row major ordering, it results in:
///
/// ```text
/// 1  2  3
/// 4  5  6
/// ```
///
/// If it is laid using column major ordering, it results in:
///
/// ```text
/// 1  3  5
/// 2  4  6
/// ```
///
/// Row major is called "C" order and column major is called "F" order.
/// The order only matters when *constructing* a shape; views derived by
/// slicing carry explicit strides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
    /// Row major or "C" order
    #[default]
    RowMajor,
    /// Column major or "F" order
    ColumnMajor,
}

impl Order {
    /// "C" is an alias for row major ordering
    pub const C: Order = Order::RowMajor;

    /// "F" (for Fortran) is an alias for column major ordering
    pub const F: Order = Order::ColumnMajor;

    /// Return true if input is Order::RowMajor, false otherwise
    #[inline]
    pub fn is_row_major(self) -> bool {
        match self {
            Order::RowMajor => true,
            Order::ColumnMajor => false,
        }
    }

    /// Return true if input is Order::ColumnMajor, false otherwise
    #[inline]
    pub fn is_column_major(self) -> bool {
        !self.is_row_major()
    }

    /// The one-letter NumPy tag, `'C'` or `'F'`.
    pub fn as_char(self) -> char {
        match self {
            Order::RowMajor => 'C',
            Order::ColumnMajor => 'F',
        }
    }

    /// Compute the default strides (in elements) for `dim` in this order.
    ///
    /// Shape (a, b, c) => strides (b * c, c, 1) in C order and
    /// (1, a, a * b) in F order. An empty shape gets empty strides.
    pub fn strides_for(self, dim: &[usize]) -> Vec<isize> {
        let mut strides = vec![0isize; dim.len()];
        // zero-length axes count as 1, like NumPy
        let mut cum_prod = 1isize;
        match self {
            Order::RowMajor => {
                for (s, &d) in strides.iter_mut().zip(dim).rev() {
                    *s = cum_prod;
                    cum_prod *= d.max(1) as isize;
                }
            }
            Order::ColumnMajor => {
                for (s, &d) in strides.iter_mut().zip(dim) {
                    *s = cum_prod;
                    cum_prod *= d.max(1) as isize;
                }
            }
        }
        strides
    }
}
