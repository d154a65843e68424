// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Views: a storage handle paired with a shape.

use std::fmt;

use itertools::izip;
use num_traits::FromPrimitive;
use rawpointer::PointerExt;
use tracing::debug;

use crate::error::{dimension_mismatch, incompatible_shapes, out_of_bounds, ShapeError};
use crate::slice::SliceElem;
use crate::{DType, Element, Shape, Storage};

/// An n-dimensional view of a [`Storage`].
///
/// Cloning a view, slicing it, reshaping a contiguous view and broadcasting
/// all produce new views of the *same* storage: writes through any of them
/// are visible through all of them. Only [`flatten`](Self::flatten),
/// [`to_owned_copy`](Self::to_owned_copy) and copying fallbacks allocate.
///
/// ```
/// use ndview::View;
///
/// let a = View::<i64>::arange(12).unwrap().reshape(&[3, 4]).unwrap();
/// let rows = a.slice("1:3").unwrap();
/// assert!(rows.is_contiguous());
///
/// rows.set(&[0, 0], 100).unwrap();
/// assert_eq!(a.get(&[1, 0]).unwrap(), 100);
/// ```
#[derive(Clone)]
pub struct View<A> {
    storage: Storage<A>,
    shape: Shape,
}

impl<A: Element> View<A> {
    /// Create a C-ordered view over the elements of `v`.
    ///
    /// **Errors** if `v` does not have exactly as many elements as `dim`
    /// describes.
    pub fn from_shape_vec<D: Into<Vec<usize>>>(dim: D, v: Vec<A>) -> Result<Self, ShapeError> {
        let shape = Shape::new(dim);
        if shape.size() != v.len() {
            return Err(incompatible_shapes(&[v.len()], shape.dim()));
        }
        Ok(View {
            storage: Storage::from_vec(v),
            shape,
        })
    }

    pub fn zeros<D: Into<Vec<usize>>>(dim: D) -> Self {
        let shape = Shape::new(dim);
        View {
            storage: Storage::zeros(shape.size()),
            shape,
        }
    }

    pub fn from_elem<D: Into<Vec<usize>>>(dim: D, elem: A) -> Self {
        let shape = Shape::new(dim);
        View {
            storage: Storage::from_elem(shape.size(), elem),
            shape,
        }
    }

    /// A one-dimensional view of `0, 1, ..., n - 1`.
    ///
    /// **Errors** if `n - 1` does not fit in the element type.
    pub fn arange(n: usize) -> Result<Self, ShapeError>
    where
        A: FromPrimitive,
    {
        let mut v = Vec::with_capacity(n);
        for i in 0..n {
            match A::from_usize(i) {
                Some(x) => v.push(x),
                None => {
                    return Err(dimension_mismatch(
                        "range does not fit in the element type",
                        i,
                        n,
                    ))
                }
            }
        }
        View::from_shape_vec(vec![n], v)
    }

    /// Pair an existing storage with a shape.
    ///
    /// **Errors** if the shape addresses elements outside the storage.
    pub fn from_storage(storage: Storage<A>, shape: Shape) -> Result<Self, ShapeError> {
        if let Some(range) = shape.addressed_range() {
            if range.end > storage.len() {
                return Err(out_of_bounds(range.end as isize - 1, 0, storage.len()));
            }
        }
        Ok(View { storage, shape })
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn storage(&self) -> &Storage<A> {
        &self.storage
    }

    #[inline]
    pub fn dim(&self) -> &[usize] {
        self.shape.dim()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        A::DTYPE
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.shape.is_contiguous()
    }

    fn with_shape(&self, shape: Shape) -> Self {
        View {
            storage: self.storage.clone(),
            shape,
        }
    }

    /// Slice with a textual expression such as `"1:9,::-2,7"`.
    pub fn slice(&self, text: &str) -> Result<Self, ShapeError> {
        Ok(self.with_shape(self.shape.slice(text)?))
    }

    /// Slice with one item per axis, usually built with [`s!`](crate::s).
    pub fn slice_with(&self, elems: &[SliceElem]) -> Result<Self, ShapeError> {
        Ok(self.with_shape(self.shape.slice_with(elems)?))
    }

    /// Reshape without copying.
    ///
    /// **Errors** if the view is not contiguous; use
    /// [`to_shape`](Self::to_shape) to allow a copy.
    pub fn reshape(&self, dim: &[usize]) -> Result<Self, ShapeError> {
        Ok(self.with_shape(self.shape.reshape(dim)?))
    }

    /// Reshape with one dimension given as `-1` and inferred.
    pub fn reshape_infer(&self, dim: &[isize]) -> Result<Self, ShapeError> {
        Ok(self.with_shape(self.shape.reshape_infer(dim)?))
    }

    /// Reshape, copying the elements first if the view is not contiguous.
    pub fn to_shape(&self, dim: &[usize]) -> Result<Self, ShapeError> {
        if self.shape.size() != dim.iter().product::<usize>() {
            return Err(incompatible_shapes(self.dim(), dim));
        }
        if self.is_contiguous() {
            return self.reshape(dim);
        }
        debug!(from = ?self.dim(), to = ?dim, "reshape needs a copy");
        View::from_shape_vec(dim.to_vec(), self.to_vec())
    }

    /// Insert an axis of length 1.
    pub fn expand_dims(&self, axis: isize) -> Result<Self, ShapeError> {
        Ok(self.with_shape(self.shape.expand_dimension(axis)?))
    }

    /// A read-only view stretched to `dim`.
    pub fn broadcast_to(&self, dim: &[usize]) -> Result<Self, ShapeError> {
        Ok(self.with_shape(self.shape.broadcast_to(dim)?))
    }

    /// A one-dimensional view of the elements in logical order.
    ///
    /// Contiguous views are aliased; anything else is copied, so writes to
    /// the result of raveling a strided view do not reach `self`.
    pub fn ravel(&self) -> Self {
        if let Ok(shape) = self.shape.reshape(&[self.len()]) {
            return self.with_shape(shape);
        }
        self.flatten()
    }

    /// A one-dimensional copy of the elements in logical order.
    pub fn flatten(&self) -> Self {
        debug!(dim = ?self.dim(), "flatten copies");
        View {
            storage: Storage::from_vec(self.to_vec()),
            shape: Shape::vector(self.len()),
        }
    }

    /// A fresh C-ordered copy with its own storage.
    pub fn to_owned_copy(&self) -> Self {
        debug!(dim = ?self.dim(), "view copied");
        View {
            storage: Storage::from_vec(self.to_vec()),
            shape: self.shape.clean(),
        }
    }

    /// The exact storage window of a contiguous view.
    ///
    /// Returns `None` if the view is not contiguous.
    pub fn contiguous_storage(&self) -> Option<Storage<A>> {
        if !self.is_contiguous() {
            return None;
        }
        if self.is_empty() {
            return self.storage.slice(0, 0).ok();
        }
        self.storage.slice(self.shape.offset(), self.len()).ok()
    }

    /// Read the element at `index`.
    pub fn get(&self, index: &[usize]) -> Result<A, ShapeError> {
        let offset = self.shape.get_offset(index)?;
        self.storage.get_at_offset(offset)
    }

    /// Read the element at `index`; negative coordinates count from the end.
    pub fn get_signed(&self, index: &[isize]) -> Result<A, ShapeError> {
        let offset = self.shape.get_offset_signed(index)?;
        self.storage.get_at_offset(offset)
    }

    /// Read the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must have one in bounds entry per axis.
    #[inline]
    pub unsafe fn uget(&self, index: &[usize]) -> A {
        debug_assert!(self.shape.get_offset(index).is_ok());
        let mut ptr = self.storage.as_ptr().add(self.shape.offset()) as *const A;
        for (&i, &s) in izip!(index, self.shape.strides()) {
            ptr = ptr.stride_offset(s, i);
        }
        *ptr
    }

    fn check_writeable(&self) -> Result<(), ShapeError> {
        if self.shape.is_writeable() {
            Ok(())
        } else {
            Err(ShapeError::NotWriteable {
                dim: self.dim().to_vec(),
            })
        }
    }

    /// Write the element at `index`; visible through every alias.
    pub fn set(&self, index: &[usize], value: A) -> Result<(), ShapeError> {
        self.check_writeable()?;
        let offset = self.shape.get_offset(index)?;
        self.storage.set_at_offset(offset, value)
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: A) -> Result<(), ShapeError> {
        self.check_writeable()?;
        if let Some(window) = self.contiguous_storage() {
            window.copy_from_slice(&vec![value; window.len()])?;
            return Ok(());
        }
        for offset in self.shape.offsets() {
            self.storage.store(offset, value);
        }
        Ok(())
    }

    /// Copy the elements of `rhs` into `self`, broadcasting `rhs` to the
    /// dimensions of `self`.
    ///
    /// The source is read completely before anything is written, so `rhs`
    /// may overlap `self`.
    pub fn assign(&self, rhs: &View<A>) -> Result<(), ShapeError> {
        self.check_writeable()?;
        let rhs = rhs.broadcast_to(self.dim())?;
        let values = rhs.to_vec();
        for (offset, v) in izip!(self.shape.offsets(), values) {
            self.storage.store(offset, v);
        }
        Ok(())
    }

    /// Iterate over copies of the elements in logical order.
    pub fn iter(&self) -> impl Iterator<Item = A> + '_ {
        self.shape.offsets().map(move |o| self.storage.load(o))
    }

    /// The elements in logical order.
    pub fn to_vec(&self) -> Vec<A> {
        match self.contiguous_storage() {
            Some(window) => window.to_vec(),
            None => self.iter().collect(),
        }
    }

    /// Return true if both views address the same storage buffer.
    pub fn shares_storage(&self, other: &View<A>) -> bool {
        self.storage.shares_buffer_with(&other.storage)
    }
}

/// Broadcast two views to their common dimensions.
///
/// Both results alias their inputs' storage.
pub fn broadcast_views<A: Element>(
    a: &View<A>,
    b: &View<A>,
) -> Result<(View<A>, View<A>), ShapeError> {
    let (sa, sb) = crate::broadcast(a.shape(), b.shape())?;
    Ok((a.with_shape(sa), b.with_shape(sb)))
}

impl<A: Element> fmt::Debug for View<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("shape", &self.shape)
            .field("data", &self.to_vec())
            .finish()
    }
}

/// Nested list formatting, `[[0, 1], [2, 3]]`.
impl<A: Element> fmt::Display for View<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.to_vec();
        if self.ndim() == 0 {
            return match values.first() {
                Some(v) => write!(f, "{:?}", v),
                None => Ok(()),
            };
        }
        fmt_axis(f, self.dim(), &values)
    }
}

fn fmt_axis<A: fmt::Debug>(f: &mut fmt::Formatter<'_>, dim: &[usize], values: &[A]) -> fmt::Result {
    write!(f, "[")?;
    match dim {
        [] => {}
        [_] => {
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", v)?;
            }
        }
        [len, rest @ ..] => {
            let chunk = rest.iter().product::<usize>();
            for i in 0..*len {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_axis(f, rest, &values[i * chunk..(i + 1) * chunk])?;
            }
        }
    }
    write!(f, "]")
}
