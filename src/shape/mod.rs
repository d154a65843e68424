// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The shape and stride algebra.
//!
//! A [`Shape`] maps a coordinate tuple to a linear offset into a buffer:
//! `offset + Σ index[i] * strides[i]`. Slicing, reshaping, broadcasting and
//! inserting axes all produce new `Shape` values from old ones; none of them
//! touch the data.

use std::cmp::Reverse;
use std::fmt;
use std::ops::Range;

use itertools::izip;
use tracing::trace;

use crate::error::{dimension_mismatch, incompatible_shapes, out_of_bounds, ShapeError};
use crate::slice::{compose_slice_defs, parse_slices, step_overflow, SliceDef, SliceElem};
use crate::Order;

pub use self::iter::Offsets;

mod iter;

/// Bookkeeping for a strided view that could not be collapsed into a plain
/// contiguous alias.
///
/// `base` is the root the view was derived from: a shape with offset 0 over
/// the dimensions of the whole allocation. It never carries a `ViewInfo` of
/// its own, so the chain is one level deep. `slices` holds one normalized
/// selection per axis of `base` such that `base.slice_defs(slices)`
/// reproduces the view. It is `None` once a transform other than slicing (a
/// new axis, an expanded dimension, a reshape or a broadcast) has been
/// applied on the way.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewInfo {
    base: Box<Shape>,
    slices: Option<Vec<SliceDef>>,
}

impl ViewInfo {
    /// The shape this view was sliced from.
    pub fn base(&self) -> &Shape {
        &self.base
    }

    /// The per-axis selections relative to `base`, if still known.
    pub fn slices(&self) -> Option<&[SliceDef]> {
        self.slices.as_deref()
    }
}

/// Axes whose stride was forced to 0 to stretch a length-1 axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BroadcastInfo {
    axes: Vec<bool>,
}

impl BroadcastInfo {
    pub(crate) fn from_flags(axes: Vec<bool>) -> Option<BroadcastInfo> {
        if axes.iter().any(|&a| a) {
            Some(BroadcastInfo { axes })
        } else {
            None
        }
    }

    /// Returns `true` if `axis` was stretched.
    pub fn is_stretched(&self, axis: usize) -> bool {
        self.axes.get(axis).copied().unwrap_or(false)
    }

    /// The stretched axes, in ascending order.
    pub fn stretched_axes(&self) -> impl Iterator<Item = usize> + '_ {
        self.axes
            .iter()
            .enumerate()
            .filter(|(_, &a)| a)
            .map(|(i, _)| i)
    }
}

/// Shape of an n-dimensional view: dimensions, strides (in elements) and the
/// offset of element `(0, 0, ..., 0)` in the underlying buffer.
///
/// A shape with no axes is the scalar shape and addresses exactly one
/// element.
///
/// ```
/// use ndview::Shape;
///
/// let a = Shape::new(vec![3, 4]);
/// let rows = a.slice("1:3").unwrap();
/// assert!(rows.is_contiguous());
/// assert_eq!(rows.offset(), 4);
///
/// let cols = a.slice(":, ::2").unwrap();
/// assert!(!cols.is_contiguous());
/// assert_eq!(cols.strides(), &[4, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    dim: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
    buffer_size: usize,
    order: Order,
    view_info: Option<ViewInfo>,
    /// Root and selections of a slice that collapsed to a contiguous alias.
    lineage: Option<ViewInfo>,
    broadcast_info: Option<BroadcastInfo>,
    writeable: bool,
}

/// One step of a resolved slicing expression.
#[derive(Copy, Clone, Debug)]
enum AxisOp {
    Select(SliceDef),
    Insert,
}

/// C-contiguity as NumPy computes `C_CONTIGUOUS`: scanning from the last
/// axis, every axis longer than 1 must have the stride of the elements
/// after it. Any zero-length axis makes the shape trivially contiguous.
pub(crate) fn c_contiguous(dim: &[usize], strides: &[isize]) -> bool {
    if dim.contains(&0) {
        return true;
    }
    let mut expected = 1isize;
    for (&d, &s) in dim.iter().zip(strides).rev() {
        if d != 1 {
            if s != expected {
                return false;
            }
            expected *= d as isize;
        }
    }
    true
}

fn size_of_dim(dim: &[usize]) -> usize {
    dim.iter().product()
}

impl Shape {
    /// Create a fresh C-ordered shape.
    pub fn new<D: Into<Vec<usize>>>(dim: D) -> Shape {
        Shape::with_order(dim, Order::C)
    }

    /// Create a fresh shape with default strides for `order`.
    pub fn with_order<D: Into<Vec<usize>>>(dim: D, order: Order) -> Shape {
        let dim = dim.into();
        let strides = order.strides_for(&dim);
        let size = size_of_dim(&dim);
        Shape {
            dim,
            strides,
            offset: 0,
            buffer_size: size,
            order,
            view_info: None,
            lineage: None,
            broadcast_info: None,
            writeable: true,
        }
    }

    /// The scalar shape: no axes, one element.
    pub fn scalar() -> Shape {
        Shape::new(Vec::new())
    }

    pub fn vector(len: usize) -> Shape {
        Shape::new(vec![len])
    }

    pub fn matrix(rows: usize, cols: usize) -> Shape {
        Shape::new(vec![rows, cols])
    }

    /// Create a shape from explicit dimensions, strides and offset.
    ///
    /// **Errors** if `dim` and `strides` differ in length, if a negative
    /// stride reaches before offset 0 or if the addressed range does not fit
    /// in `isize`.
    pub fn from_parts<D, S>(dim: D, strides: S, offset: usize) -> Result<Shape, ShapeError>
    where
        D: Into<Vec<usize>>,
        S: Into<Vec<isize>>,
    {
        let dim = dim.into();
        let strides = strides.into();
        if dim.len() != strides.len() {
            return Err(dimension_mismatch(
                "dimensions and strides differ in length",
                dim.len(),
                strides.len(),
            ));
        }
        let stretched = izip!(&dim, &strides).map(|(&d, &s)| s == 0 && d > 1).collect();
        let broadcast_info = BroadcastInfo::from_flags(stretched);
        let mut shape = Shape {
            dim,
            strides,
            offset,
            buffer_size: 0,
            order: Order::C,
            view_info: None,
            lineage: None,
            writeable: broadcast_info.is_none(),
            broadcast_info,
        };
        let reach = izip!(&shape.dim, &shape.strides).try_fold(offset as isize, |acc, (&d, &s)| {
            if d <= 1 {
                return Some(acc);
            }
            isize::try_from(d - 1)
                .ok()?
                .checked_mul(s.checked_abs()?)?
                .checked_add(acc)
        });
        if reach.is_none() || offset > isize::MAX as usize {
            return Err(ShapeError::IncompatibleLayout {
                dim: shape.dim,
                strides: shape.strides,
            });
        }
        match shape.bounds() {
            Some((low, _)) if low < 0 => {
                return Err(ShapeError::IncompatibleLayout {
                    dim: shape.dim,
                    strides: shape.strides,
                })
            }
            Some((_, high)) => shape.buffer_size = high as usize + 1,
            None => shape.buffer_size = offset,
        }
        Ok(shape)
    }

    /// The length of each axis.
    #[inline]
    pub fn dim(&self) -> &[usize] {
        &self.dim
    }

    /// The stride of each axis, in elements.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Offset of element `(0, 0, ..., 0)` in the underlying buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dim.len()
    }

    /// Number of elements; 1 for the scalar shape.
    #[inline]
    pub fn size(&self) -> usize {
        size_of_dim(&self.dim)
    }

    /// Number of elements in the allocation this shape was derived from.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// The order used when this shape (or its base) was constructed.
    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    pub fn view_info(&self) -> Option<&ViewInfo> {
        self.view_info.as_ref()
    }

    pub fn broadcast_info(&self) -> Option<&BroadcastInfo> {
        self.broadcast_info.as_ref()
    }

    /// The shape this one was sliced from, or `self` when it is not a
    /// strided view.
    pub fn base(&self) -> &Shape {
        match self.view_info {
            Some(ref vi) => &vi.base,
            None => self,
        }
    }

    /// The root shape this one was derived from, contiguous aliases
    /// included; `self` for a root.
    pub fn root(&self) -> &Shape {
        match self.ancestry() {
            Some(vi) => &vi.base,
            None => self,
        }
    }

    fn ancestry(&self) -> Option<&ViewInfo> {
        self.view_info.as_ref().or(self.lineage.as_ref())
    }

    /// The root with the selections dropped, for transforms that cannot be
    /// expressed as slices of it.
    fn unsliced_ancestry(&self) -> Option<ViewInfo> {
        self.ancestry().map(|vi| ViewInfo {
            base: vi.base.clone(),
            slices: None,
        })
    }

    /// Whether the elements are laid out in C order without gaps, matching
    /// NumPy's `C_CONTIGUOUS` flag. Broadcast shapes are never contiguous.
    pub fn is_contiguous(&self) -> bool {
        !self.is_broadcasted() && c_contiguous(&self.dim, &self.strides)
    }

    /// Whether this shape covers anything other than its whole buffer from
    /// the start: a non-zero offset, fewer elements or a strided view.
    ///
    /// Stretching axes by broadcasting does not count.
    pub fn is_sliced(&self) -> bool {
        self.view_info.is_some() || self.offset != 0 || self.buffer_size != self.original_size()
    }

    /// Whether an axis longer than 1 has stride 0.
    pub fn is_broadcasted(&self) -> bool {
        izip!(&self.dim, &self.strides).any(|(&d, &s)| s == 0 && d > 1)
    }

    /// Whether every axis has stride 0: a scalar stretched to this shape.
    pub fn is_scalar_broadcast(&self) -> bool {
        !self.strides.is_empty() && self.strides.iter().all(|&s| s == 0)
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dim.is_empty()
    }

    /// Whether the shape has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Broadcast shapes revisit addresses and must not be written through.
    ///
    /// The flag is inherited: slices, reshapes and expansions of a broadcast
    /// shape stay read-only even when no stretched axis survives.
    pub fn is_writeable(&self) -> bool {
        self.writeable
    }

    /// Number of distinct elements before broadcasting.
    pub fn original_size(&self) -> usize {
        izip!(&self.dim, &self.strides)
            .filter(|(_, &s)| s != 0)
            .map(|(&d, _)| d)
            .product()
    }

    /// A fresh C-ordered shape with the same dimensions.
    pub fn clean(&self) -> Shape {
        Shape::new(self.dim.clone())
    }

    /// The half-open range of buffer offsets this shape can address, or
    /// `None` for an empty shape.
    pub fn addressed_range(&self) -> Option<Range<usize>> {
        self.bounds()
            .map(|(low, high)| low.max(0) as usize..high as usize + 1)
    }

    /// Lowest and highest addressed offset.
    fn bounds(&self) -> Option<(isize, isize)> {
        if self.is_empty() {
            return None;
        }
        let mut low = self.offset as isize;
        let mut high = self.offset as isize;
        for (&d, &s) in izip!(&self.dim, &self.strides) {
            let reach = (d as isize - 1) * s;
            if reach < 0 {
                low += reach;
            } else {
                high += reach;
            }
        }
        Some((low, high))
    }

    pub(crate) fn is_stretched(&self, axis: usize) -> bool {
        self.broadcast_info
            .as_ref()
            .map_or(false, |b| b.is_stretched(axis))
    }

    /// Slice with a textual expression such as `"1:9,::-2,7"`.
    ///
    /// See [`parse_slices`](crate::parse_slices) for the grammar.
    pub fn slice(&self, text: &str) -> Result<Shape, ShapeError> {
        self.slice_with(&parse_slices(text)?)
    }

    /// Slice with one item per axis.
    ///
    /// A single `Ellipsis` stands for full slices over the axes the other
    /// items leave out; without one, missing trailing axes are taken whole.
    /// `NewAxis` inserts an axis of length 1 and `Index` drops its axis.
    ///
    /// **Errors** if there are more indexing items than axes, more than one
    /// ellipsis, a zero step or an out of bounds index.
    pub fn slice_with(&self, elems: &[SliceElem]) -> Result<Shape, ShapeError> {
        let ellipses = elems.iter().filter(|e| **e == SliceElem::Ellipsis).count();
        if ellipses > 1 {
            return Err(crate::error::parse_error(
                &crate::slice::format_slices(elems),
                "an index can only have a single ellipsis ('...')",
            ));
        }
        let consumed = elems.iter().filter(|e| e.consumes_axis()).count();
        if consumed > self.ndim() {
            return Err(dimension_mismatch("too many indices", self.ndim(), consumed));
        }
        let fill = self.ndim() - consumed;

        let mut ops = Vec::with_capacity(elems.len() + fill);
        let mut axis = 0;
        for elem in elems {
            match *elem {
                SliceElem::Slice(s) => {
                    ops.push(AxisOp::Select(s.normalize(self.dim[axis])?));
                    axis += 1;
                }
                SliceElem::Index(i) => {
                    ops.push(AxisOp::Select(SliceDef::index(i, axis, self.dim[axis])?));
                    axis += 1;
                }
                SliceElem::NewAxis => ops.push(AxisOp::Insert),
                SliceElem::Ellipsis => {
                    for _ in 0..fill {
                        ops.push(AxisOp::Select(SliceDef::all(self.dim[axis])));
                        axis += 1;
                    }
                }
            }
        }
        while axis < self.ndim() {
            ops.push(AxisOp::Select(SliceDef::all(self.dim[axis])));
            axis += 1;
        }
        self.apply(&ops)
    }

    /// Slice with already normalized selections, one per axis.
    ///
    /// **Errors** if the number of selections differs from `ndim` or a
    /// selection reaches outside its axis.
    pub fn slice_defs(&self, defs: &[SliceDef]) -> Result<Shape, ShapeError> {
        if defs.len() != self.ndim() {
            return Err(dimension_mismatch(
                "one selection per axis is required",
                self.ndim(),
                defs.len(),
            ));
        }
        for (axis, (d, &len)) in izip!(defs, &self.dim).enumerate() {
            if d.is_empty() {
                continue;
            }
            for pos in [d.position(0), d.position(d.count - 1)] {
                if pos < 0 || pos >= len as isize {
                    return Err(out_of_bounds(pos, axis, len));
                }
            }
        }
        let ops: Vec<AxisOp> = defs.iter().map(|&d| AxisOp::Select(d)).collect();
        self.apply(&ops)
    }

    /// Compose this shape with resolved per-axis operations.
    ///
    /// The new offset and strides come from `self` alone: slicing a view
    /// never walks back to its base.
    ///
    /// **Errors** if a step times its stride overflows `isize`.
    fn apply(&self, ops: &[AxisOp]) -> Result<Shape, ShapeError> {
        let mut dim = Vec::with_capacity(ops.len());
        let mut strides = Vec::with_capacity(ops.len());
        let mut stretched = Vec::with_capacity(ops.len());
        let mut offset = self.offset as isize;
        let mut axis = 0;
        for op in ops {
            match *op {
                AxisOp::Insert => {
                    dim.push(1);
                    strides.push(0);
                    stretched.push(false);
                }
                AxisOp::Select(def) => {
                    let stride = self.strides[axis];
                    offset += def.start as isize * stride;
                    if !def.reduce {
                        // the stride of a single element axis is never followed
                        let step_stride = match stride.checked_mul(def.step) {
                            Some(s) => s,
                            None if def.count <= 1 => stride,
                            None => return Err(step_overflow(def.step)),
                        };
                        dim.push(def.count);
                        strides.push(step_stride);
                        stretched.push(self.is_stretched(axis) && def.count > 1);
                    }
                    axis += 1;
                }
            }
        }
        debug_assert!(offset >= 0, "slice offset before the start of the buffer");

        let mut out = Shape {
            dim,
            strides,
            offset: offset.max(0) as usize,
            buffer_size: self.buffer_size,
            order: self.order,
            view_info: None,
            lineage: None,
            broadcast_info: BroadcastInfo::from_flags(stretched),
            writeable: self.writeable,
        };
        if out.is_contiguous() {
            out.strides = Order::C.strides_for(&out.dim);
            out.lineage = Some(self.derive_view_info(ops));
            trace!(dim = ?out.dim, offset = out.offset, "slice collapsed to a contiguous alias");
            return Ok(out);
        }
        out.view_info = Some(self.derive_view_info(ops));
        trace!(dim = ?out.dim, strides = ?out.strides, offset = out.offset, "slice kept as a strided view");
        Ok(out)
    }

    fn derive_view_info(&self, ops: &[AxisOp]) -> ViewInfo {
        let inserts = ops.iter().any(|op| matches!(op, AxisOp::Insert));
        let defs: Vec<SliceDef> = ops
            .iter()
            .filter_map(|op| match *op {
                AxisOp::Select(d) => Some(d),
                AxisOp::Insert => None,
            })
            .collect();
        match self.ancestry() {
            None => ViewInfo {
                base: Box::new(self.clone()),
                slices: if inserts { None } else { Some(defs) },
            },
            Some(vi) => ViewInfo {
                base: vi.base.clone(),
                slices: match vi.slices {
                    Some(ref outer) if !inserts => compose_slice_defs(outer, &defs).ok(),
                    _ => None,
                },
            },
        }
    }

    /// Give the same elements a new shape.
    ///
    /// Strides are recomputed in C order and the offset is kept.
    ///
    /// **Errors** if the sizes differ, or if this shape is not contiguous
    /// (the data would have to be copied first).
    pub fn reshape(&self, dim: &[usize]) -> Result<Shape, ShapeError> {
        if size_of_dim(dim) != self.size() {
            return Err(incompatible_shapes(&self.dim, dim));
        }
        if !self.is_contiguous() {
            return Err(ShapeError::IncompatibleLayout {
                dim: self.dim.clone(),
                strides: self.strides.clone(),
            });
        }
        Ok(Shape {
            dim: dim.to_vec(),
            strides: Order::C.strides_for(dim),
            offset: self.offset,
            buffer_size: self.buffer_size,
            order: Order::C,
            view_info: None,
            lineage: self.unsliced_ancestry(),
            broadcast_info: None,
            writeable: self.writeable,
        })
    }

    /// Like [`reshape`](Self::reshape), but one entry may be `-1` and is
    /// inferred from the size.
    pub fn reshape_infer(&self, dim: &[isize]) -> Result<Shape, ShapeError> {
        let size = self.size();
        let bad = || ShapeError::IncompatibleShape {
            from: self.dim.clone(),
            to: dim.iter().map(|&d| d.max(0) as usize).collect(),
        };
        let mut missing = None;
        let mut known = 1usize;
        for (axis, &d) in dim.iter().enumerate() {
            match d {
                -1 if missing.is_none() => missing = Some(axis),
                d if d >= 0 => known *= d as usize,
                _ => return Err(bad()),
            }
        }
        let mut resolved: Vec<usize> = dim.iter().map(|&d| d.max(0) as usize).collect();
        if let Some(axis) = missing {
            if known == 0 || size % known != 0 {
                return Err(bad());
            }
            resolved[axis] = size / known;
        }
        self.reshape(&resolved)
    }

    /// Insert an axis of length 1 at `axis`; a negative `axis` counts from
    /// the end, `-1` appending after the last axis.
    ///
    /// No addressed offset changes.
    pub fn expand_dimension(&self, axis: isize) -> Result<Shape, ShapeError> {
        let ndim = self.ndim() as isize;
        let ax = if axis < 0 { axis + ndim + 1 } else { axis };
        if ax < 0 || ax > ndim {
            return Err(out_of_bounds(axis, 0, self.ndim() + 1));
        }
        let ax = ax as usize;
        let stride = match self.dim.get(ax) {
            Some(&d) => self.strides[ax] * d as isize,
            None => 1,
        };
        let mut out = self.clone();
        out.dim.insert(ax, 1);
        out.strides.insert(ax, stride);
        if let Some(ref mut b) = out.broadcast_info {
            b.axes.insert(ax, false);
        }
        if let Some(ref mut vi) = out.view_info {
            vi.slices = None;
        }
        if let Some(ref mut vi) = out.lineage {
            vi.slices = None;
        }
        Ok(out)
    }

    /// Buffer offset of the element at `index`:
    /// `offset + Σ index[i] * strides[i]`.
    ///
    /// **Errors** if `index` has the wrong length or is out of bounds.
    pub fn get_offset(&self, index: &[usize]) -> Result<usize, ShapeError> {
        if index.len() != self.ndim() {
            return Err(dimension_mismatch("wrong number of indices", self.ndim(), index.len()));
        }
        for (axis, (&i, &d)) in izip!(index, &self.dim).enumerate() {
            if i >= d {
                return Err(out_of_bounds(i as isize, axis, d));
            }
        }
        Ok(self.offset_unchecked(index))
    }

    /// Like [`get_offset`](Self::get_offset) but negative coordinates count
    /// from the end of their axis.
    pub fn get_offset_signed(&self, index: &[isize]) -> Result<usize, ShapeError> {
        if index.len() != self.ndim() {
            return Err(dimension_mismatch("wrong number of indices", self.ndim(), index.len()));
        }
        let mut resolved = Vec::with_capacity(index.len());
        for (axis, (&i, &d)) in izip!(index, &self.dim).enumerate() {
            resolved.push(SliceDef::index(i, axis, d)?.start);
        }
        Ok(self.offset_unchecked(&resolved))
    }

    /// The offset formula without any checks.
    ///
    /// `index` must be in bounds for the result to be meaningful.
    #[inline]
    pub fn offset_unchecked(&self, index: &[usize]) -> usize {
        debug_assert_eq!(index.len(), self.ndim());
        let mut offset = self.offset as isize;
        for (&i, &s) in izip!(index, &self.strides) {
            offset += i as isize * s;
        }
        offset as usize
    }

    /// Coordinates of the `i`th element in logical row-major order.
    pub fn unravel_index(&self, i: usize) -> Result<Vec<usize>, ShapeError> {
        let size = self.size();
        if i >= size {
            return Err(out_of_bounds(i as isize, 0, size));
        }
        let mut index = vec![0; self.ndim()];
        let mut rest = i;
        for (ix, &d) in index.iter_mut().zip(&self.dim).rev() {
            *ix = rest % d;
            rest /= d;
        }
        Ok(index)
    }

    /// Buffer offset of the `i`th element in logical row-major order.
    pub fn transform_offset(&self, i: usize) -> Result<usize, ShapeError> {
        if self.is_contiguous() {
            let size = self.size();
            if i >= size {
                return Err(out_of_bounds(i as isize, 0, size));
            }
            return Ok(self.offset + i);
        }
        let index = self.unravel_index(i)?;
        Ok(self.offset_unchecked(&index))
    }

    /// Invert [`get_offset`](Self::get_offset): the coordinates that address
    /// the buffer offset `offset`.
    ///
    /// Broadcast axes always map to coordinate 0.
    ///
    /// **Errors** if the offset is not addressed by this shape.
    pub fn coordinates_from_offset(&self, offset: usize) -> Result<Vec<usize>, ShapeError> {
        let not_addressed = || out_of_bounds(offset as isize, 0, self.buffer_size);
        if self.is_empty() {
            return Err(not_addressed());
        }
        let mut rest = offset as isize - self.offset as isize;
        let mut axes: Vec<usize> = (0..self.ndim())
            .filter(|&a| self.dim[a] > 1 && self.strides[a] != 0)
            .collect();
        // count reversed axes from their far end so every term is positive
        for &a in &axes {
            if self.strides[a] < 0 {
                rest -= (self.dim[a] as isize - 1) * self.strides[a];
            }
        }
        axes.sort_by_key(|&a| Reverse(self.strides[a].abs()));

        let mut index = vec![0; self.ndim()];
        for a in axes {
            let stride = self.strides[a].abs();
            if rest < 0 {
                return Err(not_addressed());
            }
            let c = (rest / stride) as usize;
            if c >= self.dim[a] {
                return Err(not_addressed());
            }
            rest -= c as isize * stride;
            index[a] = if self.strides[a] < 0 { self.dim[a] - 1 - c } else { c };
        }
        if rest != 0 {
            return Err(not_addressed());
        }
        Ok(index)
    }

    /// Iterate over the buffer offsets of all elements in logical order.
    pub fn offsets(&self) -> Offsets<'_> {
        Offsets::new(self)
    }

    pub(crate) fn with_broadcast(
        &self,
        dim: Vec<usize>,
        strides: Vec<isize>,
        stretched: Vec<bool>,
    ) -> Shape {
        let view_info = self.view_info.as_ref().map(|vi| ViewInfo {
            base: vi.base.clone(),
            slices: None,
        });
        let lineage = match view_info {
            Some(_) => None,
            None => Some(self.unsliced_ancestry().unwrap_or_else(|| ViewInfo {
                base: Box::new(self.clone()),
                slices: None,
            })),
        };
        let broadcast_info = BroadcastInfo::from_flags(stretched);
        Shape {
            dim,
            strides,
            offset: self.offset,
            buffer_size: self.buffer_size,
            order: self.order,
            view_info,
            lineage,
            writeable: self.writeable && broadcast_info.is_none(),
            broadcast_info,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dim.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        if self.dim.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dim: Vec<usize>) -> Shape {
        Shape::new(dim)
    }
}

impl From<&[usize]> for Shape {
    fn from(dim: &[usize]) -> Shape {
        Shape::new(dim.to_vec())
    }
}
