// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use std::num::IntErrorKind;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::str::FromStr;

use crate::error::{dimension_mismatch, out_of_bounds, parse_error, ShapeError};

/// A slice (range with step size).
///
/// Negative `start` or `end` indexes are counted from the back of the axis.
/// A missing bound extends to the end of the axis in the direction of
/// `step`, exactly like a Python slice.
///
/// ## Examples
///
/// `Slice::new(None, None, 1)` is the full range of an axis. It can also be
/// created with `Slice::from(..)`. The Python equivalent is `[:]`.
///
/// `Slice::new(Some(a), Some(b), 2)` is every second element from `a` until
/// `b`. It can also be created with `Slice::from(a..b).step_by(2)`. The
/// Python equivalent is `[a:b:2]`.
///
/// `Slice::new(None, None, -1)` is every element in reverse order. The
/// Python equivalent is `[::-1]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slice {
    pub start: Option<isize>,
    pub end: Option<isize>,
    pub step: isize,
}

impl Slice {
    /// The full range of an axis, `:`.
    pub const ALL: Slice = Slice {
        start: None,
        end: None,
        step: 1,
    };

    /// Create a new `Slice` with the given extents.
    ///
    /// `step` must be nonzero.
    /// (This method checks with a debug assertion that `step` is not zero.)
    pub fn new(start: Option<isize>, end: Option<isize>, step: isize) -> Slice {
        debug_assert_ne!(step, 0, "Slice::new: step must be nonzero");
        Slice { start, end, step }
    }

    /// Create a new `Slice` with the given step size (multiplied with the
    /// previous step size, saturating at the bounds of `isize`).
    ///
    /// `step` must be nonzero.
    /// (This method checks with a debug assertion that `step` is not zero.)
    #[inline]
    pub fn step_by(self, step: isize) -> Self {
        debug_assert_ne!(step, 0, "Slice::step_by: step must be nonzero");
        Slice {
            step: self.step.saturating_mul(step),
            ..self
        }
    }

    /// Returns `true` if this is `:`.
    pub fn is_full(&self) -> bool {
        *self == Slice::ALL
    }

    /// Normalize against an axis of length `axis_len`.
    ///
    /// Out of range bounds are clamped, never an error; a selection whose
    /// bounds are ordered against the step is empty. The only failure is a
    /// zero step.
    pub fn normalize(&self, axis_len: usize) -> Result<SliceDef, ShapeError> {
        let step = self.step;
        if step == 0 {
            return Err(parse_error(&self.to_string(), "slice step cannot be zero"));
        }
        let len = axis_len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let start = match self.start {
            Some(s) => clamp(s),
            None if step < 0 => upper,
            None => lower,
        };
        let end = match self.end {
            Some(e) => clamp(e),
            None if step < 0 => lower,
            None => upper,
        };
        let count = if step < 0 {
            if end < start {
                (start - end - 1) as usize / step.unsigned_abs() + 1
            } else {
                0
            }
        } else if start < end {
            (end - start - 1) as usize / step.unsigned_abs() + 1
        } else {
            0
        };
        if count == 0 {
            return Ok(SliceDef::EMPTY);
        }
        Ok(SliceDef {
            start: start as usize,
            step,
            count,
            reduce: false,
        })
    }
}

impl Default for Slice {
    fn default() -> Self {
        Slice::ALL
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{}", end)?;
        }
        if self.step != 1 {
            write!(f, ":{}", self.step)?;
        }
        Ok(())
    }
}

macro_rules! impl_slice_from_index_type {
    ($index:ty) => {
        impl From<Range<$index>> for Slice {
            #[inline]
            fn from(r: Range<$index>) -> Slice {
                Slice::new(Some(r.start as isize), Some(r.end as isize), 1)
            }
        }

        impl From<RangeFrom<$index>> for Slice {
            #[inline]
            fn from(r: RangeFrom<$index>) -> Slice {
                Slice::new(Some(r.start as isize), None, 1)
            }
        }

        impl From<RangeTo<$index>> for Slice {
            #[inline]
            fn from(r: RangeTo<$index>) -> Slice {
                Slice::new(None, Some(r.end as isize), 1)
            }
        }
    };
}

impl_slice_from_index_type!(isize);
impl_slice_from_index_type!(usize);
impl_slice_from_index_type!(i32);

impl From<RangeFull> for Slice {
    #[inline]
    fn from(_: RangeFull) -> Slice {
        Slice::ALL
    }
}

/// Token for inserting a new axis of length 1, `np.newaxis`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NewAxis;

/// One item of a slicing expression: a range with step, an index, a new
/// axis or an ellipsis.
///
/// ## Examples
///
/// `SliceElem::Index(a)` is the index `a` and removes the axis from the
/// result. The Python equivalent is `[a]`.
///
/// `SliceElem::Slice(Slice::ALL)` is the full range of an axis. The Python
/// equivalent is `[:]`.
///
/// `SliceElem::NewAxis` inserts an axis of length 1, `[np.newaxis]`.
///
/// `SliceElem::Ellipsis` stands for as many `:` as needed to cover the axes
/// not named by the other items, `[...]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SliceElem {
    /// A range with step size.
    Slice(Slice),
    /// A single index; the axis is dropped.
    Index(isize),
    /// A new axis of length 1.
    NewAxis,
    /// Full slices for every axis not otherwise named.
    Ellipsis,
}

impl SliceElem {
    /// Returns `true` if `self` is a `Slice` value.
    pub fn is_slice(&self) -> bool {
        matches!(self, SliceElem::Slice(_))
    }

    /// Returns `true` if `self` is an `Index` value.
    pub fn is_index(&self) -> bool {
        matches!(self, SliceElem::Index(_))
    }

    /// Returns `true` if `self` consumes an axis of the sliced shape.
    pub fn consumes_axis(&self) -> bool {
        self.is_slice() || self.is_index()
    }

    /// Returns a new `SliceElem` with the given step size (multiplied with
    /// the previous step size). Has no effect on anything but `Slice`.
    #[inline]
    pub fn step_by(self, step: isize) -> Self {
        match self {
            SliceElem::Slice(s) => SliceElem::Slice(s.step_by(step)),
            other => other,
        }
    }
}

impl fmt::Display for SliceElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SliceElem::Slice(ref s) => s.fmt(f),
            SliceElem::Index(i) => write!(f, "{}", i),
            SliceElem::NewAxis => f.write_str("np.newaxis"),
            SliceElem::Ellipsis => f.write_str("..."),
        }
    }
}

impl From<Slice> for SliceElem {
    #[inline]
    fn from(s: Slice) -> SliceElem {
        SliceElem::Slice(s)
    }
}

impl From<NewAxis> for SliceElem {
    #[inline]
    fn from(_: NewAxis) -> SliceElem {
        SliceElem::NewAxis
    }
}

macro_rules! impl_sliceelem_from_index_type {
    ($index:ty) => {
        impl From<$index> for SliceElem {
            #[inline]
            fn from(r: $index) -> SliceElem {
                SliceElem::Index(r as isize)
            }
        }

        impl From<Range<$index>> for SliceElem {
            #[inline]
            fn from(r: Range<$index>) -> SliceElem {
                SliceElem::Slice(Slice::from(r))
            }
        }

        impl From<RangeFrom<$index>> for SliceElem {
            #[inline]
            fn from(r: RangeFrom<$index>) -> SliceElem {
                SliceElem::Slice(Slice::from(r))
            }
        }

        impl From<RangeTo<$index>> for SliceElem {
            #[inline]
            fn from(r: RangeTo<$index>) -> SliceElem {
                SliceElem::Slice(Slice::from(r))
            }
        }
    };
}

impl_sliceelem_from_index_type!(isize);
impl_sliceelem_from_index_type!(usize);
impl_sliceelem_from_index_type!(i32);

impl From<RangeFull> for SliceElem {
    #[inline]
    fn from(_: RangeFull) -> SliceElem {
        SliceElem::Slice(Slice::ALL)
    }
}

fn parse_int(part: &str, text: &str) -> Result<isize, ShapeError> {
    part.parse::<isize>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            parse_error(text, "integer literal out of range")
        }
        _ => parse_error(text, "expected an integer"),
    })
}

fn parse_bound(part: &str, text: &str) -> Result<Option<isize>, ShapeError> {
    if part.is_empty() {
        Ok(None)
    } else {
        parse_int(part, text).map(Some)
    }
}

/// Parse one axis of Python slice notation.
///
/// Whitespace inside the token is ignored, so `"- 5 : + 8"` is `-5:8`.
impl FromStr for SliceElem {
    type Err = ShapeError;

    fn from_str(text: &str) -> Result<Self, ShapeError> {
        let token: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        match token.as_str() {
            "" => return Err(parse_error(text, "empty slice")),
            "..." => return Ok(SliceElem::Ellipsis),
            "np.newaxis" | "newaxis" => return Ok(SliceElem::NewAxis),
            _ => {}
        }
        let parts: Vec<&str> = token.split(':').collect();
        match parts[..] {
            [index] => parse_int(index, text).map(SliceElem::Index),
            [start, end] => Ok(SliceElem::Slice(Slice {
                start: parse_bound(start, text)?,
                end: parse_bound(end, text)?,
                step: 1,
            })),
            [start, end, step] => {
                let step = parse_bound(step, text)?.unwrap_or(1);
                if step == 0 {
                    return Err(parse_error(text, "slice step cannot be zero"));
                }
                Ok(SliceElem::Slice(Slice {
                    start: parse_bound(start, text)?,
                    end: parse_bound(end, text)?,
                    step,
                }))
            }
            _ => Err(parse_error(text, "too many colons")),
        }
    }
}

impl FromStr for Slice {
    type Err = ShapeError;

    fn from_str(text: &str) -> Result<Self, ShapeError> {
        match text.parse::<SliceElem>()? {
            SliceElem::Slice(s) => Ok(s),
            _ => Err(parse_error(text, "expected a range")),
        }
    }
}

/// Parse a comma separated slicing expression such as `"1:9,::-2,7"`.
///
/// Fails on malformed items and on more than one `...`.
pub fn parse_slices(text: &str) -> Result<Vec<SliceElem>, ShapeError> {
    let elems = text
        .split(',')
        .map(str::parse)
        .collect::<Result<Vec<SliceElem>, _>>()?;
    if elems.iter().filter(|e| **e == SliceElem::Ellipsis).count() > 1 {
        return Err(parse_error(text, "an index can only have a single ellipsis ('...')"));
    }
    Ok(elems)
}

/// Format slicing items back into Python notation, comma separated.
pub fn format_slices(elems: &[SliceElem]) -> String {
    elems
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// A slice normalized against a concrete axis length.
///
/// `start` is the first selected position, `step` the signed distance
/// between selected positions and `count` the number of selected positions.
/// `reduce` is set for an integer index: the axis is dropped from the result.
///
/// An empty selection is always `SliceDef::EMPTY`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SliceDef {
    pub start: usize,
    pub step: isize,
    pub count: usize,
    pub reduce: bool,
}

impl SliceDef {
    /// The empty selection.
    pub const EMPTY: SliceDef = SliceDef {
        start: 0,
        step: 1,
        count: 0,
        reduce: false,
    };

    /// Create a range selection.
    pub fn new(start: usize, step: isize, count: usize) -> SliceDef {
        debug_assert_ne!(step, 0, "SliceDef::new: step must be nonzero");
        if count == 0 {
            return SliceDef::EMPTY;
        }
        SliceDef {
            start,
            step,
            count,
            reduce: false,
        }
    }

    /// The whole axis.
    pub fn all(axis_len: usize) -> SliceDef {
        SliceDef::new(0, 1, axis_len)
    }

    /// Normalize the integer index `index` for `axis` of length `axis_len`.
    ///
    /// Unlike range slicing, indexing never clamps: anything outside
    /// `[-axis_len, axis_len - 1]` is an error.
    pub fn index(index: isize, axis: usize, axis_len: usize) -> Result<SliceDef, ShapeError> {
        let len = axis_len as isize;
        let i = if index < 0 { index + len } else { index };
        if i < 0 || i >= len {
            return Err(out_of_bounds(index, axis, axis_len));
        }
        Ok(SliceDef {
            start: i as usize,
            step: 1,
            count: 1,
            reduce: true,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Position of the `i`th selected element within the parent axis.
    #[inline]
    pub fn position(&self, i: usize) -> isize {
        self.start as isize + i as isize * self.step
    }

    /// Iterate over the selected parent positions.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count).map(move |i| self.position(i) as usize)
    }

    /// Compose `self` with `inner`, a selection taken from the result of
    /// `self`: `outer.merge(inner)` selects from the parent what `inner`
    /// selects from `outer`'s result.
    ///
    /// `self` must not be a reducing index.
    ///
    /// **Errors** if the combined step does not fit in `isize`.
    pub fn merge(&self, inner: &SliceDef) -> Result<SliceDef, ShapeError> {
        debug_assert!(!self.reduce, "SliceDef::merge: outer selection removed its axis");
        if inner.is_empty() {
            return Ok(SliceDef::EMPTY);
        }
        // a single element never moves by its step
        let step = match self.step.checked_mul(inner.step) {
            Some(step) => step,
            None if inner.count == 1 => inner.step,
            None => return Err(step_overflow(inner.step)),
        };
        Ok(SliceDef {
            start: self.position(inner.start) as usize,
            step,
            count: inner.count,
            reduce: inner.reduce,
        })
    }
}

impl fmt::Display for SliceDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reduce {
            write!(f, "[{}]", self.start)
        } else {
            write!(f, "({}>>{}*{})", self.start, self.step, self.count)
        }
    }
}

/// Fold two per-axis selection lists into one.
///
/// `outer` has one entry per axis of some base shape; `inner` has one entry
/// per axis that survives `outer` (the non-reducing ones). Slicing the base
/// with the result is the same as slicing with `outer` and then `inner`.
pub fn compose_slice_defs(
    outer: &[SliceDef],
    inner: &[SliceDef],
) -> Result<Vec<SliceDef>, ShapeError> {
    let kept = outer.iter().filter(|d| !d.reduce).count();
    if kept != inner.len() {
        return Err(dimension_mismatch(
            "composed selections disagree on the number of axes",
            kept,
            inner.len(),
        ));
    }
    let mut inner = inner.iter();
    outer
        .iter()
        .map(|o| {
            if o.reduce {
                return Ok(*o);
            }
            inner.next().map_or(Ok(*o), |i| o.merge(i))
        })
        .collect()
}

pub(crate) fn step_overflow(step: isize) -> ShapeError {
    parse_error(&format!("::{}", step), "slice step overflows the parent stride")
}

/// Slice argument constructor.
///
/// `s![]` takes a list of ranges/indices, separated by comma, with optional
/// step sizes that are separated from the range by a semicolon. It is
/// converted into an array of [`SliceElem`].
///
/// Ranges and indices use signed positions, where a negative value is
/// counted from the end of the axis. Step sizes are also signed and may be
/// negative, but must not be zero.
///
/// For example `s![0..4;2, 6, 1..5]` is the same as the text `"0:4:2,6,1:5"`.
///
/// ```
/// use ndview::{s, Shape};
///
/// let shape = Shape::new(vec![10, 10, 10]);
/// let view = shape.slice_with(&s![0..4;2, 6, 1..5]).unwrap();
/// assert_eq!(view.dim(), &[2, 4]);
/// ```
#[macro_export]
macro_rules! s(
    (@parse [$($stack:tt)*]) => {
        [$($stack)*]
    };
    // final item with step
    (@parse [$($stack:tt)*] $r:expr;$s:expr) => {
        [$($stack)* $crate::s!(@convert $r, $s)]
    };
    // final item
    (@parse [$($stack:tt)*] $r:expr) => {
        [$($stack)* $crate::s!(@convert $r)]
    };
    (@parse [$($stack:tt)*] $r:expr;$s:expr, $($t:tt)*) => {
        $crate::s![@parse [$($stack)* $crate::s!(@convert $r, $s),] $($t)*]
    };
    (@parse [$($stack:tt)*] $r:expr, $($t:tt)*) => {
        $crate::s![@parse [$($stack)* $crate::s!(@convert $r),] $($t)*]
    };
    // convert range/index into SliceElem
    (@convert $r:expr) => {
        <$crate::SliceElem as ::core::convert::From<_>>::from($r)
    };
    // convert range/index and step into SliceElem
    (@convert $r:expr, $s:expr) => {
        <$crate::SliceElem as ::core::convert::From<_>>::from($r).step_by($s as isize)
    };
    ($($t:tt)*) => {
        $crate::s![@parse [] $($t)*]
    };
);

#[cfg(test)]
mod tests {
    use super::*;

    fn def(text: &str, len: usize) -> SliceDef {
        text.parse::<Slice>().unwrap().normalize(len).unwrap()
    }

    #[test]
    fn normalize_table() {
        assert_eq!(def("0:10", 10), SliceDef::new(0, 1, 10));
        assert_eq!(def(":", 10), SliceDef::new(0, 1, 10));
        assert_eq!(def("1:9", 10), SliceDef::new(1, 1, 8));
        assert_eq!(def("2:3", 10), SliceDef::new(2, 1, 1));
        assert_eq!(def("3:2", 10), SliceDef::EMPTY);
        assert_eq!(def("2:2", 10), SliceDef::EMPTY);
        assert_eq!(def("2:2:-1", 10), SliceDef::EMPTY);
        assert_eq!(def("-77:77", 10), SliceDef::new(0, 1, 10));
        assert_eq!(def("77:-77", 10), SliceDef::EMPTY);
        assert_eq!(def("77:-77:-1", 10), SliceDef::new(9, -1, 10));
        assert_eq!(def("::77", 10), SliceDef::new(0, 77, 1));
        assert_eq!(def("::-77", 10), SliceDef::new(9, -77, 1));
        assert_eq!(def("::7", 10), SliceDef::new(0, 7, 2));
        assert_eq!(def("::-7", 10), SliceDef::new(9, -7, 2));
        assert_eq!(def("::2", 10), SliceDef::new(0, 2, 5));
        assert_eq!(def("::-2", 10), SliceDef::new(9, -2, 5));
        assert_eq!(def("::3", 10), SliceDef::new(0, 3, 4));
        assert_eq!(def("::-3", 10), SliceDef::new(9, -3, 4));
        assert_eq!(def("10:2:-7", 10), SliceDef::new(9, -7, 1));
        assert_eq!(def("10:1:-7", 10), SliceDef::new(9, -7, 2));
        assert_eq!(def("-7::- 1", 10), SliceDef::new(3, -1, 4));
        assert_eq!(def("9:2:-2", 10), SliceDef::new(9, -2, 4));
        assert_eq!(def("-77:77:-77", 10), SliceDef::EMPTY);
        assert_eq!(def("77:-77:-77", 10), SliceDef::new(9, -77, 1));
        assert_eq!(def(":-5:-1", 10), SliceDef::new(9, -1, 4));
        assert_eq!(def(":-6:-1", 10), SliceDef::new(9, -1, 5));
    }

    #[test]
    fn normalize_empty_axis() {
        assert_eq!(def(":", 0), SliceDef::EMPTY);
        assert_eq!(def("::-1", 0), SliceDef::EMPTY);
        assert_eq!(def("-3:", 0), SliceDef::EMPTY);
    }

    #[test]
    fn zero_step_is_an_error() {
        let s = Slice {
            start: None,
            end: None,
            step: 0,
        };
        assert!(s.normalize(4).is_err());
    }

    #[test]
    fn index_normalization() {
        assert_eq!(SliceDef::index(3, 0, 10).unwrap().start, 3);
        assert_eq!(SliceDef::index(-1, 0, 10).unwrap().start, 9);
        assert_eq!(SliceDef::index(-10, 0, 10).unwrap().start, 0);
        assert!(SliceDef::index(-10, 0, 10).unwrap().reduce);
        assert!(SliceDef::index(10, 0, 10).is_err());
        assert!(SliceDef::index(-11, 0, 10).is_err());
        assert!(SliceDef::index(0, 0, 0).is_err());
    }

    #[test]
    fn merge_matches_positions() {
        let outer = def("1:9", 10);
        let inner = def("::-3", outer.count);
        let merged = outer.merge(&inner).unwrap();
        let direct: Vec<usize> = inner.positions().map(|i| outer.position(i) as usize).collect();
        assert_eq!(merged.positions().collect::<Vec<_>>(), direct);
        assert_eq!(direct, vec![8, 5, 2]);
    }

    #[test]
    fn extreme_steps() {
        let fwd = def("::9223372036854775807", 10);
        assert_eq!((fwd.start, fwd.count), (0, 1));
        let back = def("::-9223372036854775808", 10);
        assert_eq!((back.start, back.count), (9, 1));
        assert_eq!(def("5::-9223372036854775808", 10).count, 1);
        assert_eq!(def(":-9223372036854775808:-1", 10).count, 10);

        let wide = SliceDef::new(0, isize::MAX, 1);
        let merged = wide.merge(&SliceDef::new(0, 7, 1)).unwrap();
        assert_eq!(merged.positions().collect::<Vec<_>>(), vec![0]);
        assert!(SliceDef::new(0, isize::MAX, 2).merge(&SliceDef::new(0, 2, 1)).is_ok());
        let err = SliceDef::new(0, isize::MAX, 3).merge(&SliceDef::new(0, 2, 2)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Parse);
        assert_eq!(Slice::new(None, None, isize::MIN).step_by(-1).step, isize::MAX);
    }

    #[test]
    fn compose_keeps_reduced_axes() {
        let outer = [SliceDef::index(2, 0, 5).unwrap(), def("::2", 10)];
        let inner = [def("1:", 5)];
        let composed = compose_slice_defs(&outer, &inner).unwrap();
        assert_eq!(composed[0], outer[0]);
        assert_eq!(composed[1], SliceDef::new(2, 2, 4));
        assert!(compose_slice_defs(&outer, &[]).is_err());
    }

    #[test]
    fn slice_def_display() {
        assert_eq!(def("9:2:-2", 10).to_string(), "(9>>-2*4)");
        assert_eq!(SliceDef::index(4, 0, 5).unwrap().to_string(), "[4]");
    }
}
