// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reference counted element buffers.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{incompatible_shapes, out_of_bounds, ShapeError};
use crate::{DType, Element};

/// A shared, mutable buffer of elements.
///
/// Every clone of a `Storage` is an alias of the same buffer: a write
/// through one is visible through all of them. The buffer is freed when the
/// last alias is dropped. A storage may also be a window into a larger
/// buffer, see [`slice`](Self::slice).
///
/// Use [`deep_clone`](Self::deep_clone) for an independent copy.
///
/// `Storage` is neither `Send` nor `Sync`.
///
/// ```
/// use ndview::Storage;
///
/// let a = Storage::from_vec(vec![1, 2, 3, 4]);
/// let tail = a.slice(2, 2).unwrap();
/// tail.set_at_offset(0, 30).unwrap();
/// assert_eq!(a.to_vec(), vec![1, 2, 30, 4]);
/// ```
pub struct Storage<A> {
    data: Rc<[Cell<A>]>,
    start: usize,
    len: usize,
}

impl<A> Clone for Storage<A> {
    fn clone(&self) -> Self {
        Storage {
            data: Rc::clone(&self.data),
            start: self.start,
            len: self.len,
        }
    }
}

impl<A: Element> fmt::Debug for Storage<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("dtype", &A::DTYPE)
            .field("start", &self.start)
            .field("len", &self.len)
            .field("data", &self.to_vec())
            .finish()
    }
}

impl<A: Element> Storage<A> {
    /// Create a buffer of `len` default values (zero for numbers).
    pub fn zeros(len: usize) -> Self {
        Self::from_elem(len, A::default())
    }

    pub fn from_elem(len: usize, elem: A) -> Self {
        Self::from_iter_exact((0..len).map(|_| elem), len)
    }

    /// Take ownership of `v` as a new buffer.
    pub fn from_vec(v: Vec<A>) -> Self {
        let len = v.len();
        Self::from_iter_exact(v, len)
    }

    fn from_iter_exact<I: IntoIterator<Item = A>>(iter: I, len: usize) -> Self {
        let data: Rc<[Cell<A>]> = iter.into_iter().map(Cell::new).collect();
        debug_assert_eq!(data.len(), len);
        Storage {
            data,
            start: 0,
            len,
        }
    }

    /// Number of elements in this window.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        A::DTYPE
    }

    #[inline]
    fn cell(&self, offset: usize) -> Result<&Cell<A>, ShapeError> {
        if offset >= self.len {
            return Err(out_of_bounds(offset as isize, 0, self.len));
        }
        Ok(&self.data[self.start + offset])
    }

    /// Read the element at `offset`.
    pub fn get_at_offset(&self, offset: usize) -> Result<A, ShapeError> {
        Ok(self.cell(offset)?.get())
    }

    /// Write the element at `offset`; visible through every alias.
    pub fn set_at_offset(&self, offset: usize, value: A) -> Result<(), ShapeError> {
        self.cell(offset)?.set(value);
        Ok(())
    }

    /// Write `values` starting at `offset`.
    pub fn set_range(&self, offset: usize, values: &[A]) -> Result<(), ShapeError> {
        let end = offset.saturating_add(values.len());
        if end > self.len {
            return Err(out_of_bounds(end as isize - 1, 0, self.len));
        }
        let window = &self.data[self.start + offset..self.start + end];
        for (cell, &v) in window.iter().zip(values) {
            cell.set(v);
        }
        Ok(())
    }

    /// A zero-copy alias of `count` elements starting at `offset`.
    ///
    /// **Errors** if the range is not inside this window.
    pub fn slice(&self, offset: usize, count: usize) -> Result<Storage<A>, ShapeError> {
        match offset.checked_add(count) {
            Some(end) if end <= self.len => {}
            _ => return Err(out_of_bounds(offset as isize, 0, self.len)),
        }
        trace!(offset, count, refs = self.ref_count() + 1, "storage alias");
        Ok(Storage {
            data: Rc::clone(&self.data),
            start: self.start + offset,
            len: count,
        })
    }

    /// Copy this window into a new, unshared buffer.
    pub fn deep_clone(&self) -> Storage<A> {
        let dtype = A::DTYPE;
        debug!(%dtype, len = self.len, "storage copied");
        Self::from_iter_exact(self.iter(), self.len)
    }

    /// Replace the contents of this window in place.
    ///
    /// Every alias observes the new values.
    ///
    /// **Errors** if `values` does not have exactly `len()` elements.
    pub fn copy_from_slice(&self, values: &[A]) -> Result<(), ShapeError> {
        if values.len() != self.len {
            return Err(incompatible_shapes(&[values.len()], &[self.len]));
        }
        self.set_range(0, values)
    }

    /// Read at an offset already checked against this window.
    #[inline]
    pub(crate) fn load(&self, offset: usize) -> A {
        debug_assert!(offset < self.len);
        self.data[self.start + offset].get()
    }

    #[inline]
    pub(crate) fn store(&self, offset: usize, value: A) {
        debug_assert!(offset < self.len);
        self.data[self.start + offset].set(value)
    }

    /// Iterate over copies of the elements of this window.
    pub fn iter(&self) -> impl Iterator<Item = A> + '_ {
        self.data[self.start..self.start + self.len]
            .iter()
            .map(Cell::get)
    }

    pub fn to_vec(&self) -> Vec<A> {
        self.iter().collect()
    }

    /// Pointer to the first element of this window.
    ///
    /// Writing through the pointer is allowed and is visible through all
    /// aliases, as long as no two writers touch the same element.
    pub fn as_ptr(&self) -> *mut A {
        // Cell<A> has the same in-memory representation as A
        let base = self.data.as_ptr() as *mut A;
        unsafe { base.add(self.start) }
    }

    /// Number of aliases sharing the underlying buffer.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.data)
    }

    /// Return true if no other alias of the buffer exists.
    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1 && Rc::weak_count(&self.data) == 0
    }

    /// Return true if both storages address the same underlying buffer.
    pub fn shares_buffer_with(&self, other: &Storage<A>) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

macro_rules! any_storage {
    ($($variant:ident($t:ty)),* $(,)?) => {
        /// A [`Storage`] of any element type, tagged by its [`DType`].
        #[derive(Clone, Debug)]
        pub enum AnyStorage {
            $($variant(Storage<$t>),)*
        }

        impl AnyStorage {
            /// Create a zeroed storage of `len` elements of kind `dtype`.
            pub fn zeros(dtype: DType, len: usize) -> AnyStorage {
                match dtype {
                    $(DType::$variant => AnyStorage::$variant(Storage::zeros(len)),)*
                }
            }

            pub fn dtype(&self) -> DType {
                match self {
                    $(AnyStorage::$variant(_) => DType::$variant,)*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(AnyStorage::$variant(s) => s.len(),)*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// See [`Storage::slice`].
            pub fn slice(&self, offset: usize, count: usize) -> Result<AnyStorage, ShapeError> {
                Ok(match self {
                    $(AnyStorage::$variant(s) => AnyStorage::$variant(s.slice(offset, count)?),)*
                })
            }

            /// See [`Storage::deep_clone`].
            pub fn deep_clone(&self) -> AnyStorage {
                match self {
                    $(AnyStorage::$variant(s) => AnyStorage::$variant(s.deep_clone()),)*
                }
            }

            /// Raw address of the first element.
            pub fn as_ptr(&self) -> *mut u8 {
                match self {
                    $(AnyStorage::$variant(s) => s.as_ptr() as *mut u8,)*
                }
            }

            /// The typed storage, if the element type is `A`.
            pub fn downcast_ref<A: Element>(&self) -> Option<&Storage<A>> {
                match self {
                    $(AnyStorage::$variant(s) => (s as &dyn Any).downcast_ref(),)*
                }
            }
        }

        $(
            impl From<Storage<$t>> for AnyStorage {
                fn from(s: Storage<$t>) -> AnyStorage {
                    AnyStorage::$variant(s)
                }
            }
        )*
    };
}

any_storage! {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Char(char),
    Complex64(num_complex::Complex<f32>),
    Complex128(num_complex::Complex<f64>),
}
