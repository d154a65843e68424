// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
#![crate_name = "ndview"]
#![doc(html_root_url = "https://docs.rs/ndview/0.1/")]
#![warn(missing_debug_implementations)]

//! The `ndview` crate is the shape, slice and view engine of an
//! n-dimensional array, with NumPy's slicing semantics.
//!
//! - [`Shape`]: dimensions, strides and offset; maps coordinates to buffer
//!   offsets and composes with slicing, reshaping and broadcasting.
//! - [`Slice`], [`SliceElem`] and [`SliceDef`]: the slice grammar
//!   (`"1:9,::-2,7"`, `...`, `np.newaxis`) and its normalization against an
//!   axis length, following Python's `slice.indices`.
//! - [`Storage`]: a reference counted buffer shared by every view of the
//!   same data.
//! - [`View`]: a storage handle paired with a shape. Slices and contiguous
//!   reshapes are views of the same storage, so a write through one is seen
//!   by all.
//!
//! ## Views and copies
//!
//! A slice whose result is C-contiguous (a step 1 slice of the leading
//! axis, for example) is stored as a plain offset into the buffer with
//! default strides. Any other slice keeps explicit strides along with
//! [`ViewInfo`] recording where it came from.
//!
//! ```
//! use ndview::View;
//!
//! let a = View::<i32>::arange(10).unwrap();
//! let evens = a.slice("::2").unwrap();
//! assert_eq!(evens.to_vec(), vec![0, 2, 4, 6, 8]);
//! assert!(!evens.is_contiguous());
//!
//! // a strided view is copied by ravel
//! let flat = evens.ravel();
//! flat.set(&[0], 99).unwrap();
//! assert_eq!(a.get(&[0]).unwrap(), 0);
//! ```
//!
//! ## Crate Feature Flags
//!
//! - `serde`
//!   - Enables serialization support for [`Shape`], [`Order`] and the slice
//!     types.
//!
//! ## Logging
//!
//! Decisions about views and every copy of element data are reported
//! through [`tracing`] at `trace` and `debug` level.

pub use crate::broadcast::{broadcast, broadcast_all, broadcast_shape};
pub use crate::element::{DType, Element};
pub use crate::error::{ErrorKind, ShapeError};
pub use crate::order::Order;
pub use crate::shape::{BroadcastInfo, Offsets, Shape, ViewInfo};
pub use crate::slice::{
    compose_slice_defs, format_slices, parse_slices, NewAxis, Slice, SliceDef, SliceElem,
};
pub use crate::storage::{AnyStorage, Storage};
pub use crate::view::{broadcast_views, View};

mod broadcast;
mod element;
mod error;
mod order;
pub mod prelude;
mod shape;
mod slice;
mod storage;
mod view;
