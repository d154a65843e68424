// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! ndview prelude.
//!
//! This module contains the most used types, functions and macros that you
//! can import easily as a group.
//!
//! ```
//! use ndview::prelude::*;
//!
//! let a = View::<f64>::zeros(vec![2, 3]);
//! let col = a.slice_with(&s![.., 1]).unwrap();
//! assert_eq!(col.dim(), &[2]);
//! ```

#[doc(no_inline)]
pub use crate::{Shape, Storage, View};

#[doc(no_inline)]
pub use crate::{NewAxis, Slice, SliceDef, SliceElem};

#[doc(no_inline)]
pub use crate::{ErrorKind, Order, ShapeError};

#[doc(no_inline)]
pub use crate::{broadcast, broadcast_views, s};
