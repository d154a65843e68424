// Copyright 2026 ndview developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::Shape;

/// An iterator over the buffer offsets of a shape's elements, in logical
/// row-major order.
///
/// Created with [`Shape::offsets`].
#[derive(Clone, Debug)]
pub struct Offsets<'a> {
    shape: &'a Shape,
    index: Vec<usize>,
    offset: isize,
    remaining: usize,
}

impl<'a> Offsets<'a> {
    pub(super) fn new(shape: &'a Shape) -> Self {
        Offsets {
            shape,
            index: vec![0; shape.ndim()],
            offset: shape.offset() as isize,
            remaining: shape.size(),
        }
    }

    /// Step the index to the next element, carrying into outer axes, and
    /// update the running offset.
    fn step(&mut self) {
        let dim = self.shape.dim();
        let strides = self.shape.strides();
        for axis in (0..dim.len()).rev() {
            self.index[axis] += 1;
            if self.index[axis] < dim[axis] {
                self.offset += strides[axis];
                return;
            }
            self.offset -= (dim[axis] as isize - 1) * strides[axis];
            self.index[axis] = 0;
        }
    }
}

impl<'a> Iterator for Offsets<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self.offset as usize;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.step();
        }
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> ExactSizeIterator for Offsets<'a> {}
