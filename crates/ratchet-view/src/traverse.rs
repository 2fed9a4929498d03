//! Traversal of a geometry's index space.
use crate::{rvec, Geometry, Order, RVec, Shape};

fn axis_order(rank: usize, order: Order) -> RVec<usize> {
    match order {
        Order::RowMajor => (0..rank).rev().collect(),
        Order::ColumnMajor => (0..rank).collect(),
    }
}

/// Splits a flat position into a multi-index, `axes` listing the fastest axis first.
fn unravel(mut position: usize, shape: &Shape, axes: &[usize]) -> RVec<usize> {
    let mut index = rvec![0; shape.rank()];
    for &axis in axes {
        let len = shape[axis];
        index[axis] = position % len;
        position /= len;
    }
    index
}

/// Odometer over every index tuple of a shape.
#[derive(Debug, Clone)]
pub struct Indices {
    shape: Shape,
    axes: RVec<usize>,
    next: Option<RVec<usize>>,
    remaining: usize,
}

impl Indices {
    pub fn new(shape: &Shape, order: Order) -> Self {
        let remaining = shape.numel();
        Self {
            shape: shape.clone(),
            axes: axis_order(shape.rank(), order),
            next: (remaining > 0).then(|| rvec![0; shape.rank()]),
            remaining,
        }
    }
}

impl Iterator for Indices {
    type Item = RVec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.remaining -= 1;
        if self.remaining > 0 {
            let mut next = current.clone();
            for &axis in &self.axes {
                next[axis] += 1;
                if next[axis] < self.shape[axis] {
                    break;
                }
                next[axis] = 0;
            }
            self.next = Some(next);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Indices {}

/// Buffer offsets of a geometry's elements, in a logical [Order].
///
/// Keeps a cursor at each end; the offset is updated incrementally as the cursor moves.
#[derive(Debug, Clone)]
pub struct Offsets<'g> {
    geometry: &'g Geometry,
    axes: RVec<usize>,
    front: RVec<usize>,
    front_offset: isize,
    back: RVec<usize>,
    back_offset: isize,
    position: usize,
    remaining: usize,
}

impl<'g> Offsets<'g> {
    pub fn new(geometry: &'g Geometry, order: Order) -> Self {
        let rank = geometry.rank();
        let remaining = geometry.numel();
        let front: RVec<usize> = rvec![0; rank];
        let back: RVec<usize> = geometry
            .shape()
            .iter()
            .map(|&len| len.saturating_sub(1))
            .collect();
        let (front_offset, back_offset) = if remaining > 0 {
            (geometry.raw_offset(&front), geometry.raw_offset(&back))
        } else {
            (geometry.offset(), geometry.offset())
        };
        Self {
            geometry,
            axes: axis_order(rank, order),
            front,
            front_offset,
            back,
            back_offset,
            position: 0,
            remaining,
        }
    }

    /// Index tuple of the next element from the front.
    pub fn index(&self) -> &[usize] {
        &self.front
    }

    fn step_forward(&mut self) {
        let shape = self.geometry.shape();
        for &axis in &self.axes {
            let map = &self.geometry.axes()[axis];
            let i = self.front[axis];
            if i + 1 < shape[axis] {
                self.front_offset += map.offset_at(i + 1) - map.offset_at(i);
                self.front[axis] = i + 1;
                return;
            }
            self.front_offset -= map.offset_at(i) - map.offset_at(0);
            self.front[axis] = 0;
        }
    }

    fn step_backward(&mut self) {
        let shape = self.geometry.shape();
        for &axis in &self.axes {
            let map = &self.geometry.axes()[axis];
            let i = self.back[axis];
            if i > 0 {
                self.back_offset += map.offset_at(i - 1) - map.offset_at(i);
                self.back[axis] = i - 1;
                return;
            }
            let last = shape[axis] - 1;
            self.back_offset += map.offset_at(last) - map.offset_at(0);
            self.back[axis] = last;
        }
    }
}

impl Iterator for Offsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self.front_offset;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.position += 1;
            self.step_forward();
        }
        Some(offset as usize)
    }

    fn nth(&mut self, n: usize) -> Option<usize> {
        if n >= self.remaining {
            self.remaining = 0;
            return None;
        }
        if n > 0 {
            self.position += n;
            self.remaining -= n;
            self.front = unravel(self.position, self.geometry.shape(), &self.axes);
            self.front_offset = self.geometry.raw_offset(&self.front);
        }
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Offsets<'_> {
    fn next_back(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self.back_offset;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.step_backward();
        }
        Some(offset as usize)
    }
}

impl ExactSizeIterator for Offsets<'_> {}

/// Shared references to the elements of a view, in a logical [Order].
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    data: &'a [T],
    offsets: Offsets<'a>,
}

impl<'a, T> Iter<'a, T> {
    pub fn new(data: &'a [T], geometry: &'a Geometry, order: Order) -> Self {
        Self {
            data,
            offsets: Offsets::new(geometry, order),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.offsets.next().map(|o| &self.data[o])
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        self.offsets.nth(n).map(|o| &self.data[o])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.offsets.next_back().map(|o| &self.data[o])
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
