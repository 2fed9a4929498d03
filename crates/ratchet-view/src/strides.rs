use crate::{rvec, Layout, RVec, Shape};

/// Per-axis distance between consecutive elements, counted in elements.
/// Negative strides walk the buffer backwards.
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct Strides(RVec<isize>);

impl Strides {
    pub fn new(strides: RVec<isize>) -> Self {
        Self(strides)
    }

    /// Contiguous strides for `shape` stored in `layout` order.
    /// `Layout::Dynamic` has no canonical order and falls back to row-major.
    pub fn contiguous(shape: &Shape, layout: Layout) -> Self {
        let mut strides = rvec![];
        let mut stride = 1;
        match layout {
            Layout::ColumnMajor => {
                for size in shape.iter() {
                    strides.push(stride);
                    stride *= *size as isize;
                }
            }
            Layout::RowMajor | Layout::Dynamic => {
                for size in shape.iter().rev() {
                    strides.push(stride);
                    stride *= *size as isize;
                }
                strides.reverse();
            }
        }
        Self(strides)
    }

    pub fn to_vec(&self) -> Vec<isize> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &isize> {
        self.0.iter()
    }
}

impl std::fmt::Debug for Strides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dims = self.0.iter().map(|d| d.to_string()).collect::<Vec<_>>();
        write!(f, "[{}]", dims.join("x"))
    }
}

impl std::ops::Index<usize> for Strides {
    type Output = isize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<&Shape> for Strides {
    fn from(shape: &Shape) -> Self {
        Self::contiguous(shape, Layout::RowMajor)
    }
}

impl From<Vec<isize>> for Strides {
    fn from(strides: Vec<isize>) -> Self {
        Self(strides.into())
    }
}

impl FromIterator<isize> for Strides {
    fn from_iter<I: IntoIterator<Item = isize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
