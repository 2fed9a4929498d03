//! Writes through mutable views.
//!
//! Every entry point validates the source shape before the first write, so a failed
//! assignment leaves the destination untouched.
use crate::{
    ElementType, Enforcer, Expression, Indices, Layout, Offsets, Order, RVec, Shape, ViewError,
    ViewKind, ViewMut,
};
use num_traits::AsPrimitive;

/// Maps an index of `dst` onto the trailing-aligned index of a broadcast `src`.
/// Length-1 source axes always read position 0.
fn broadcast_index(src: &Shape, dst_index: &[usize]) -> RVec<usize> {
    let skip = dst_index.len() - src.rank();
    src.iter()
        .zip(&dst_index[skip..])
        .map(|(&len, &i)| if len == 1 { 0 } else { i })
        .collect()
}

/// Row-major values of `src` stretched over `dst`.
///
/// The caller checks compatibility with [Enforcer::check_broadcast] first.
pub fn broadcast_values<T, E>(src: &E, dst: &Shape) -> Vec<T>
where
    E: Expression<T> + ?Sized,
{
    let shape = src.shape();
    if shape == dst {
        return Indices::new(dst, Order::RowMajor)
            .map(|index| src.element(&index))
            .collect();
    }
    Indices::new(dst, Order::RowMajor)
        .map(|index| src.element(&broadcast_index(shape, &index)))
        .collect()
}

impl<T: ElementType> ViewMut<'_, T> {
    /// Whether a row-major stream can be written straight into one slice.
    fn row_major_span(&self) -> Option<std::ops::Range<usize>> {
        match (self.geometry.kind(), self.geometry.layout()) {
            (ViewKind::Contiguous, Layout::RowMajor) if self.numel() > 0 => {
                let start = self.data_offset();
                Some(start..start + self.numel())
            }
            _ => None,
        }
    }

    /// Writes `values`, taken in row-major order of this view.
    pub(crate) fn write_row_major<I: IntoIterator<Item = T>>(&mut self, values: I) {
        if let Some(span) = self.row_major_span() {
            log::debug!("Writing {:?} as one contiguous span", self.shape());
            for (dst, v) in self.data[span].iter_mut().zip(values) {
                *dst = v;
            }
            return;
        }
        log::debug!("Writing {:?} ({}) element by element", self.shape(), self.kind());
        let Self { data, geometry, .. } = self;
        for (offset, v) in Offsets::new(geometry, Order::RowMajor).zip(values) {
            data[offset] = v;
        }
    }

    /// Assigns `src`, broadcast to this view's shape and converted with `as` semantics.
    ///
    /// The source is read in full before anything is written.
    pub fn assign<U, E>(&mut self, src: &E) -> Result<(), ViewError>
    where
        U: AsPrimitive<T>,
        E: Expression<U> + ?Sized,
    {
        Enforcer::check_broadcast(src.shape(), self.shape())?;
        log::debug!(
            "Assigning {:?} to {:?} through a temporary",
            src.shape(),
            self.shape()
        );
        let values = broadcast_values(src, self.shape());
        self.write_row_major(values.into_iter().map(|v| v.as_()));
        Ok(())
    }

    /// Assigns `src`, broadcast to this view's shape, reading and writing in one pass.
    ///
    /// A source borrowed alongside this view cannot share its buffer, so streaming is
    /// sound for every safe caller.
    pub fn assign_noalias<U, E>(&mut self, src: &E) -> Result<(), ViewError>
    where
        U: AsPrimitive<T>,
        E: Expression<U> + ?Sized,
    {
        Enforcer::check_broadcast(src.shape(), self.shape())?;
        log::debug!("Streaming {:?} into {:?}", src.shape(), self.shape());
        let src_shape = src.shape();
        let Self { data, geometry, .. } = self;
        let offsets = Offsets::new(geometry, Order::RowMajor);
        for (offset, index) in offsets.zip(Indices::new(geometry.shape(), Order::RowMajor)) {
            data[offset] = src.element(&broadcast_index(src_shape, &index)).as_();
        }
        Ok(())
    }

    pub fn fill(&mut self, value: T) {
        if let Some(span) = self.row_major_span() {
            self.data[span].fill(value);
            return;
        }
        let Self { data, geometry, .. } = self;
        for offset in Offsets::new(geometry, Order::RowMajor) {
            data[offset] = value;
        }
    }

    /// Replaces every element `x` with `f(x)`.
    ///
    /// List-indexed views may reach one element through several positions; each of
    /// those positions sees the original value.
    pub fn map_inplace<F>(&mut self, mut f: F)
    where
        F: FnMut(T) -> T,
    {
        match self.kind() {
            ViewKind::ListIndexed => {
                let values = self
                    .to_vec(Order::RowMajor)
                    .into_iter()
                    .map(f)
                    .collect::<Vec<_>>();
                self.write_row_major(values);
            }
            _ => {
                let Self { data, geometry, .. } = self;
                for offset in Offsets::new(geometry, Order::RowMajor) {
                    data[offset] = f(data[offset]);
                }
            }
        }
    }
}
