//! Per-axis selectors and the pure queries the composer relies on.
use crate::{Enforcer, SelectorError, ViewError};
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

/// A `start:stop:step` range over one axis.
///
/// `None` bounds are open: they run to the natural end of the axis for the step's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_new::new)]
pub struct SliceRange {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: isize,
}

/// A [SliceRange] resolved against an axis length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: usize,
    pub len: usize,
    pub step: isize,
}

impl ResolvedRange {
    /// Position in the parent axis of the `i`-th element of the range.
    pub fn position(&self, i: usize) -> usize {
        (self.start as isize + i as isize * self.step) as usize
    }
}

impl SliceRange {
    /// Resolves open sentinels and negative bounds, clamps and computes the length.
    pub fn resolve(&self, axis: usize, len: usize) -> Result<ResolvedRange, ViewError> {
        let step = self.step;
        if step == 0 {
            return Err(SelectorError::ZeroStep { axis }.into());
        }
        let n = len as isize;
        let bound = |b: Option<isize>| {
            b.map(|b| Enforcer::resolve_bound(axis, b, len))
                .transpose()
        };
        let (start, count) = if step > 0 {
            let start = bound(self.start)?.unwrap_or(0);
            let stop = bound(self.stop)?.unwrap_or(n);
            let count = if stop > start {
                (stop - start + step - 1) / step
            } else {
                0
            };
            (start, count)
        } else {
            let start = bound(self.start)?.map_or(n - 1, |s| s.min(n - 1));
            let stop = bound(self.stop)?.unwrap_or(-1);
            let count = if start > stop {
                (start - stop - step - 1) / -step
            } else {
                0
            };
            (start.max(0), count)
        };
        Ok(ResolvedRange {
            start: start as usize,
            len: count as usize,
            step,
        })
    }
}

/// How one axis of a view derives from its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Collapses the axis to a single position.
    Index(isize),
    Range(SliceRange),
    All,
    /// Inserts a length-1 axis without consuming a parent axis.
    NewAxis,
    /// Selects the listed positions, in order, duplicates included.
    Keep(Vec<isize>),
    /// Selects every position not listed, in ascending order.
    Drop(Vec<isize>),
}

impl Selector {
    pub fn index(i: isize) -> Self {
        Selector::Index(i)
    }

    pub fn all() -> Self {
        Selector::All
    }

    pub fn new_axis() -> Self {
        Selector::NewAxis
    }

    /// `start..stop` with unit step.
    pub fn range(start: isize, stop: isize) -> Self {
        Selector::Range(SliceRange::new(Some(start), Some(stop), 1))
    }

    pub fn stepped(start: Option<isize>, stop: Option<isize>, step: isize) -> Self {
        Selector::Range(SliceRange::new(start, stop, step))
    }

    pub fn keep<I: IntoIterator<Item = isize>>(positions: I) -> Self {
        Selector::Keep(positions.into_iter().collect())
    }

    pub fn drop<I: IntoIterator<Item = isize>>(positions: I) -> Self {
        Selector::Drop(positions.into_iter().collect())
    }

    /// Parent axes consumed by this selector.
    pub fn consumed(&self) -> usize {
        match self {
            Selector::NewAxis => 0,
            _ => 1,
        }
    }

    /// Whether this selector produces an axis in the view.
    pub fn contributes_axis(&self) -> bool {
        !self.is_integral()
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Selector::Index(_))
    }

    pub fn is_newaxis(&self) -> bool {
        matches!(self, Selector::NewAxis)
    }

    pub fn is_listed(&self) -> bool {
        matches!(self, Selector::Keep(_) | Selector::Drop(_))
    }

    /// True when the axis can be expressed by a single stride.
    pub fn is_affine(&self) -> bool {
        !self.is_listed()
    }

    /// Ranges with a non-unit step break contiguity.
    pub fn is_stepped(&self) -> bool {
        matches!(self, Selector::Range(r) if r.step != 1)
    }
}

impl From<isize> for Selector {
    fn from(i: isize) -> Self {
        Selector::Index(i)
    }
}

impl From<i32> for Selector {
    fn from(i: i32) -> Self {
        Selector::Index(i as isize)
    }
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Selector::Index(i as isize)
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::All
    }
}

impl From<SliceRange> for Selector {
    fn from(r: SliceRange) -> Self {
        Selector::Range(r)
    }
}

macro_rules! impl_from_ranges {
    ($($t:ty),*) => {
        $(
            impl From<Range<$t>> for Selector {
                fn from(r: Range<$t>) -> Self {
                    Selector::Range(SliceRange::new(Some(r.start as isize), Some(r.end as isize), 1))
                }
            }

            impl From<RangeInclusive<$t>> for Selector {
                fn from(r: RangeInclusive<$t>) -> Self {
                    let (start, end) = r.into_inner();
                    let stop = end as isize + 1;
                    Selector::Range(SliceRange::new(Some(start as isize), (stop != 0).then_some(stop), 1))
                }
            }

            impl From<RangeFrom<$t>> for Selector {
                fn from(r: RangeFrom<$t>) -> Self {
                    Selector::Range(SliceRange::new(Some(r.start as isize), None, 1))
                }
            }

            impl From<RangeTo<$t>> for Selector {
                fn from(r: RangeTo<$t>) -> Self {
                    Selector::Range(SliceRange::new(None, Some(r.end as isize), 1))
                }
            }
        )*
    };
}

impl_from_ranges!(i32, isize, usize);

/// Read-only queries over an ordered selector list.
///
/// Positions past the end of the list behave as implicit [Selector::All].
#[derive(Debug, Clone, Copy)]
pub struct Selectors<'s>(&'s [Selector]);

impl<'s> Selectors<'s> {
    pub fn new(selectors: &'s [Selector]) -> Self {
        Self(selectors)
    }

    pub fn integral_count(&self) -> usize {
        self.integral_count_before(self.0.len())
    }

    /// Number of [Selector::Index] among the first `k` selectors.
    pub fn integral_count_before(&self, k: usize) -> usize {
        self.0.iter().take(k).filter(|s| s.is_integral()).count()
    }

    pub fn newaxis_count(&self) -> usize {
        self.newaxis_count_before(self.0.len())
    }

    pub fn newaxis_count_before(&self, k: usize) -> usize {
        self.0.iter().take(k).filter(|s| s.is_newaxis()).count()
    }

    pub fn consumed(&self) -> usize {
        self.0.iter().map(Selector::consumed).sum()
    }

    /// Rank of the view these selectors produce over a parent of rank `parent_rank`.
    pub fn result_rank(&self, parent_rank: usize) -> usize {
        parent_rank + self.newaxis_count() - self.integral_count()
    }

    /// List position of the `i`-th selector that contributes a view axis.
    pub fn integral_skip(&self, i: usize) -> usize {
        let mut remaining = i;
        for (position, selector) in self.0.iter().enumerate() {
            if selector.contributes_axis() {
                if remaining == 0 {
                    return position;
                }
                remaining -= 1;
            }
        }
        self.0.len() + remaining
    }

    /// Parent axis that view axis `i` derives from. `None` for inserted axes.
    pub fn parent_axis(&self, i: usize) -> Option<usize> {
        let position = self.integral_skip(i);
        match self.0.get(position) {
            Some(Selector::NewAxis) => None,
            _ => Some(position - self.newaxis_count_before(position)),
        }
    }

    /// Selector applying to `position`, implicit `All` included.
    pub fn get(&self, position: usize) -> &'s Selector {
        self.0.get(position).unwrap_or(&Selector::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{s, IndexError};

    #[test]
    fn integral_count() {
        let sel = [
            Selector::Index(0),
            Selector::Index(0),
            Selector::Index(0),
            Selector::range(0, 1),
        ];
        assert_eq!(Selectors::new(&sel).integral_count(), 3);
        assert_eq!(Selectors::new(&sel).integral_count_before(3), 3);

        let sel = [Selector::Index(0), Selector::range(0, 1), Selector::Index(0)];
        assert_eq!(Selectors::new(&sel).integral_count(), 2);
        assert_eq!(Selectors::new(&sel).integral_count_before(2), 1);

        let sel = [Selector::NewAxis];
        assert_eq!(Selectors::new(&sel).integral_count(), 0);
    }

    #[test]
    fn newaxis_count() {
        let sel = [
            Selector::NewAxis,
            Selector::NewAxis,
            Selector::NewAxis,
            Selector::range(0, 1),
        ];
        assert_eq!(Selectors::new(&sel).newaxis_count(), 3);
        assert_eq!(Selectors::new(&sel).newaxis_count_before(3), 3);

        let sel = [Selector::NewAxis, Selector::range(0, 1), Selector::NewAxis];
        assert_eq!(Selectors::new(&sel).newaxis_count(), 2);
        assert_eq!(Selectors::new(&sel).newaxis_count_before(2), 1);
    }

    #[test]
    fn integral_skip() {
        let sel = [
            Selector::Index(0),
            Selector::range(0, 1),
            Selector::Index(0),
            Selector::range(0, 1),
        ];
        let q = Selectors::new(&sel);
        assert_eq!(q.integral_skip(0), 1);
        assert_eq!(q.integral_skip(1), 3);
        assert_eq!(q.integral_skip(2), 4);
        assert_eq!(q.integral_skip(3), 5);
    }

    #[test]
    fn parent_axis_accounts_for_new_axes() {
        let sel = s![1, Selector::NewAxis, .., Selector::NewAxis];
        let q = Selectors::new(&sel);
        assert_eq!(q.result_rank(4), 5);
        assert_eq!(q.parent_axis(0), None);
        assert_eq!(q.parent_axis(1), Some(1));
        assert_eq!(q.parent_axis(2), None);
        assert_eq!(q.parent_axis(3), Some(2));
        assert_eq!(q.parent_axis(4), Some(3));
    }

    #[test]
    fn macro_conversions() {
        let sel = s![1, .., 1..4, 2.., ..3, Selector::NewAxis];
        assert_eq!(sel[0], Selector::Index(1));
        assert_eq!(sel[1], Selector::All);
        assert_eq!(sel[2], Selector::range(1, 4));
        assert_eq!(sel[3], Selector::stepped(Some(2), None, 1));
        assert_eq!(sel[4], Selector::stepped(None, Some(3), 1));
        assert_eq!(sel[5], Selector::NewAxis);
    }

    fn resolve(r: SliceRange, len: usize) -> (usize, usize) {
        let r = r.resolve(0, len).unwrap();
        (r.start, r.len)
    }

    #[test]
    fn open_sentinels() {
        assert_eq!(resolve(SliceRange::new(Some(3), None, 1), 5), (3, 2));
        assert_eq!(resolve(SliceRange::new(None, Some(2), 1), 5), (0, 2));
        assert_eq!(resolve(SliceRange::new(None, None, 1), 5), (0, 5));
        assert_eq!(resolve(SliceRange::new(None, Some(2), -1), 5), (4, 2));
        assert_eq!(resolve(SliceRange::new(Some(2), None, -1), 5), (2, 3));
        assert_eq!(resolve(SliceRange::new(Some(1), None, 2), 5), (1, 2));
        assert_eq!(resolve(SliceRange::new(Some(2), None, 2), 5), (2, 2));
        assert_eq!(resolve(SliceRange::new(Some(2), Some(2), 4), 3), (2, 0));
        assert_eq!(resolve(SliceRange::new(Some(3), Some(1), 1), 5), (3, 0));
        assert_eq!(resolve(SliceRange::new(None, None, -1), 0), (0, 0));
    }

    #[test]
    fn negative_bounds_match_positive() {
        assert_eq!(
            resolve(SliceRange::new(Some(-3), Some(-1), 1), 5),
            resolve(SliceRange::new(Some(2), Some(4), 1), 5)
        );
    }

    #[test]
    fn zero_step_is_invalid() {
        let r = SliceRange::new(None, None, 0);
        assert_eq!(
            r.resolve(1, 4),
            Err(ViewError::Selector(SelectorError::ZeroStep { axis: 1 }))
        );
    }

    #[test]
    fn explicit_bounds_are_not_clamped() {
        let r = SliceRange::new(Some(0), Some(6), 1);
        assert!(matches!(
            r.resolve(0, 5),
            Err(ViewError::Index(IndexError::OutOfBounds { index: 6, .. }))
        ));
    }
}
