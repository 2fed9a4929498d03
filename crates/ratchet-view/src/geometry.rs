//! Shape / stride / offset composition.
//!
//! A [Geometry] describes how a logical index tuple lands in a flat buffer. Composing a
//! selector list over a geometry yields another geometry over the same buffer, so a view
//! of a view is resolved by the same fold as a view of an array.
use crate::{
    rvec, Enforcer, IndexError, IndexTranslator, Layout, RVec, ResolvedRange, SelectorError,
    Selector, Selectors, Shape, Slot, Strides, ViewError,
};
use strum_macros::Display;

/// How one view axis contributes to the buffer offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AxisMap {
    /// `index * stride`.
    Strided(isize),
    /// Explicit per-position contribution, produced by keep/drop selectors.
    Table(Vec<isize>),
}

impl AxisMap {
    #[inline]
    pub fn offset_at(&self, i: usize) -> isize {
        match self {
            AxisMap::Strided(stride) => i as isize * stride,
            AxisMap::Table(table) => table[i],
        }
    }

    pub fn stride(&self) -> Option<isize> {
        match self {
            AxisMap::Strided(stride) => Some(*stride),
            AxisMap::Table(_) => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, AxisMap::Table(_))
    }

    /// Restricts the axis to `range`, returning the new map and the offset delta.
    fn select_range(&self, range: &ResolvedRange) -> (AxisMap, isize) {
        match self {
            AxisMap::Strided(stride) => (
                AxisMap::Strided(stride * range.step),
                range.start as isize * stride,
            ),
            AxisMap::Table(table) => (
                AxisMap::Table((0..range.len).map(|k| table[range.position(k)]).collect()),
                0,
            ),
        }
    }

    fn select_positions(&self, positions: &[usize]) -> AxisMap {
        AxisMap::Table(positions.iter().map(|&p| self.offset_at(p)).collect())
    }
}

/// Iteration strategy of a composed view, fixed at composition time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum ViewKind {
    /// Affine and contiguous in its layout order.
    Contiguous,
    /// Affine with arbitrary strides.
    Strided,
    /// At least one keep/drop axis; resolved through index tables.
    ListIndexed,
    /// Rank 0: a single element.
    Trivial,
}

impl ViewKind {
    pub fn is_affine(self) -> bool {
        !matches!(self, ViewKind::ListIndexed)
    }

    fn classify(shape: &Shape, axes: &[AxisMap], layout: Layout) -> Self {
        if shape.is_empty() {
            ViewKind::Trivial
        } else if axes.iter().any(AxisMap::is_table) {
            ViewKind::ListIndexed
        } else if layout.is_contiguous() {
            ViewKind::Contiguous
        } else {
            ViewKind::Strided
        }
    }
}

/// Shape, per-axis offset maps, origin offset and classification of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    shape: Shape,
    axes: RVec<AxisMap>,
    offset: isize,
    layout: Layout,
    kind: ViewKind,
}

impl Geometry {
    /// Geometry of a strided array expression, taken as reported.
    pub fn from_strided(shape: &Shape, strides: &Strides, offset: usize, layout: Layout) -> Self {
        let mut axes: RVec<AxisMap> = strides.iter().map(|&s| AxisMap::Strided(s)).collect();
        normalize_degenerate(shape, &mut axes);
        let kind = ViewKind::classify(shape, &axes, layout);
        Self {
            shape: shape.clone(),
            axes,
            offset: offset as isize,
            layout,
            kind,
        }
    }

    /// Geometry of an expression with no buffer. Its offsets address nothing; it still
    /// tracks shape and classification through composition, and is never contiguous.
    pub fn unbacked(shape: &Shape) -> Self {
        let strides = Strides::contiguous(shape, Layout::RowMajor);
        Self::from_strided(shape, &strides, 0, Layout::Dynamic)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    pub fn axes(&self) -> &[AxisMap] {
        &self.axes
    }

    /// Buffer offset of the view origin, before any table contributions.
    pub fn offset(&self) -> isize {
        self.offset
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Strides of every axis, or `None` when a keep/drop axis is present.
    pub fn strides(&self) -> Option<Strides> {
        self.axes.iter().map(AxisMap::stride).collect()
    }

    /// Buffer offset of `index` without bounds checks on the index values.
    /// Omitted trailing indices are 0.
    #[inline]
    pub fn raw_offset(&self, index: &[usize]) -> isize {
        self.axes
            .iter()
            .enumerate()
            .fold(self.offset, |acc, (axis, map)| {
                acc + map.offset_at(index.get(axis).copied().unwrap_or(0))
            })
    }

    /// Buffer offset of `index`, bounds-checked against the shape.
    pub fn offset_of(&self, index: &[usize]) -> Result<usize, IndexError> {
        Enforcer::check_index(index, &self.shape)?;
        Ok(self.raw_offset(index) as usize)
    }

    /// Applies `selectors` to this geometry.
    ///
    /// Consumes one axis per selector (none for [Selector::NewAxis]); axes left over are
    /// taken whole. Returns the composed geometry and the translator from its index space
    /// into this one.
    pub fn compose(
        &self,
        selectors: &[Selector],
    ) -> Result<(Geometry, IndexTranslator), ViewError> {
        let rank = self.rank();
        let consumed = Selectors::new(selectors).consumed();
        if consumed > rank {
            return Err(SelectorError::TooManySelectors { rank, consumed }.into());
        }
        let implicit = std::iter::repeat(&Selector::All).take(rank - consumed);

        let mut shape = Shape::default();
        let mut axes: RVec<AxisMap> = rvec![];
        let mut slots = Vec::with_capacity(selectors.len() + rank - consumed);
        let mut offset = self.offset;
        let mut axis = 0;

        for selector in selectors.iter().chain(implicit) {
            match selector {
                Selector::Index(i) => {
                    let index = Enforcer::resolve_index(axis, *i, self.shape[axis])?;
                    offset += self.axes[axis].offset_at(index);
                    slots.push(Slot::Fixed { index });
                    axis += 1;
                }
                Selector::Range(r) => {
                    let range = r.resolve(axis, self.shape[axis])?;
                    let (map, delta) = self.axes[axis].select_range(&range);
                    offset += delta;
                    shape.push(range.len);
                    axes.push(map);
                    slots.push(Slot::Affine {
                        start: range.start,
                        step: range.step,
                    });
                    axis += 1;
                }
                Selector::All => {
                    shape.push(self.shape[axis]);
                    axes.push(self.axes[axis].clone());
                    slots.push(Slot::Affine { start: 0, step: 1 });
                    axis += 1;
                }
                Selector::NewAxis => {
                    shape.push(1);
                    axes.push(AxisMap::Strided(0));
                    slots.push(Slot::Inserted);
                }
                Selector::Keep(list) => {
                    let len = self.shape[axis];
                    let positions = list
                        .iter()
                        .map(|&p| Enforcer::resolve_index(axis, p, len))
                        .collect::<Result<Vec<_>, _>>()?;
                    shape.push(positions.len());
                    axes.push(self.axes[axis].select_positions(&positions));
                    slots.push(Slot::Listed { positions });
                    axis += 1;
                }
                Selector::Drop(list) => {
                    let len = self.shape[axis];
                    let mut dropped = vec![false; len];
                    for &p in list {
                        dropped[Enforcer::resolve_index(axis, p, len)?] = true;
                    }
                    let positions = (0..len).filter(|&p| !dropped[p]).collect::<Vec<_>>();
                    shape.push(positions.len());
                    axes.push(self.axes[axis].select_positions(&positions));
                    slots.push(Slot::Listed { positions });
                    axis += 1;
                }
            }
        }
        normalize_degenerate(&shape, &mut axes);

        let layout = self.classify_layout(selectors, &shape, &axes);
        let kind = ViewKind::classify(&shape, &axes, layout);
        log::trace!(
            "Composed {} view {:?} over {:?}, layout {}",
            kind,
            shape,
            self.shape,
            layout
        );
        let geometry = Geometry {
            shape,
            axes,
            offset,
            layout,
            kind,
        };
        Ok((geometry, IndexTranslator::new(slots, rank)))
    }

    /// Stride of one step in this geometry's contiguous order.
    fn granularity(&self) -> isize {
        let mut dims = self
            .shape
            .inner()
            .iter()
            .zip(self.axes.iter())
            .filter(|(len, _)| **len > 1)
            .filter_map(|(_, map)| map.stride());
        let innermost = match self.layout {
            Layout::ColumnMajor => dims.next(),
            _ => dims.next_back(),
        };
        innermost.unwrap_or(1)
    }

    /// The composed view keeps this geometry's order only if no stepped or listed
    /// selector is involved and the retained non-degenerate axes are still packed.
    fn classify_layout(&self, selectors: &[Selector], shape: &Shape, axes: &[AxisMap]) -> Layout {
        if !self.layout.is_contiguous()
            || axes.iter().any(AxisMap::is_table)
            || selectors.iter().any(|s| s.is_listed() || s.is_stepped())
        {
            return Layout::Dynamic;
        }
        let mut dims = shape
            .inner()
            .iter()
            .zip(axes.iter())
            .filter(|(len, _)| **len > 1)
            .map(|(&len, map)| (len, map.stride()));
        let unit = self.granularity();
        let packed = |dims: &mut dyn Iterator<Item = (usize, Option<isize>)>| {
            let mut expected = unit;
            for (len, stride) in dims {
                if stride != Some(expected) {
                    return false;
                }
                expected *= len as isize;
            }
            true
        };
        let contiguous = match self.layout {
            Layout::RowMajor => packed(&mut dims.rev()),
            Layout::ColumnMajor => packed(&mut dims),
            Layout::Dynamic => false,
        };
        if contiguous {
            self.layout
        } else {
            Layout::Dynamic
        }
    }
}

/// Length-1 axes report stride 0: their only valid index is 0.
fn normalize_degenerate(shape: &Shape, axes: &mut [AxisMap]) {
    for (len, map) in shape.iter().zip(axes.iter_mut()) {
        if *len == 1 {
            if let AxisMap::Strided(stride) = map {
                *stride = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{s, shape};

    fn base(shape: Shape, layout: Layout) -> Geometry {
        let strides = Strides::contiguous(&shape, layout);
        Geometry::from_strided(&shape, &strides, 0, layout)
    }

    fn compose(g: &Geometry, sel: &[Selector]) -> Geometry {
        g.compose(sel).unwrap().0
    }

    fn strides_of(g: &Geometry, sel: &[Selector]) -> Vec<isize> {
        compose(g, sel).strides().unwrap().to_vec()
    }

    #[test]
    fn strides() {
        // Strides: 72/24/6/1
        let a = base(shape![5, 3, 4, 6], Layout::RowMajor);
        let na = Selector::NewAxis;
        let r = |start, stop, step| Selector::stepped(Some(start), Some(stop), step);

        assert_eq!(strides_of(&a, &s![1, 1, .., ..]), vec![6, 1]);
        assert_eq!(strides_of(&a, &s![1, .., .., 1]), vec![24, 6]);
        assert_eq!(
            strides_of(&a, &s![1, .., 1, na.clone(), na.clone(), ..]),
            vec![24, 0, 0, 1]
        );
        assert_eq!(
            strides_of(&a, &s![r(0, 1, 2), 1, 0, .., na.clone()]),
            vec![0, 1, 0]
        );
        assert_eq!(
            strides_of(&a, &s![r(0, 5, 2), 1, 0, .., na.clone()]),
            vec![72 * 2, 1, 0]
        );
        assert_eq!(strides_of(&a, &s![.., 1]), vec![72, 6, 1]);
        assert_eq!(strides_of(&a, &s![.., 1, 1, na.clone(), ..]), vec![72, 0, 1]);
        assert_eq!(strides_of(&a, &s![.., 1, na, ..]), vec![72, 0, 6, 1]);
    }

    #[test]
    fn data_offset() {
        let a = base(shape![3, 3, 3, 3, 3, 3], Layout::RowMajor);
        let st = Strides::from(a.shape());
        let na = Selector::NewAxis;

        let g = compose(&a, &s![1, 1, na.clone(), 1]);
        assert_eq!(g.offset(), st[0] + st[1] + st[2]);
        assert_eq!(g.rank(), 4);

        let g = compose(
            &a,
            &s![1, 2, na, 1..2, Selector::stepped(Some(2), Some(2), 4), ..],
        );
        assert_eq!(g.offset(), st[0] + 2 * st[1] + st[2] + 2 * st[3]);
        assert_eq!(g.shape(), &shape![1, 1, 0, 3, 3]);
    }

    #[test]
    fn layout_on_row_major() {
        let a = base(shape![3, 4], Layout::RowMajor);
        assert_eq!(compose(&a, &s![1, 1..4]).layout(), Layout::RowMajor);
        assert_eq!(compose(&a, &s![0..2, 2]).layout(), Layout::Dynamic);
        assert_eq!(compose(&a, &s![1]).layout(), Layout::RowMajor);
        assert_eq!(compose(&a, &s![1, ..]).layout(), Layout::RowMajor);
        assert_eq!(compose(&a, &s![.., 2]).layout(), Layout::Dynamic);

        let row = compose(&a, &s![1]);
        let scalar = compose(&row, &s![1]);
        assert_eq!(scalar.rank(), 0);
        assert_eq!(scalar.layout(), Layout::RowMajor);
        assert_eq!(scalar.kind(), ViewKind::Trivial);
    }

    #[test]
    fn layout_on_column_major() {
        let a = base(shape![3, 4], Layout::ColumnMajor);
        assert_eq!(compose(&a, &s![1, 1..4]).layout(), Layout::Dynamic);
        assert_eq!(compose(&a, &s![0..2, 2]).layout(), Layout::ColumnMajor);
        assert_eq!(compose(&a, &s![.., 2]).layout(), Layout::ColumnMajor);

        // A view over a dynamic view stays dynamic, even when rank 0.
        let row = compose(&a, &s![1]);
        assert_eq!(row.layout(), Layout::Dynamic);
        let scalar = compose(&row, &s![1]);
        assert_eq!(scalar.layout(), Layout::Dynamic);
        assert_eq!(scalar.kind(), ViewKind::Trivial);
    }

    #[test]
    fn contiguous_row_major() {
        let a = base(shape![3, 4, 6, 5], Layout::RowMajor);
        let contiguous = |sel: &[Selector]| compose(&a, sel).kind() == ViewKind::Contiguous;

        assert!(contiguous(&s![.., .., ..]));
        assert!(contiguous(&s![1, 1, ..]));
        assert!(contiguous(&s![1, .., ..]));
        assert!(contiguous(&s![1, .., .., ..]));
        assert!(contiguous(&s![1, 1, 1..3]));
        assert!(contiguous(&s![1, 1..3]));
        assert!(!contiguous(&s![1, 1..3, 1]));
        assert!(!contiguous(&s![.., .., 1, 1]));
    }

    #[test]
    fn contiguous_column_major() {
        let a = base(shape![3, 4, 6, 5], Layout::ColumnMajor);
        let contiguous = |sel: &[Selector]| compose(&a, sel).kind() == ViewKind::Contiguous;

        assert!(contiguous(&s![.., .., .., ..]));
        assert!(!contiguous(&s![1, 1, ..]));
        assert!(!contiguous(&s![1, .., ..]));
        assert!(!contiguous(&s![1, .., .., ..]));
        assert!(!contiguous(&s![1, 1, 1..3]));
        assert!(!contiguous(&s![1, 1..3]));
        assert!(!contiguous(&s![1, 1..3, 1]));

        assert!(contiguous(&s![.., .., 1, 1]));
        assert!(contiguous(&s![.., .., 1..3, 1]));
        assert!(!contiguous(&s![.., 1..3, 1..3, 1]));
        assert!(!contiguous(&s![.., 1..3, .., 1]));
        assert!(!contiguous(&s![
            ..,
            Selector::stepped(Some(0), Some(4), 2),
            1,
            1
        ]));
    }

    #[test]
    fn listed_axes_are_tables() {
        let a = base(shape![3, 2, 4], Layout::RowMajor);
        let g = compose(
            &a,
            &[Selector::keep([1]), Selector::keep([0, 1]), Selector::keep([0, 3])],
        );
        assert_eq!(g.shape(), &shape![1, 2, 2]);
        assert_eq!(g.kind(), ViewKind::ListIndexed);
        assert_eq!(g.layout(), Layout::Dynamic);
        assert!(g.strides().is_none());
        assert_eq!(g.raw_offset(&[0, 1, 1]), 8 + 4 + 3);

        let d = compose(
            &a,
            &[Selector::drop([0, 2]), Selector::keep([0, 1]), Selector::drop([1, 2])],
        );
        assert_eq!(d.shape(), g.shape());
        assert_eq!(d.raw_offset(&[0, 1, 1]), g.raw_offset(&[0, 1, 1]));
    }

    #[test]
    fn keep_preserves_order_and_duplicates() {
        let a = base(shape![5], Layout::RowMajor);
        let g = compose(&a, &[Selector::keep([3, 1, 1, -1])]);
        let offsets = (0..4).map(|i| g.raw_offset(&[i])).collect::<Vec<_>>();
        assert_eq!(offsets, vec![3, 1, 1, 4]);
    }

    #[test]
    fn ranges_over_tables_resample() {
        let a = base(shape![6], Layout::RowMajor);
        let kept = compose(&a, &[Selector::keep([5, 4, 2, 0])]);
        let g = compose(&kept, &[Selector::stepped(None, None, -2)]);
        assert_eq!(g.shape(), &shape![2]);
        assert_eq!(g.raw_offset(&[0]), 0);
        assert_eq!(g.raw_offset(&[1]), 4);
        assert_eq!(g.kind(), ViewKind::ListIndexed);
    }

    #[test]
    fn too_many_selectors() {
        let a = base(shape![4], Layout::RowMajor);
        let err = a.compose(&s![Selector::NewAxis, 1, 1..2]).unwrap_err();
        assert_eq!(
            err,
            ViewError::Selector(SelectorError::TooManySelectors {
                rank: 1,
                consumed: 2
            })
        );
    }

    #[test]
    fn out_of_bounds_selectors() {
        let a = base(shape![3, 4], Layout::RowMajor);
        assert!(matches!(
            a.compose(&s![3]),
            Err(ViewError::Index(IndexError::OutOfBounds { axis: 0, .. }))
        ));
        assert!(matches!(
            a.compose(&[Selector::All, Selector::keep([0, 4])]),
            Err(ViewError::Index(IndexError::OutOfBounds { axis: 1, index: 4, len: 4 }))
        ));
        assert!(matches!(
            a.compose(&[Selector::drop([-5])]),
            Err(ViewError::Index(IndexError::OutOfBounds { axis: 0, .. }))
        ));
        assert!(matches!(
            a.compose(&s![.., Selector::stepped(None, None, 0)]),
            Err(ViewError::Selector(SelectorError::ZeroStep { axis: 1 }))
        ));
    }

    #[test]
    fn negative_index_matches_positive() {
        let a = base(shape![3, 4], Layout::RowMajor);
        assert_eq!(compose(&a, &s![-2, -1]), compose(&a, &s![1, 3]));
        assert_eq!(
            compose(&a, &[Selector::keep([-3, -1])]),
            compose(&a, &[Selector::keep([0, 2])])
        );
    }
}
