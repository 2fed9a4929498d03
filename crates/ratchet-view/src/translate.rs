//! Index translation from a view into the expression it was composed over.
//!
//! A view built on another view does not nest types: its geometry is re-derived over the
//! shared buffer. The translators kept in a view's lineage still let a caller walk an
//! index tuple back down, level by level, to the index tuple of the base array.
use crate::RVec;

/// How one selector maps an outer index onto the parent's index tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Parent axis collapsed by an index selector.
    Fixed { index: usize },
    /// Range or full axis: `parent = start + outer * step`.
    Affine { start: usize, step: isize },
    /// Keep/drop axis: `parent = positions[outer]`.
    Listed { positions: Vec<usize> },
    /// Axis inserted by a new-axis selector. Its outer index is consumed and ignored.
    Inserted,
}

impl Slot {
    fn parent_index(&self, outer: usize) -> usize {
        match self {
            Slot::Fixed { index } => *index,
            Slot::Affine { start, step } => (*start as isize + outer as isize * step) as usize,
            Slot::Listed { positions } => positions[outer],
            Slot::Inserted => 0,
        }
    }

    fn consumes_outer(&self) -> bool {
        !matches!(self, Slot::Fixed { .. })
    }

    fn emits_parent(&self) -> bool {
        !matches!(self, Slot::Inserted)
    }
}

/// Translates index tuples of a composed view into index tuples of its parent.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct IndexTranslator {
    slots: Vec<Slot>,
    parent_rank: usize,
}

impl IndexTranslator {
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn parent_rank(&self) -> usize {
        self.parent_rank
    }

    /// Rank of the view on the outer side of this translator.
    pub fn outer_rank(&self) -> usize {
        self.slots.iter().filter(|s| s.consumes_outer()).count()
    }

    /// Maps `outer` to the parent's index tuple.
    ///
    /// Missing trailing outer indices are taken as 0. The caller guarantees `outer` is in
    /// bounds for the view; no checks are performed here.
    pub fn translate(&self, outer: &[usize]) -> RVec<usize> {
        let mut parent = RVec::with_capacity(self.parent_rank);
        let mut k = 0;
        for slot in &self.slots {
            let value = if slot.consumes_outer() {
                let v = outer.get(k).copied().unwrap_or(0);
                k += 1;
                v
            } else {
                0
            };
            if slot.emits_parent() {
                parent.push(slot.parent_index(value));
            }
        }
        parent
    }
}

/// Walks `index` through a chain of translators, outermost last.
pub fn translate_chain(lineage: &[IndexTranslator], index: &[usize]) -> RVec<usize> {
    let mut current: RVec<usize> = index.iter().copied().collect();
    for translator in lineage.iter().rev() {
        current = translator.translate(&current);
    }
    current
}
