//! Borrowed views over strided buffers.
use crate::{
    translate_chain, BroadcastError, DenseArray, ElementType, Enforcer, Expression, Geometry,
    IndexError, IndexTranslator, Iter, Layout, Offsets, Order, RVec, Selector, SelectorError,
    Shape, Strided, StridedMut, Strides, ViewKind,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
    #[error("Expected a rank 0 view, got rank {rank}.")]
    NotScalar { rank: usize },
}

/// # View
///
/// A read-only window over a strided buffer, derived by applying selectors to an array
/// or to another view. Composing never copies: every view of the same base, at any depth,
/// shares the base's buffer.
#[derive(Clone)]
pub struct View<'a, T> {
    data: &'a [T],
    geometry: Geometry,
    lineage: Vec<IndexTranslator>,
}

impl<'a, T: ElementType> View<'a, T> {
    pub fn new<E: Strided<T> + ?Sized>(
        expr: &'a E,
        selectors: &[Selector],
    ) -> Result<Self, ViewError> {
        let (geometry, translator) = expr.geometry().compose(selectors)?;
        Ok(Self {
            data: expr.data(),
            geometry,
            lineage: vec![translator],
        })
    }

    pub(crate) fn from_geometry(data: &'a [T], geometry: Geometry) -> Self {
        Self {
            data,
            geometry,
            lineage: vec![],
        }
    }

    /// Composes `selectors` over this view. The result borrows the same buffer.
    pub fn view(&self, selectors: &[Selector]) -> Result<View<'a, T>, ViewError> {
        let (geometry, translator) = self.geometry.compose(selectors)?;
        let mut lineage = self.lineage.clone();
        lineage.push(translator);
        Ok(View {
            data: self.data,
            geometry,
            lineage,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn shape(&self) -> &Shape {
        self.geometry.shape()
    }

    pub fn rank(&self) -> usize {
        self.geometry.rank()
    }

    pub fn numel(&self) -> usize {
        self.geometry.numel()
    }

    /// `None` when a keep/drop axis is present.
    pub fn strides(&self) -> Option<Strides> {
        self.geometry.strides()
    }

    pub fn layout(&self) -> Layout {
        self.geometry.layout()
    }

    pub fn kind(&self) -> ViewKind {
        self.geometry.kind()
    }

    pub fn offset(&self) -> isize {
        self.geometry.offset()
    }

    /// Buffer position of element `(0, ..., 0)` of an affine view.
    pub fn data_offset(&self) -> usize {
        self.geometry.offset() as usize
    }

    /// The whole underlying buffer, shared with the base array.
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Translators from this view down to the base, innermost first.
    pub fn lineage(&self) -> &[IndexTranslator] {
        &self.lineage
    }

    /// Index tuple in the base array of the element at `index` in this view.
    pub fn base_index(&self, index: &[usize]) -> Result<RVec<usize>, ViewError> {
        Enforcer::check_index(index, self.shape())?;
        Ok(translate_chain(&self.lineage, index))
    }

    /// Checked access; omitted trailing indices are 0.
    pub fn at(&self, index: &[usize]) -> Result<&'a T, ViewError> {
        let offset = self.geometry.offset_of(index)?;
        Ok(&self.data[offset])
    }

    /// # Safety
    /// `index` must have at most `rank` entries, each within its axis length.
    /// Out-of-range indices read outside the buffer.
    pub unsafe fn uget(&self, index: &[usize]) -> &'a T {
        let offset = self.geometry.raw_offset(index) as usize;
        self.data.get_unchecked(offset)
    }

    pub fn iter(&self, order: Order) -> Iter<'_, T> {
        Iter::new(self.data, &self.geometry, order)
    }

    pub fn offsets(&self, order: Order) -> Offsets<'_> {
        Offsets::new(&self.geometry, order)
    }

    /// The elements as one slice, when the view is contiguous.
    pub fn as_slice(&self) -> Option<&'a [T]> {
        match self.kind() {
            ViewKind::Contiguous if self.numel() == 0 => Some(&self.data[..0]),
            ViewKind::Contiguous => {
                let start = self.data_offset();
                Some(&self.data[start..start + self.numel()])
            }
            _ => None,
        }
    }

    pub fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        match self.as_slice() {
            Some(slice) if self.layout() == Layout::RowMajor => slice.iter().fold(init, f),
            _ => self.iter(Order::RowMajor).fold(init, |acc, v| f(acc, v)),
        }
    }

    pub fn to_vec(&self, order: Order) -> Vec<T> {
        match self.as_slice() {
            Some(slice) if self.layout().order() == Some(order) => slice.to_vec(),
            _ => self.iter(order).copied().collect(),
        }
    }

    /// Copies the view into a new row-major array.
    pub fn to_array(&self) -> DenseArray<T> {
        DenseArray::from_data(self.to_vec(Order::RowMajor), self.shape().clone())
    }

    pub fn as_scalar(&self) -> Result<&'a T, ViewError> {
        match self.rank() {
            0 => self.at(&[]),
            rank => Err(ViewError::NotScalar { rank }),
        }
    }
}

impl<T: ElementType> Expression<T> for View<'_, T> {
    fn shape(&self) -> &Shape {
        self.geometry.shape()
    }

    fn element(&self, index: &[usize]) -> T {
        self.data[self.geometry.raw_offset(index) as usize]
    }
}

impl<T: ElementType> std::ops::Index<&[usize]> for View<'_, T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        match self.at(index) {
            Ok(v) => v,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<'v, 'a, T: ElementType> IntoIterator for &'v View<'a, T> {
    type Item = &'v T;
    type IntoIter = Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter(Order::RowMajor)
    }
}

impl<T: ElementType> std::fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("shape", self.shape())
            .field("kind", &self.kind())
            .field("layout", &self.layout())
            .field("offset", &self.offset())
            .field("depth", &self.lineage.len())
            .finish()
    }
}

/// # ViewMut
///
/// A writable window over a strided buffer. Holds the exclusive borrow of the base for as
/// long as it lives; nested mutable views reborrow it.
pub struct ViewMut<'a, T> {
    pub(crate) data: &'a mut [T],
    pub(crate) geometry: Geometry,
    lineage: Vec<IndexTranslator>,
}

impl<'a, T: ElementType> ViewMut<'a, T> {
    pub fn new<E: StridedMut<T> + ?Sized>(
        expr: &'a mut E,
        selectors: &[Selector],
    ) -> Result<Self, ViewError> {
        let (geometry, translator) = expr.geometry().compose(selectors)?;
        Ok(Self {
            data: expr.data_mut(),
            geometry,
            lineage: vec![translator],
        })
    }

    fn compose(&self, selectors: &[Selector]) -> Result<(Geometry, Vec<IndexTranslator>), ViewError> {
        let (geometry, translator) = self.geometry.compose(selectors)?;
        let mut lineage = self.lineage.clone();
        lineage.push(translator);
        Ok((geometry, lineage))
    }

    pub fn view(&self, selectors: &[Selector]) -> Result<View<'_, T>, ViewError> {
        let (geometry, lineage) = self.compose(selectors)?;
        Ok(View {
            data: &*self.data,
            geometry,
            lineage,
        })
    }

    /// Composes `selectors` over this view, reborrowing its buffer.
    pub fn view_mut(&mut self, selectors: &[Selector]) -> Result<ViewMut<'_, T>, ViewError> {
        let (geometry, lineage) = self.compose(selectors)?;
        Ok(ViewMut {
            data: &mut *self.data,
            geometry,
            lineage,
        })
    }

    /// Like [ViewMut::view_mut], keeping the full borrow of the base.
    pub fn into_view_mut(self, selectors: &[Selector]) -> Result<ViewMut<'a, T>, ViewError> {
        let (geometry, lineage) = self.compose(selectors)?;
        Ok(ViewMut {
            data: self.data,
            geometry,
            lineage,
        })
    }

    pub fn as_view(&self) -> View<'_, T> {
        View {
            data: &*self.data,
            geometry: self.geometry.clone(),
            lineage: self.lineage.clone(),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn shape(&self) -> &Shape {
        self.geometry.shape()
    }

    pub fn rank(&self) -> usize {
        self.geometry.rank()
    }

    pub fn numel(&self) -> usize {
        self.geometry.numel()
    }

    pub fn strides(&self) -> Option<Strides> {
        self.geometry.strides()
    }

    pub fn layout(&self) -> Layout {
        self.geometry.layout()
    }

    pub fn kind(&self) -> ViewKind {
        self.geometry.kind()
    }

    pub fn offset(&self) -> isize {
        self.geometry.offset()
    }

    pub fn data_offset(&self) -> usize {
        self.geometry.offset() as usize
    }

    pub fn lineage(&self) -> &[IndexTranslator] {
        &self.lineage
    }

    pub fn base_index(&self, index: &[usize]) -> Result<RVec<usize>, ViewError> {
        Enforcer::check_index(index, self.shape())?;
        Ok(translate_chain(&self.lineage, index))
    }

    pub fn at(&self, index: &[usize]) -> Result<&T, ViewError> {
        let offset = self.geometry.offset_of(index)?;
        Ok(&self.data[offset])
    }

    pub fn at_mut(&mut self, index: &[usize]) -> Result<&mut T, ViewError> {
        let offset = self.geometry.offset_of(index)?;
        Ok(&mut self.data[offset])
    }

    /// # Safety
    /// See [View::uget].
    pub unsafe fn uget(&self, index: &[usize]) -> &T {
        let offset = self.geometry.raw_offset(index) as usize;
        self.data.get_unchecked(offset)
    }

    /// # Safety
    /// See [View::uget].
    pub unsafe fn uget_mut(&mut self, index: &[usize]) -> &mut T {
        let offset = self.geometry.raw_offset(index) as usize;
        self.data.get_unchecked_mut(offset)
    }

    pub fn iter(&self, order: Order) -> Iter<'_, T> {
        Iter::new(&*self.data, &self.geometry, order)
    }

    pub fn offsets(&self, order: Order) -> Offsets<'_> {
        Offsets::new(&self.geometry, order)
    }

    pub fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.as_view().fold(init, f)
    }

    pub fn to_vec(&self, order: Order) -> Vec<T> {
        self.as_view().to_vec(order)
    }

    pub fn to_array(&self) -> DenseArray<T> {
        self.as_view().to_array()
    }

    pub fn as_scalar(&self) -> Result<&T, ViewError> {
        match self.rank() {
            0 => self.at(&[]),
            rank => Err(ViewError::NotScalar { rank }),
        }
    }

    pub fn as_scalar_mut(&mut self) -> Result<&mut T, ViewError> {
        match self.rank() {
            0 => self.at_mut(&[]),
            rank => Err(ViewError::NotScalar { rank }),
        }
    }
}

impl<T: ElementType> Expression<T> for ViewMut<'_, T> {
    fn shape(&self) -> &Shape {
        self.geometry.shape()
    }

    fn element(&self, index: &[usize]) -> T {
        self.data[self.geometry.raw_offset(index) as usize]
    }
}

impl<T: ElementType> std::ops::Index<&[usize]> for ViewMut<'_, T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        match self.at(index) {
            Ok(v) => v,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: ElementType> std::ops::IndexMut<&[usize]> for ViewMut<'_, T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        match self.at_mut(index) {
            Ok(v) => v,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: ElementType> std::fmt::Debug for ViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewMut")
            .field("shape", self.shape())
            .field("kind", &self.kind())
            .field("layout", &self.layout())
            .field("offset", &self.offset())
            .field("depth", &self.lineage.len())
            .finish()
    }
}
