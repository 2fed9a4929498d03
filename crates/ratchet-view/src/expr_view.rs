//! Views over expressions that are computed rather than stored.
use crate::{
    translate_chain, DenseArray, ElementType, Enforcer, Expression, Geometry, IndexTranslator,
    Indices, Layout, Order, RVec, Selector, Shape, ViewError, ViewKind,
};
use std::marker::PhantomData;

/// # ExprView
///
/// A view over an [Expression] with no backing buffer, such as an elementwise sum of two
/// arrays. Nothing is evaluated up front: an element is read by translating its index
/// down the lineage and evaluating the expression there.
pub struct ExprView<'e, T, E: ?Sized> {
    expr: &'e E,
    geometry: Geometry,
    lineage: Vec<IndexTranslator>,
    _element: PhantomData<fn() -> T>,
}

impl<'e, T, E: Expression<T> + ?Sized> ExprView<'e, T, E> {
    pub fn new(expr: &'e E, selectors: &[Selector]) -> Result<Self, ViewError> {
        let (geometry, translator) = Geometry::unbacked(expr.shape()).compose(selectors)?;
        Ok(Self {
            expr,
            geometry,
            lineage: vec![translator],
            _element: PhantomData,
        })
    }

    /// Composes `selectors` over this view. The result reads the same expression.
    pub fn view(&self, selectors: &[Selector]) -> Result<ExprView<'e, T, E>, ViewError> {
        let (geometry, translator) = self.geometry.compose(selectors)?;
        let mut lineage = self.lineage.clone();
        lineage.push(translator);
        Ok(ExprView {
            expr: self.expr,
            geometry,
            lineage,
            _element: PhantomData,
        })
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

    /// Always [Layout::Dynamic]: there is no buffer order to preserve.
    pub fn layout(&self) -> Layout {
        self.geometry.layout()
    }

    pub fn kind(&self) -> ViewKind {
        self.geometry.kind()
    }

    pub fn lineage(&self) -> &[IndexTranslator] {
        &self.lineage
    }

    /// Index tuple in the underlying expression of the element at `index`.
    pub fn base_index(&self, index: &[usize]) -> Result<RVec<usize>, ViewError> {
        Enforcer::check_index(index, self.shape())?;
        Ok(translate_chain(&self.lineage, index))
    }

    /// Checked access; omitted trailing indices are 0.
    pub fn at(&self, index: &[usize]) -> Result<T, ViewError> {
        let base = self.base_index(index)?;
        Ok(self.expr.element(&base))
    }

    pub fn iter(&self, order: Order) -> impl Iterator<Item = T> + '_ {
        Indices::new(self.shape(), order).map(move |index| self.element(&index))
    }

    pub fn to_vec(&self, order: Order) -> Vec<T> {
        self.iter(order).collect()
    }

    pub fn as_scalar(&self) -> Result<T, ViewError> {
        match self.rank() {
            0 => self.at(&[]),
            rank => Err(ViewError::NotScalar { rank }),
        }
    }
}

impl<T: ElementType, E: Expression<T> + ?Sized> ExprView<'_, T, E> {
    /// Evaluates the view into a new row-major array.
    pub fn to_array(&self) -> DenseArray<T> {
        DenseArray::from_data(self.to_vec(Order::RowMajor), self.shape().clone())
    }
}

impl<T, E: Expression<T> + ?Sized> Expression<T> for ExprView<'_, T, E> {
    fn shape(&self) -> &Shape {
        self.geometry.shape()
    }

    fn element(&self, index: &[usize]) -> T {
        self.expr.element(&translate_chain(&self.lineage, index))
    }
}

impl<T, E: ?Sized> Clone for ExprView<'_, T, E> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr,
            geometry: self.geometry.clone(),
            lineage: self.lineage.clone(),
            _element: PhantomData,
        }
    }
}

impl<T, E: ?Sized> std::fmt::Debug for ExprView<'_, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExprView")
            .field("shape", self.geometry.shape())
            .field("kind", &self.geometry.kind())
            .field("depth", &self.lineage.len())
            .finish()
    }
}
