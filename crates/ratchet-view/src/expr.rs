use crate::{Geometry, Layout, Shape, Strides};

/// Anything with a shape whose elements can be read by index tuple.
///
/// This is what assignment consumes as a source.
pub trait Expression<T> {
    fn shape(&self) -> &Shape;

    /// Element at a full, in-bounds index tuple. Panics otherwise.
    fn element(&self, index: &[usize]) -> T;
}

/// An expression stored in a flat buffer and addressed through strides.
///
/// Views can be composed over any implementor; they borrow [Strided::data] for their
/// whole lifetime.
pub trait Strided<T>: Expression<T> {
    /// Signed strides, in elements.
    fn strides(&self) -> Strides;

    fn layout(&self) -> Layout;

    /// Buffer position of the element at index `(0, ..., 0)`.
    fn offset(&self) -> usize {
        0
    }

    fn data(&self) -> &[T];

    fn geometry(&self) -> Geometry {
        Geometry::from_strided(
            self.shape(),
            &self.strides(),
            self.offset(),
            self.layout(),
        )
    }
}

pub trait StridedMut<T>: Strided<T> {
    fn data_mut(&mut self) -> &mut [T];
}
