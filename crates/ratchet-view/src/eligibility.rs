use crate::{DType, ElementType, Geometry, View, ViewKind, ViewMut};
use strum_macros::{Display, EnumIter};

/// Width in bytes of the register a batched kernel loads at once.
pub const BATCH_REGISTER_BYTES: usize = 16;

/// Used to select the widest element a batched kernel can load.
/// If (element count % lanes) == 0 and the lanes fit the register, it is safe to use.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Display, EnumIter)]
pub enum KernelElement {
    Vec4,
    Vec2,
    Scalar,
}

impl KernelElement {
    pub fn as_size(&self) -> usize {
        self.into()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KernelElement::Vec4 => "vec4",
            KernelElement::Vec2 => "vec2",
            KernelElement::Scalar => "scalar",
        }
    }

    /// Whether `numel` elements of `dt` can be processed in groups of this width.
    pub fn fits(&self, dt: DType, numel: usize) -> bool {
        let lanes = self.as_size();
        lanes * dt.size_of() <= BATCH_REGISTER_BYTES && numel % lanes == 0
    }
}

impl From<&KernelElement> for usize {
    fn from(item: &KernelElement) -> Self {
        match item {
            KernelElement::Vec4 => 4,
            KernelElement::Vec2 => 2,
            KernelElement::Scalar => 1,
        }
    }
}

impl Geometry {
    /// Widest element usable to batch over this geometry's elements of type `dt`.
    ///
    /// Only contiguous views batch; everything else reports [KernelElement::Scalar].
    pub fn batch_element(&self, dt: DType) -> KernelElement {
        if self.kind() != ViewKind::Contiguous || self.axes().iter().any(|m| m.is_table()) {
            return KernelElement::Scalar;
        }
        let numel = self.numel();
        [KernelElement::Vec4, KernelElement::Vec2]
            .into_iter()
            .find(|ke| ke.fits(dt, numel))
            .unwrap_or(KernelElement::Scalar)
    }

    pub fn is_batch_eligible(&self, dt: DType) -> bool {
        self.batch_element(dt) != KernelElement::Scalar
    }
}

impl<T: ElementType> View<'_, T> {
    pub fn batch_element(&self) -> KernelElement {
        self.geometry().batch_element(T::dt())
    }

    pub fn is_batch_eligible(&self) -> bool {
        self.geometry().is_batch_eligible(T::dt())
    }
}

impl<T: ElementType> ViewMut<'_, T> {
    pub fn batch_element(&self) -> KernelElement {
        self.geometry().batch_element(T::dt())
    }

    pub fn is_batch_eligible(&self) -> bool {
        self.geometry().is_batch_eligible(T::dt())
    }
}
