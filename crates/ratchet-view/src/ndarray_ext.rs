//! Conversions to and from `ndarray`, used as an independent reference in tests.
use crate::{DenseArray, ElementType, Expression, Selector, Shape};
use ndarray::{Array, ArrayD, Dimension, IxDyn, SliceInfoElem};

pub trait ToNdArray<T> {
    fn to_ndarray(&self) -> ArrayD<T>;
}

impl<T: ElementType, E: Expression<T>> ToNdArray<T> for E {
    fn to_ndarray(&self) -> ArrayD<T> {
        Array::from_shape_fn(IxDyn(&self.shape().to_vec()), |idx| {
            self.element(idx.slice())
        })
    }
}

impl<T: ElementType> From<ArrayD<T>> for DenseArray<T> {
    fn from(it: ArrayD<T>) -> Self {
        let shape = Shape::from(it.shape());
        let data = it.iter().copied().collect::<Vec<_>>();
        DenseArray::from_data(data, shape)
    }
}

/// The `ndarray` slice equivalent to `selectors` over an array of rank `rank`.
///
/// `None` for keep/drop selectors and negative steps, which `ndarray` either lacks or
/// interprets differently.
pub fn to_slice_info(selectors: &[Selector], rank: usize) -> Option<Vec<SliceInfoElem>> {
    let mut info = selectors
        .iter()
        .map(|selector| match selector {
            Selector::Index(i) => Some(SliceInfoElem::Index(*i)),
            Selector::All => Some(SliceInfoElem::from(..)),
            Selector::NewAxis => Some(SliceInfoElem::NewAxis),
            Selector::Range(r) if r.step > 0 => Some(SliceInfoElem::Slice {
                start: r.start.unwrap_or(0),
                end: r.stop,
                step: r.step,
            }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    let consumed = selectors.iter().map(Selector::consumed).sum::<usize>();
    info.extend((consumed..rank).map(|_| SliceInfoElem::from(..)));
    Some(info)
}
