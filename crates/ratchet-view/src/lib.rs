mod array;
mod assign;
mod dtype;
mod eligibility;
mod enforcer;
mod expr;
mod expr_view;
mod geometry;
mod layout;
#[cfg(feature = "testing")]
mod ndarray_ext;
mod selector;
mod shape;
mod strides;
mod translate;
mod traverse;
mod view;

pub use array::*;
pub use assign::*;
pub use dtype::*;
pub use eligibility::*;
pub use enforcer::*;
pub use expr::*;
pub use expr_view::*;
pub use geometry::*;
pub use layout::*;
#[cfg(feature = "testing")]
pub use ndarray_ext::*;
pub use selector::*;
pub use shape::*;
pub use strides::*;
pub use translate::*;
pub use traverse::*;
pub use view::*;

use smallvec::SmallVec;
pub type RVec<T> = SmallVec<[T; 4]>;

//https://github.com/sonos/tract/blob/main/data/src/macros.rs#L2
#[macro_export]
macro_rules! rvec {
    (@one $x:expr) => (1usize);
    ($elem:expr; $n:expr) => ({
        $crate::RVec::from_elem($elem, $n)
    });
    ($($x:expr),*$(,)*) => ({
        let count = 0usize $(+ rvec![@one $x])*;
        #[allow(unused_mut)]
        let mut vec = $crate::RVec::new();
        if count <= vec.inline_size() {
            $(vec.push($x);)*
            vec
        } else {
            $crate::RVec::from_vec(vec![$($x,)*])
        }
    });
}

#[macro_export]
macro_rules! shape {
    ($($x:expr),*$(,)*) => ({
        use $crate::rvec;
        $crate::Shape::new(rvec![$($x,)*])
    });
}

/// Builds a selector list from integers, Rust ranges and [Selector] values.
///
/// ```
/// use ratchet_view::{s, Selector};
/// let sel = s![1, .., 1..4, Selector::NewAxis];
/// assert_eq!(sel.len(), 4);
/// ```
#[macro_export]
macro_rules! s {
    ($($x:expr),*$(,)*) => ({
        [$($crate::Selector::from($x),)*]
    });
}

pub mod prelude {
    pub use crate::{
        rvec, s, shape, DenseArray, ExprView, Expression, Layout, Order, Selector, View,
        ViewError, ViewKind, ViewMut,
    };
}
