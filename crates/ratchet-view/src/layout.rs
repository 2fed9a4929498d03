use strum_macros::{Display, EnumIter};

/// Memory order of an array or view, relative to its shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Display)]
pub enum Layout {
    #[default]
    RowMajor,
    ColumnMajor,
    /// Strides follow neither contiguous order.
    Dynamic,
}

impl Layout {
    pub fn is_contiguous(self) -> bool {
        !matches!(self, Layout::Dynamic)
    }

    /// The traversal order that walks this layout's buffer linearly.
    pub fn order(self) -> Option<Order> {
        match self {
            Layout::RowMajor => Some(Order::RowMajor),
            Layout::ColumnMajor => Some(Order::ColumnMajor),
            Layout::Dynamic => None,
        }
    }
}

/// Logical enumeration order for traversals, independent of storage layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum Order {
    #[default]
    RowMajor,
    ColumnMajor,
}

impl From<Order> for Layout {
    fn from(order: Order) -> Self {
        match order {
            Order::RowMajor => Layout::RowMajor,
            Order::ColumnMajor => Layout::ColumnMajor,
        }
    }
}
