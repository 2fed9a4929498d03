use half::{bf16, f16};
use strum_macros::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash, Display)]
pub enum DType {
    U8,
    F16,
    BF16,
    #[default]
    F32,
    I32,
    U32,
    F64,
    I64,
}

impl DType {
    /// Returns the size of the type in bytes.
    pub fn size_of(self) -> usize {
        match self {
            DType::U8 => 1,
            DType::F16 => 2,
            DType::BF16 => 2,
            DType::F32 => 4,
            DType::I32 => 4,
            DType::U32 => 4,
            DType::F64 => 8,
            DType::I64 => 8,
        }
    }
}

/// Element types a [crate::DenseArray] can hold and a view can hand out.
pub trait ElementType:
    Copy
    + std::fmt::Debug
    + PartialEq
    + 'static
    + num_traits::Zero
    + num_traits::One
    + Send
    + Sync
    + bytemuck::Pod
{
    fn dt() -> DType;
}

macro_rules! map_type {
    ($t:ty, $v:ident) => {
        impl ElementType for $t {
            fn dt() -> DType {
                DType::$v
            }
        }
    };
}

map_type!(u8, U8);
map_type!(f32, F32);
map_type!(i32, I32);
map_type!(u32, U32);
map_type!(f64, F64);
map_type!(i64, I64);
map_type!(f16, F16);
map_type!(bf16, BF16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_rust_types() {
        assert_eq!(f16::dt().size_of(), std::mem::size_of::<f16>());
        assert_eq!(bf16::dt().size_of(), std::mem::size_of::<bf16>());
        assert_eq!(f64::dt().size_of(), std::mem::size_of::<f64>());
        assert_eq!(u8::dt().size_of(), std::mem::size_of::<u8>());
        assert_eq!(i64::dt().size_of(), std::mem::size_of::<i64>());
    }
}
