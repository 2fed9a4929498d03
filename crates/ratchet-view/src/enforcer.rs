use crate::Shape;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("Index {index} is out of bounds for axis {axis} with length {len}.")]
    OutOfBounds {
        axis: usize,
        index: isize,
        len: usize,
    },
    #[error("Too many indices. View has rank {rank}, got {given}.")]
    TooManyIndices { rank: usize, given: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Range step on axis {axis} must be non-zero.")]
    ZeroStep { axis: usize },
    #[error("Too many selectors. Expression has rank {rank}, selectors consume {consumed}.")]
    TooManySelectors { rank: usize, consumed: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    #[error("Cannot broadcast {src} onto {dst}.")]
    Incompatible { src: Shape, dst: Shape },
}

/// # Enforcer
///
/// Enforcer enforces bounds and shape invariants on selectors and index tuples.
pub struct Enforcer;

impl Enforcer {
    /// Resolves a possibly negative position against `len`, requiring `[0, len)`.
    pub fn resolve_index(axis: usize, index: isize, len: usize) -> Result<usize, IndexError> {
        let resolved = if index < 0 {
            index + len as isize
        } else {
            index
        };
        if resolved < 0 || resolved >= len as isize {
            return Err(IndexError::OutOfBounds { axis, index, len });
        }
        Ok(resolved as usize)
    }

    /// Resolves a possibly negative range bound against `len`, requiring `[0, len]`.
    pub fn resolve_bound(axis: usize, bound: isize, len: usize) -> Result<isize, IndexError> {
        let resolved = if bound < 0 {
            bound + len as isize
        } else {
            bound
        };
        if resolved < 0 || resolved > len as isize {
            return Err(IndexError::OutOfBounds {
                axis,
                index: bound,
                len,
            });
        }
        Ok(resolved)
    }

    /// Checks a (possibly partial) index tuple against `shape`.
    /// Omitted trailing axes are taken as 0, so they must be non-empty.
    pub fn check_index(index: &[usize], shape: &Shape) -> Result<(), IndexError> {
        if index.len() > shape.rank() {
            return Err(IndexError::TooManyIndices {
                rank: shape.rank(),
                given: index.len(),
            });
        }
        for (axis, &len) in shape.iter().enumerate() {
            let i = index.get(axis).copied().unwrap_or(0);
            if i >= len {
                return Err(IndexError::OutOfBounds {
                    axis,
                    index: i as isize,
                    len,
                });
            }
        }
        Ok(())
    }

    pub fn check_broadcast(src: &Shape, dst: &Shape) -> Result<(), BroadcastError> {
        if !src.broadcasts_to(dst) {
            return Err(BroadcastError::Incompatible {
                src: src.clone(),
                dst: dst.clone(),
            });
        }
        Ok(())
    }
}
