//! Buffer width policy for decoded columns.
//!
//! Positions and attributes are stored as 32-bit floats. Indices use the
//! narrowest unsigned width holding the largest index.

use crate::core::{Allocation, Series, TypedBuffer};
use crate::util::{ElementKind, Result};

/// Largest index stored in a 16-bit index buffer.
pub const MAX_U16_INDEX: u32 = u16::MAX as u32;

/// Element kind for an index buffer whose largest value is `max`.
#[inline]
pub fn index_kind(max: u32) -> ElementKind {
    if max <= MAX_U16_INDEX {
        ElementKind::Uint16
    } else {
        ElementKind::Uint32
    }
}

/// Index buffer in the narrowest width for `indices`.
pub fn index_buffer(indices: Vec<u32>, allocation: Allocation) -> TypedBuffer {
    let max = indices.iter().copied().max().unwrap_or(0);
    match index_kind(max) {
        // every value fits, checked by `max` above
        ElementKind::Uint16 => TypedBuffer::from_vec(
            indices.into_iter().map(|i| i as u16).collect::<Vec<u16>>(),
            allocation,
        ),
        _ => TypedBuffer::from_vec(indices, allocation),
    }
}

/// Float buffer for positions and attributes.
#[inline]
pub fn float_buffer(values: Vec<f32>, allocation: Allocation) -> TypedBuffer {
    TypedBuffer::from_vec(values, allocation)
}

/// Float series of `item_size` components.
pub fn float_series(values: Vec<f32>, item_size: usize, allocation: Allocation) -> Result<Series> {
    Series::new(float_buffer(values, allocation), item_size)
}

/// Index series of `item_size` corners per face.
pub fn index_series(indices: Vec<u32>, item_size: usize, allocation: Allocation) -> Result<Series> {
    Series::new(index_buffer(indices, allocation), item_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_kind() {
        assert_eq!(index_kind(0), ElementKind::Uint16);
        assert_eq!(index_kind(65535), ElementKind::Uint16);
        assert_eq!(index_kind(65536), ElementKind::Uint32);
        assert_eq!(index_kind(u32::MAX), ElementKind::Uint32);
    }

    #[test]
    fn test_index_buffer_narrow() {
        let b = index_buffer(vec![0, 1, 65535], Allocation::Local);
        assert_eq!(b.kind(), ElementKind::Uint16);
        assert_eq!(b.to_vec::<u16>().unwrap(), vec![0, 1, 65535]);
    }

    #[test]
    fn test_index_buffer_wide() {
        let b = index_buffer(vec![0, 65536, 2], Allocation::Shared);
        assert_eq!(b.kind(), ElementKind::Uint32);
        assert!(b.is_shared());
        assert_eq!(b.to_vec::<u32>().unwrap(), vec![0, 65536, 2]);
    }

    #[test]
    fn test_float_series() {
        let s = float_series(vec![1.0, 2.0, 3.0, 4.0], 2, Allocation::Local).unwrap();
        assert_eq!(s.kind(), ElementKind::Float32);
        assert_eq!(s.count(), 2);
        assert!(float_series(vec![1.0; 4], 3, Allocation::Local).is_err());
    }
}
