//! Typed numeric buffers.
//!
//! A [`TypedBuffer`] is a flat, fixed-length run of numbers of one
//! [`ElementKind`]. Its memory is either owned by a single holder
//! ([`Allocation::Local`]) or reference counted behind a lock
//! ([`Allocation::Shared`]), in which case every clone aliases the same
//! memory and can be handed to another thread without copying.

use crate::util::{ElementKind, Error, Result};
use bytemuck::{Pod, Zeroable};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Allocation strategy for new buffers.
///
/// Chosen by the caller; fixed for the lifetime of the buffer and
/// inherited by [`TypedBuffer::similar`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Allocation {
    /// Exclusively owned memory. Clones copy.
    #[default]
    Local,
    /// Memory shareable across threads. Clones alias.
    Shared,
}

impl Allocation {
    /// Returns true for [`Allocation::Shared`].
    #[inline]
    pub const fn is_shared(self) -> bool {
        matches!(self, Self::Shared)
    }
}

/// Backing memory of one buffer.
#[derive(Clone)]
pub enum Storage<T> {
    Local(Box<[T]>),
    Shared(Arc<RwLock<Box<[T]>>>),
}

impl<T: NumericPod> Storage<T> {
    fn new(values: Vec<T>, allocation: Allocation) -> Self {
        match allocation {
            Allocation::Local => Self::Local(values.into_boxed_slice()),
            Allocation::Shared => Self::Shared(Arc::new(RwLock::new(values.into_boxed_slice()))),
        }
    }

    fn allocation(&self) -> Allocation {
        match self {
            Self::Local(_) => Allocation::Local,
            Self::Shared(_) => Allocation::Shared,
        }
    }

    fn read(&self) -> BufferRef<'_, T> {
        match self {
            Self::Local(v) => BufferRef::Local(v),
            Self::Shared(v) => BufferRef::Shared(v.read()),
        }
    }

    fn write(&mut self) -> BufferMut<'_, T> {
        match self {
            Self::Local(v) => BufferMut::Local(v),
            Self::Shared(v) => BufferMut::Shared(v.write()),
        }
    }
}

/// Read access to the values of a buffer. Holds the read lock of shared
/// buffers until dropped.
pub enum BufferRef<'a, T> {
    Local(&'a [T]),
    Shared(RwLockReadGuard<'a, Box<[T]>>),
}

impl<T> Deref for BufferRef<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            Self::Local(v) => v,
            Self::Shared(v) => v,
        }
    }
}

impl<T: Pod> BufferRef<'_, T> {
    /// Raw bytes of the values, in native byte order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&**self)
    }
}

/// Write access to the values of a buffer. Holds the write lock of shared
/// buffers until dropped.
pub enum BufferMut<'a, T> {
    Local(&'a mut [T]),
    Shared(RwLockWriteGuard<'a, Box<[T]>>),
}

impl<T> Deref for BufferMut<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            Self::Local(v) => v,
            Self::Shared(v) => v,
        }
    }
}

impl<T> DerefMut for BufferMut<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match self {
            Self::Local(v) => v,
            Self::Shared(v) => v,
        }
    }
}

/// Numeric element types that can back a [`TypedBuffer`].
pub trait NumericPod: Pod + Zeroable + Copy + Default + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// The corresponding element kind.
    const KIND: ElementKind;

    /// Widen to f64 (exact for every kind except 64-bit integers above 2^53).
    fn to_f64(self) -> f64;

    /// Narrow from f64 with `as` semantics (saturating, NaN to zero for integers).
    fn from_f64(v: f64) -> Self;

    /// Wrap storage of this type into the matching buffer variant.
    fn wrap(storage: Storage<Self>) -> TypedBuffer;

    /// Storage of this type, if the buffer holds it.
    fn storage(buffer: &TypedBuffer) -> Option<&Storage<Self>>;

    /// Mutable storage of this type, if the buffer holds it.
    fn storage_mut(buffer: &mut TypedBuffer) -> Option<&mut Storage<Self>>;
}

macro_rules! numeric_pod {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl NumericPod for $ty {
                const KIND: ElementKind = ElementKind::$variant;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $ty
                }

                fn wrap(storage: Storage<Self>) -> TypedBuffer {
                    TypedBuffer::$variant(storage)
                }

                fn storage(buffer: &TypedBuffer) -> Option<&Storage<Self>> {
                    match buffer {
                        TypedBuffer::$variant(s) => Some(s),
                        _ => None,
                    }
                }

                fn storage_mut(buffer: &mut TypedBuffer) -> Option<&mut Storage<Self>> {
                    match buffer {
                        TypedBuffer::$variant(s) => Some(s),
                        _ => None,
                    }
                }
            }
        )*
    };
}

numeric_pod! {
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    i64 => Int64,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
}

/// Flat numeric buffer: one variant per [`ElementKind`].
#[derive(Clone)]
pub enum TypedBuffer {
    Int8(Storage<i8>),
    Uint8(Storage<u8>),
    Int16(Storage<i16>),
    Uint16(Storage<u16>),
    Int32(Storage<i32>),
    Uint32(Storage<u32>),
    Int64(Storage<i64>),
    Uint64(Storage<u64>),
    Float32(Storage<f32>),
    Float64(Storage<f64>),
}

/// Run `$body` with `$s` bound to the storage of whatever variant `$buf` is.
macro_rules! with_storage {
    ($buf:expr, $s:ident => $body:expr) => {
        match $buf {
            TypedBuffer::Int8($s) => $body,
            TypedBuffer::Uint8($s) => $body,
            TypedBuffer::Int16($s) => $body,
            TypedBuffer::Uint16($s) => $body,
            TypedBuffer::Int32($s) => $body,
            TypedBuffer::Uint32($s) => $body,
            TypedBuffer::Int64($s) => $body,
            TypedBuffer::Uint64($s) => $body,
            TypedBuffer::Float32($s) => $body,
            TypedBuffer::Float64($s) => $body,
        }
    };
}

fn zeroed_of<T: NumericPod>(len: usize, allocation: Allocation) -> TypedBuffer {
    T::wrap(Storage::new(vec![T::zeroed(); len], allocation))
}

impl TypedBuffer {
    /// Take ownership of `values` as a new buffer.
    pub fn from_vec<T: NumericPod>(values: Vec<T>, allocation: Allocation) -> Self {
        T::wrap(Storage::new(values, allocation))
    }

    /// Allocate a zero-filled buffer of `len` elements.
    pub fn zeroed(kind: ElementKind, len: usize, allocation: Allocation) -> Self {
        match kind {
            ElementKind::Int8 => zeroed_of::<i8>(len, allocation),
            ElementKind::Uint8 => zeroed_of::<u8>(len, allocation),
            ElementKind::Int16 => zeroed_of::<i16>(len, allocation),
            ElementKind::Uint16 => zeroed_of::<u16>(len, allocation),
            ElementKind::Int32 => zeroed_of::<i32>(len, allocation),
            ElementKind::Uint32 => zeroed_of::<u32>(len, allocation),
            ElementKind::Int64 => zeroed_of::<i64>(len, allocation),
            ElementKind::Uint64 => zeroed_of::<u64>(len, allocation),
            ElementKind::Float32 => zeroed_of::<f32>(len, allocation),
            ElementKind::Float64 => zeroed_of::<f64>(len, allocation),
        }
    }

    /// Zero-filled buffer of the same kind and allocation, with `len` elements.
    pub fn similar(&self, len: usize) -> Self {
        Self::zeroed(self.kind(), len, self.allocation())
    }

    /// Element kind of this buffer.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Int8(_) => ElementKind::Int8,
            Self::Uint8(_) => ElementKind::Uint8,
            Self::Int16(_) => ElementKind::Int16,
            Self::Uint16(_) => ElementKind::Uint16,
            Self::Int32(_) => ElementKind::Int32,
            Self::Uint32(_) => ElementKind::Uint32,
            Self::Int64(_) => ElementKind::Int64,
            Self::Uint64(_) => ElementKind::Uint64,
            Self::Float32(_) => ElementKind::Float32,
            Self::Float64(_) => ElementKind::Float64,
        }
    }

    /// Allocation strategy this buffer was created with.
    pub fn allocation(&self) -> Allocation {
        with_storage!(self, s => s.allocation())
    }

    /// True if the memory is shareable across threads.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.allocation().is_shared()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_storage!(self, s => s.read().len())
    }

    /// True if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the values in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.kind().num_bytes()
    }

    /// True if both buffers alias the same shared memory.
    pub fn shares_memory_with(&self, other: &TypedBuffer) -> bool {
        fn same<T>(a: &Storage<T>, b: Option<&Storage<T>>) -> bool {
            matches!((a, b), (Storage::Shared(a), Some(Storage::Shared(b))) if Arc::ptr_eq(a, b))
        }
        with_storage!(self, s => same(s, NumericPod::storage(other)))
    }

    /// Typed read access. Fails if `T` is not this buffer's kind.
    pub fn read<T: NumericPod>(&self) -> Result<BufferRef<'_, T>> {
        T::storage(self).map(Storage::read).ok_or(Error::KindMismatch {
            expected: T::KIND,
            actual: self.kind(),
        })
    }

    /// Typed write access. Fails if `T` is not this buffer's kind.
    pub fn write<T: NumericPod>(&mut self) -> Result<BufferMut<'_, T>> {
        let actual = self.kind();
        T::storage_mut(self).map(Storage::write).ok_or(Error::KindMismatch {
            expected: T::KIND,
            actual,
        })
    }

    /// Copy of the values as a typed vector.
    pub fn to_vec<T: NumericPod>(&self) -> Result<Vec<T>> {
        self.read::<T>().map(|v| v.to_vec())
    }

    /// Element `i` widened to f64.
    pub fn get(&self, i: usize) -> Option<f64> {
        with_storage!(self, s => s.read().get(i).map(|v| v.to_f64()))
    }

    /// Store `v` at element `i`, narrowing to this buffer's kind.
    pub fn set(&mut self, i: usize, v: f64) -> Result<()> {
        let len = self.len();
        with_storage!(self, s => match s.write().get_mut(i) {
            Some(slot) => {
                *slot = NumericPod::from_f64(v);
                Ok(())
            }
            None => Err(Error::out_of_range(i, len)),
        })
    }

    /// All values widened to f64.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_storage!(self, s => s.read().iter().map(|v| v.to_f64()).collect())
    }

    /// Read `out.len()` values starting at `start`. The caller bounds-checks.
    pub(crate) fn read_f64_into(&self, start: usize, out: &mut [f64]) {
        let n = out.len();
        with_storage!(self, s => {
            let values = s.read();
            for (dst, src) in out.iter_mut().zip(&values[start..start + n]) {
                *dst = src.to_f64();
            }
        })
    }

    /// Overwrite values starting at `start`. The caller bounds-checks.
    pub(crate) fn write_f64_from(&mut self, start: usize, values: &[f64]) {
        with_storage!(self, s => {
            let mut dst = s.write();
            for (slot, &v) in dst[start..start + values.len()].iter_mut().zip(values) {
                *slot = NumericPod::from_f64(v);
            }
        })
    }
}

impl fmt::Debug for TypedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alloc = if self.is_shared() { "shared" } else { "local" };
        write!(f, "TypedBuffer({}[{}], {})", self.kind(), self.len(), alloc)
    }
}

impl<T: NumericPod> From<Vec<T>> for TypedBuffer {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values, Allocation::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec() {
        let b = TypedBuffer::from_vec(vec![1.0f32, 2.0, 3.0], Allocation::Local);
        assert_eq!(b.kind(), ElementKind::Float32);
        assert_eq!(b.len(), 3);
        assert_eq!(b.byte_len(), 12);
        assert!(!b.is_shared());
        assert_eq!(b.get(1), Some(2.0));
        assert_eq!(b.get(3), None);
    }

    #[test]
    fn test_zeroed_every_kind() {
        for kind in ElementKind::ALL {
            let b = TypedBuffer::zeroed(kind, 4, Allocation::Shared);
            assert_eq!(b.kind(), kind);
            assert_eq!(b.len(), 4);
            assert!(b.is_shared());
            assert_eq!(b.to_f64_vec(), vec![0.0; 4]);
        }
    }

    #[test]
    fn test_typed_access() {
        let mut b = TypedBuffer::from_vec(vec![1u16, 2, 3], Allocation::Local);
        assert_eq!(&*b.read::<u16>().unwrap(), &[1, 2, 3]);
        assert!(matches!(
            b.read::<u32>(),
            Err(Error::KindMismatch { expected: ElementKind::Uint32, actual: ElementKind::Uint16 })
        ));

        b.write::<u16>().unwrap()[0] = 7;
        assert_eq!(b.to_vec::<u16>().unwrap(), vec![7, 2, 3]);
        assert_eq!(b.read::<u16>().unwrap().as_bytes().len(), 6);
    }

    #[test]
    fn test_set_narrows() {
        let mut b = TypedBuffer::zeroed(ElementKind::Uint8, 2, Allocation::Local);
        b.set(0, 300.0).unwrap();
        b.set(1, -5.0).unwrap();
        assert_eq!(b.to_vec::<u8>().unwrap(), vec![255, 0]);
        assert!(matches!(b.set(2, 1.0), Err(Error::IndexOutOfRange { index: 2, count: 2 })));
    }

    #[test]
    fn test_local_clone_copies() {
        let a = TypedBuffer::from_vec(vec![1i32, 2], Allocation::Local);
        let mut b = a.clone();
        b.set(0, 9.0).unwrap();
        assert_eq!(a.get(0), Some(1.0));
        assert!(!a.shares_memory_with(&b));
    }

    #[test]
    fn test_shared_clone_aliases() {
        let a = TypedBuffer::from_vec(vec![1i32, 2], Allocation::Shared);
        let mut b = a.clone();
        b.set(0, 9.0).unwrap();
        assert_eq!(a.get(0), Some(9.0));
        assert!(a.shares_memory_with(&b));

        let c = a.similar(5);
        assert!(c.is_shared());
        assert_eq!(c.kind(), ElementKind::Int32);
        assert_eq!(c.len(), 5);
        assert!(!a.shares_memory_with(&c));
    }

    #[test]
    fn test_shared_across_threads() {
        let a = TypedBuffer::from_vec((0..100u32).collect::<Vec<_>>(), Allocation::Shared);
        let b = a.clone();
        let sum = std::thread::spawn(move || b.read::<u32>().unwrap().iter().sum::<u32>())
            .join()
            .unwrap();
        assert_eq!(sum, 4950);
    }

    #[test]
    fn test_f64_window() {
        let mut b = TypedBuffer::from_vec(vec![1i16, 2, 3, 4, 5], Allocation::Shared);
        let mut out = [0.0; 2];
        b.read_f64_into(2, &mut out);
        assert_eq!(out, [3.0, 4.0]);

        b.write_f64_from(3, &[-7.0, 9.0]);
        assert_eq!(b.to_vec::<i16>().unwrap(), vec![1, 2, 3, -7, 9]);
    }

    #[test]
    fn test_debug() {
        let b = TypedBuffer::from_vec(vec![0.0f64; 6], Allocation::Shared);
        assert_eq!(format!("{:?}", b), "TypedBuffer(float64[6], shared)");
    }
}
