//! Element kinds - the closed set of fixed-width numeric storage types.

use std::fmt;

/// Numeric element kind of a [`TypedBuffer`](crate::core::TypedBuffer).
///
/// Every buffer carries exactly one kind, fixed at allocation. The set is
/// closed: downstream code matches on it instead of probing runtime types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ElementKind {
    /// Signed 8-bit integer
    Int8 = 0,
    /// Unsigned 8-bit integer
    Uint8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 32-bit integer
    Int32 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// Signed 64-bit integer
    Int64 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 8,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 9,
}

impl ElementKind {
    /// Number of element kinds.
    pub const COUNT: usize = 10;

    /// All kinds, in tag order.
    pub const ALL: [ElementKind; Self::COUNT] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Int64,
        Self::Uint64,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the size in bytes of a single element of this kind.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    /// Returns the name of this kind as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse a kind from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Returns true if this is an integer kind.
    #[inline]
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// Returns true if this is a floating point kind.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Returns true if this is a signed kind (floats are signed).
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_sizes() {
        assert_eq!(ElementKind::Int8.num_bytes(), 1);
        assert_eq!(ElementKind::Uint16.num_bytes(), 2);
        assert_eq!(ElementKind::Uint32.num_bytes(), 4);
        assert_eq!(ElementKind::Float32.num_bytes(), 4);
        assert_eq!(ElementKind::Float64.num_bytes(), 8);
        assert_eq!(ElementKind::Uint64.num_bytes(), 8);
    }

    #[test]
    fn test_kind_names() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ElementKind::from_name("float16"), None);
        assert_eq!(format!("{}", ElementKind::Uint16), "uint16");
    }

    #[test]
    fn test_kind_classes() {
        assert!(ElementKind::Float32.is_float());
        assert!(!ElementKind::Float32.is_integer());
        assert!(ElementKind::Uint32.is_integer());
        assert!(!ElementKind::Uint32.is_signed());
        assert!(ElementKind::Int8.is_signed());
    }
}
