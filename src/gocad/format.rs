//! Object format description and decoder options.

use crate::core::Allocation;

/// Keywords and metadata of one GOCAD object type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectFormat {
    /// Face keyword, e.g. `TRGL`. Empty disables face parsing.
    pub keyword: &'static str,
    /// Token splitting one object into independent parts, e.g. `TFACE`.
    pub separator: &'static str,
    /// Vertex ids per face, also the item size of the indices column.
    pub face_arity: usize,
    /// Class name recorded in table user data.
    pub class_name: &'static str,
    /// Source extension recorded in table user data.
    pub extension: &'static str,
}

impl ObjectFormat {
    /// Triangulated surface (`.ts`).
    pub const TSURF: Self = Self {
        keyword: "TRGL",
        separator: "TFACE",
        face_arity: 3,
        class_name: "Surface",
        extension: "ts",
    };

    /// True if faces are parsed for this format.
    #[inline]
    pub fn has_faces(&self) -> bool {
        !self.keyword.is_empty()
    }
}

impl Default for ObjectFormat {
    fn default() -> Self {
        Self::TSURF
    }
}

/// Options controlling how decoded buffers are allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Allocation strategy for every buffer of every decoded table.
    pub allocation: Allocation,
}

impl DecoderOptions {
    /// Options allocating exclusively owned buffers.
    pub const fn local() -> Self {
        Self {
            allocation: Allocation::Local,
        }
    }

    /// Options allocating thread-shareable buffers.
    pub const fn shared() -> Self {
        Self {
            allocation: Allocation::Shared,
        }
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self::shared()
    }
}
