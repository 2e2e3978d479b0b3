//! GOCAD ASCII object decoding.
//!
//! Decodes the text form of GOCAD objects into [`Table`]s. Each table
//! holds a `positions` column (3 x f32 per vertex), an optional `indices`
//! column (one item per face, u16 or u32 depending on the largest index),
//! and one f32 column per declared vertex property.
//!
//! ## Example
//!
//! ```
//! let text = "GOCAD TSurf 1\nname: s1\nVRTX 1 0 0 0\nVRTX 2 1 0 0\nVRTX 3 0 1 0\nTRGL 1 2 3\nEND";
//! let tables = gocad::gocad::decode_tsurf(text).unwrap();
//! assert_eq!(tables.len(), 1);
//! assert_eq!(tables[0].name(), Some("s1"));
//! assert_eq!(tables[0].indices().unwrap().to_f64_vec(), vec![0.0, 1.0, 2.0]);
//! ```

mod decoder;
mod format;
mod layout;
pub mod policy;

pub use decoder::{decode_objects, DEFAULT_NAME};
pub use format::{DecoderOptions, ObjectFormat};

use crate::core::Table;
use crate::util::Result;

/// Decode a triangulated surface (`.ts`) with default options
/// (shared buffers).
pub fn decode_tsurf(text: &str) -> Result<Vec<Table>> {
    decode_tsurf_with(text, &DecoderOptions::default())
}

/// Decode a triangulated surface (`.ts`) with explicit options.
pub fn decode_tsurf_with(text: &str, options: &DecoderOptions) -> Result<Vec<Table>> {
    decode_objects(text, &ObjectFormat::TSURF, options)
}
