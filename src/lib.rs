//! # GOCAD
//!
//! Decoder for GOCAD ASCII surfaces (`.ts`) into columnar tables of typed
//! numeric buffers.
//!
//! A decoded [`Table`] holds a `positions` column, an optional `indices`
//! column and one column per declared vertex property. Buffers can be
//! allocated on thread-shareable memory so a decoded table can be handed
//! to another thread without copying.
//!
//! ## Modules
//!
//! - [`util`] - Element kinds, errors, bounds
//! - [`core`] - Typed buffers, series, tables, user data
//! - [`gocad`] - The GOCAD text decoder
//! - [`geom`] - Geometry builder (normals, bounds, recentering)
//!
//! ## Example
//!
//! ```
//! use gocad::prelude::*;
//!
//! let text = "GOCAD TSurf 1\nPROPERTIES a\nVRTX 0 0 0 0 7\nVRTX 1 1 0 0 8\nVRTX 2 0 1 0 9\nTRGL 0 1 2\n";
//! let tables = decode_tsurf_with(text, &DecoderOptions::local())?;
//! let surface = &tables[0];
//! assert_eq!(surface.vertex_count(), 3);
//! assert_eq!(surface.column("a").unwrap().to_f64_vec(), vec![7.0, 8.0, 9.0]);
//! # Ok::<(), gocad::Error>(())
//! ```

pub mod util;
pub mod core;
pub mod gocad;
pub mod geom;

// Re-export commonly used types
pub use crate::util::{ElementKind, Error, Result};
pub use crate::core::{Allocation, Series, Table, TypedBuffer};
pub use crate::gocad::{decode_tsurf, decode_tsurf_with, DecoderOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{ElementKind, Error, Result};
    pub use crate::core::{Allocation, Item, Series, Table, TypedBuffer, UserData, INDICES, POSITIONS};
    pub use crate::gocad::{decode_objects, decode_tsurf, decode_tsurf_with, DecoderOptions, ObjectFormat};
    pub use crate::geom::{build_geometries, GeometryOptions, SurfaceGeometry};
}
