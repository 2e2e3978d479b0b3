//! Geometry builder for decoded tables.
//!
//! Consumes the `positions` and `indices` columns of a [`Table`](crate::core::Table)
//! and derives what a renderer needs: vertex normals, bounds, and optional
//! recentering of a whole set of surfaces.

mod surface;

pub use surface::{build_geometries, GeometryOptions, SurfaceGeometry};
