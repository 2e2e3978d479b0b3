//! Utility types and functions for GOCAD.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ElementKind`] - Enum of fixed-width numeric storage kinds
//! - [`Error`] / [`Result`] - Error handling
//! - Math helpers on top of glam

mod kind;
mod error;
mod math;

pub use kind::*;
pub use error::*;
pub use math::*;
