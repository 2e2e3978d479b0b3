//! Core layer - the columnar data model.
//!
//! This module provides:
//! - [`TypedBuffer`] - Flat numeric buffer over a closed set of element kinds
//! - [`Allocation`] - Local or thread-shareable memory, chosen by the caller
//! - [`Series`] - Fixed item-size view over a buffer
//! - [`Table`] - Ordered named columns of series
//! - [`UserData`] - Free-form key-value metadata
//!
//! None of these types know anything about file formats.

mod buffer;
mod series;
mod table;
mod metadata;

pub use buffer::{Allocation, BufferMut, BufferRef, NumericPod, Storage, TypedBuffer};
pub use series::{Item, Series, SeriesBuilder, DEFAULT_DIMENSION};
pub use table::{Table, INDICES, POSITIONS};
pub use metadata::UserData;
