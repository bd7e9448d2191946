//! Volume assembly for gridded meteorological fields.
//!
//! Records arrive as an unordered stream of 2-D planes, one vertical level
//! at a time. [`Field`] accumulates the planes for one
//! (parameter, level-type) pair and compacts them into a contiguous 3-D
//! volume with derived vertical metadata. [`regrid`] repairs quasi-regular
//! grids (varying row lengths) into rectangular ones before planes reach
//! the accumulator.

pub mod field;
pub mod projection;
pub mod regrid;

pub use field::Field;
pub use projection::{ProjectionDescriptor, ProjectionKind};
pub use regrid::{linear, qlin, resample_weights, RowWeight};
