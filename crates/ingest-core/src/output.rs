//! Output-ready field descriptors and the persistence boundary.

use chrono::{DateTime, Utc};

use grid_volume::{ProjectionDescriptor, ProjectionKind};

use crate::error::Result;

/// A fully populated field ready for persistence.
///
/// Owns its payload until handed to an [`OutputSink`], which takes
/// ownership.
#[derive(Debug, Clone)]
pub struct OutputField {
    pub parameter_id: i32,
    pub level_type: i32,
    pub short_name: String,
    pub long_name: String,
    pub units: String,
    pub generate_time: DateTime<Utc>,
    pub forecast_secs: i64,
    pub proj: ProjectionDescriptor,
    /// nx*ny*nz values, level-major. Missing points are NaN.
    pub data: Vec<f32>,
}

/// External persistence writer.
pub trait OutputSink {
    fn write_field(&mut self, field: OutputField) -> Result<()>;
}

/// External projection remap helper.
///
/// Only flat, lat-lon, and Lambert-conformal targets are supported by the
/// known implementations; the builder never asks for anything else.
pub trait GridRemapper {
    fn remap(&self, field: &OutputField, target: ProjectionKind) -> Result<OutputField>;
}
