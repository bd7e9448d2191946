//! Grid geometry descriptor shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Discrete projection tag used by the output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionKind {
    /// Keep whatever projection the input grid carries.
    #[default]
    Native,
    Flat,
    LatLon,
    LambertConf,
    PolarStereo,
    ObliqueStereo,
}

/// Grid shape, spacing, and origin for one field.
///
/// Copied by value into each [`Field`](crate::field::Field) when its first
/// plane arrives. The vertical components (`nz`, `dz`, `minz`,
/// `dz_constant`) are unknown until every level has been seen and are
/// filled in by `Field::assemble`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDescriptor {
    pub kind: ProjectionKind,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub minx: f64,
    pub miny: f64,
    pub minz: f64,
    /// Grid rotation, degrees.
    pub rotation: f64,
    /// First free projection parameter (Lambert lat1, stereo tangent lon).
    pub param1: f64,
    /// Second free projection parameter (Lambert lat2).
    pub param2: f64,
    /// True while all observed adjacent level spacings agree.
    pub dz_constant: bool,
}

impl ProjectionDescriptor {
    /// Points in one horizontal plane.
    pub fn plane_points(&self) -> usize {
        self.nx * self.ny
    }

    /// Points in the full assembled volume.
    pub fn volume_points(&self) -> usize {
        self.nx * self.ny * self.nz
    }
}

impl Default for ProjectionDescriptor {
    fn default() -> Self {
        Self {
            kind: ProjectionKind::LatLon,
            nx: 0,
            ny: 0,
            nz: 1,
            dx: 1.0,
            dy: 1.0,
            dz: 1.0,
            minx: 0.0,
            miny: 0.0,
            minz: 0.0,
            rotation: 0.0,
            param1: 0.0,
            param2: 0.0,
            dz_constant: true,
        }
    }
}
