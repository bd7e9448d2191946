//! Configuration surface consumed by the scanner and builder.
//!
//! Loading (CLI, files, environment) happens outside this crate; the core
//! only sees the structs below.

use serde::{Deserialize, Serialize};

use grib_records::params;
use grid_volume::{ProjectionDescriptor, ProjectionKind};

/// The enumerated unit conversions, applied at most once per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitConversion {
    #[default]
    None,
    /// m/s → knots
    MpsToKnots,
    /// m → km
    MetersToKm,
    /// m → hundreds of feet
    MetersToHundredsFt,
    /// Pa → mbar
    PascalsToMbar,
    /// K → °C
    KelvinToCelsius,
    /// kg/kg → g/kg
    KgPerKgToGPerKg,
    /// % → fraction
    PercentToFraction,
}

impl UnitConversion {
    /// Apply the conversion to one value. NaN passes through.
    pub fn apply(self, value: f32) -> f32 {
        match self {
            UnitConversion::None => value,
            UnitConversion::MpsToKnots => value * 1.94,
            UnitConversion::MetersToKm => value * 0.001,
            UnitConversion::MetersToHundredsFt => value * 0.0328,
            UnitConversion::PascalsToMbar => value * 0.01,
            UnitConversion::KelvinToCelsius => value - 273.15,
            UnitConversion::KgPerKgToGPerKg => value * 1000.0,
            UnitConversion::PercentToFraction => value * 0.01,
        }
    }

    /// Unit string after conversion; `None` leaves the source units.
    pub fn target_units(self) -> Option<&'static str> {
        match self {
            UnitConversion::None => None,
            UnitConversion::MpsToKnots => Some("knots"),
            UnitConversion::MetersToKm => Some("km"),
            UnitConversion::MetersToHundredsFt => Some("100ft"),
            UnitConversion::PascalsToMbar => Some("mb"),
            UnitConversion::KelvinToCelsius => Some("C"),
            UnitConversion::KgPerKgToGPerKg => Some("g/kg"),
            UnitConversion::PercentToFraction => Some("fraction"),
        }
    }
}

/// Row-order handling for grids stored north to south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrientationPolicy {
    /// Flip only when the grid description reports north-to-south rows.
    #[default]
    Auto,
    /// Always flip.
    Forced,
}

/// One requested output field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestedField {
    pub parameter_id: i32,
    pub level_type: i32,
    #[serde(default)]
    pub conversion: UnitConversion,
}

impl RequestedField {
    pub fn new(parameter_id: i32, level_type: i32) -> Self {
        Self {
            parameter_id,
            level_type,
            conversion: UnitConversion::None,
        }
    }

    pub fn with_conversion(mut self, conversion: UnitConversion) -> Self {
        self.conversion = conversion;
        self
    }
}

/// Explicit output geometry overriding the geometry decoded from records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverrideGeometry {
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
    pub rotation: f64,
    pub param1: f64,
    pub param2: f64,
}

impl OverrideGeometry {
    pub fn to_descriptor(self) -> ProjectionDescriptor {
        ProjectionDescriptor {
            kind: self.kind,
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            dx: self.dx,
            dy: self.dy,
            dz: self.dz,
            minx: self.minx,
            miny: self.miny,
            minz: self.minz,
            rotation: self.rotation,
            param1: self.param1,
            param2: self.param2,
            dz_constant: true,
        }
    }
}

/// Everything the pipeline needs to know from the outside.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Requested output fields.
    pub requested: Vec<RequestedField>,
    /// Keep every assembled field instead of pruning to the requested set.
    #[serde(default)]
    pub output_all_fields: bool,
    /// Replace decoded geometry with explicit values.
    #[serde(default)]
    pub override_geometry: Option<OverrideGeometry>,
    /// Output projection; anything other than `Native` triggers a remap.
    #[serde(default = "default_output_projection")]
    pub output_projection: ProjectionKind,
    #[serde(default)]
    pub orientation: OrientationPolicy,
}

fn default_output_projection() -> ProjectionKind {
    ProjectionKind::Native
}

impl IngestConfig {
    /// True when the pair is explicitly requested.
    pub fn is_requested(&self, parameter_id: i32, level_type: i32) -> bool {
        self.requested
            .iter()
            .any(|r| r.parameter_id == parameter_id && r.level_type == level_type)
    }

    /// True when the pair should be decoded: requested outright, or a wind
    /// component needed to derive a requested WIND/WDIR at the same level
    /// type.
    pub fn is_relevant(&self, parameter_id: i32, level_type: i32) -> bool {
        if self.is_requested(parameter_id, level_type) {
            return true;
        }
        if parameter_id == params::UGRD || parameter_id == params::VGRD {
            return self.is_requested(params::WIND, level_type)
                || self.is_requested(params::WDIR, level_type);
        }
        false
    }

    /// The configured conversion for a requested pair, `None` otherwise.
    pub fn conversion_for(&self, parameter_id: i32, level_type: i32) -> UnitConversion {
        self.requested
            .iter()
            .find(|r| r.parameter_id == parameter_id && r.level_type == level_type)
            .map(|r| r.conversion)
            .unwrap_or(UnitConversion::None)
    }
}
