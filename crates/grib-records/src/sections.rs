//! Decoded GRIB record sections.
//!
//! One record carries an indicator section (length, edition), a product
//! definition section (what parameter, which level, when), and a grid
//! description section (how the points are laid out). The bitmap and data
//! sections are never materialized here; they are consumed inside
//! [`SectionDecoder::unpack`](crate::decoder::SectionDecoder::unpack) and
//! surface only as an unpacked value plane.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker bytes opening every record.
pub const RECORD_MARKER: [u8; 4] = *b"GRIB";

/// Indicator section: total record length and format edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    /// Total length of the record in bytes, marker included.
    pub total_length: usize,
    pub edition: u8,
}

/// Product definition section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDefinition {
    /// Numeric parameter code (table-2 numbering).
    pub parameter_id: i32,
    /// Vertical coordinate system code (see [`crate::tables`]).
    pub level_type: i32,
    /// Level value in the units implied by `level_type`.
    pub level_value: f32,
    /// Model generation (reference) time.
    pub generate_time: DateTime<Utc>,
    /// Forecast offset from `generate_time`, seconds.
    pub forecast_secs: i64,
    /// Ensemble member code when the record is flagged as ensemble data.
    pub ensemble_id: Option<i32>,
    /// Decimal scale factor applied during payload unpack.
    pub decimal_scale: i16,
    pub has_bitmap: bool,
}

/// Projection family reported by the grid description section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridKind {
    LatLon,
    PolarStereo,
    LambertConf,
}

/// Grid description section.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescription {
    pub kind: GridKind,
    /// Points per row. For quasi-regular grids this is the widest row.
    pub nx: usize,
    /// Number of rows.
    pub ny: usize,
    /// Column spacing (degrees or km, per `kind`).
    pub dx: f64,
    /// Row spacing.
    pub dy: f64,
    /// Latitude of the first grid point.
    pub first_lat: f64,
    /// Longitude of the first grid point.
    pub first_lon: f64,
    /// True when rows run from north to south.
    pub north_to_south: bool,
    /// Per-row point counts for quasi-regular grids; `None` for regular.
    pub row_lengths: Option<Vec<usize>>,
    /// First projection-specific parameter (Lambert lat1, stereo tangent lon).
    pub proj_param1: f64,
    /// Second projection-specific parameter (Lambert lat2).
    pub proj_param2: f64,
    /// Grid rotation, degrees.
    pub rotation: f64,
}

impl GridDescription {
    /// Total number of data points, honoring quasi-regular row lengths.
    pub fn point_count(&self) -> usize {
        match &self.row_lengths {
            Some(rows) => rows.iter().sum(),
            None => self.nx * self.ny,
        }
    }

    /// True when the grid carries varying row lengths.
    pub fn is_quasi_regular(&self) -> bool {
        self.row_lengths.is_some()
    }
}

/// Everything known about one record after the cheap inventory pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub indicator: Indicator,
    pub product: ProductDefinition,
    pub grid: GridDescription,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latlon_grid(nx: usize, ny: usize) -> GridDescription {
        GridDescription {
            kind: GridKind::LatLon,
            nx,
            ny,
            dx: 1.0,
            dy: 1.0,
            first_lat: 0.0,
            first_lon: 0.0,
            north_to_south: false,
            row_lengths: None,
            proj_param1: 0.0,
            proj_param2: 0.0,
            rotation: 0.0,
        }
    }

    #[test]
    fn test_point_count_regular() {
        let grid = latlon_grid(4, 3);
        assert_eq!(grid.point_count(), 12);
        assert!(!grid.is_quasi_regular());
    }

    #[test]
    fn test_point_count_quasi_regular() {
        let mut grid = latlon_grid(4, 3);
        grid.row_lengths = Some(vec![4, 3, 2]);
        assert_eq!(grid.point_count(), 9);
        assert!(grid.is_quasi_regular());
    }
}
