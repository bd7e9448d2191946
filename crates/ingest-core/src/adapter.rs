//! Provider-aware record decoding.
//!
//! [`ProjectionAdapter`] wraps the external [`SectionDecoder`] and layers
//! on the behavior that varies per provider: parameter name and unit
//! resolution (standard table, local-use override table, ensemble map),
//! header skipping before the first record, grid orientation flipping,
//! and quasi-regular grid repair.

use std::io::{self, Read};

use tracing::{debug, warn};

use grib_records::{
    level_description, lookup_override, standard_parameter, DecodeError, DecodedRecord,
    GridDescription, GridKind, ProductDefinition, SectionDecoder, STANDARD_MAX,
};
use grid_volume::{qlin, ProjectionDescriptor, ProjectionKind};

use crate::provider::ProviderProfile;

/// Resolved display names and units for one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNames {
    pub short_name: String,
    pub long_name: String,
    pub units: String,
}

/// Wraps the wire decoder with provider-specific policy.
pub struct ProjectionAdapter<D: SectionDecoder> {
    decoder: D,
    profile: ProviderProfile,
}

impl<D: SectionDecoder> ProjectionAdapter<D> {
    pub fn new(decoder: D, profile: ProviderProfile) -> Self {
        Self { decoder, profile }
    }

    pub fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    /// Total record length from the leading indicator bytes.
    pub fn record_length(&self, indicator: &[u8]) -> Result<usize, DecodeError> {
        self.decoder.record_length(indicator)
    }

    /// Cheap pass over indicator + product definition + grid description,
    /// used to test relevance before the full unpack.
    pub fn inventory_record(&self, record: &[u8]) -> Result<DecodedRecord, DecodeError> {
        self.decoder.inventory(record)
    }

    /// Full decode including bitmap and payload.
    pub fn unpack_record(
        &self,
        record: &[u8],
        grid_points: usize,
    ) -> Result<Vec<f32>, DecodeError> {
        self.decoder.unpack(record, grid_points)
    }

    /// Consume any provider header preceding the first record marker.
    /// A no-op for providers without one.
    pub fn find_first_record<R: Read>(&self, reader: &mut R) -> io::Result<()> {
        let skip = self.profile.header_skip;
        if skip > 0 {
            io::copy(&mut reader.take(skip as u64), &mut io::sink())?;
            debug!(provider = ?self.profile.provider, bytes = skip, "skipped provider header");
        }
        Ok(())
    }

    /// Resolve display names for a record's parameter.
    ///
    /// Ensemble-flagged records resolve through the runtime ensemble map
    /// first; otherwise codes in the standard range use the standard
    /// table and codes above it the provider override table.
    pub fn resolve_parameter(&self, product: &ProductDefinition) -> ParameterNames {
        if let Some(code) = product.ensemble_id {
            if let Some(map) = &self.profile.ensemble_map {
                if let Some(name) = map.get(&code) {
                    let units = standard_parameter(product.parameter_id)
                        .map(|p| p.units)
                        .unwrap_or("");
                    return ParameterNames {
                        short_name: name.clone(),
                        long_name: name.clone(),
                        units: units.to_string(),
                    };
                }
            }
        }

        let hit = if product.parameter_id <= STANDARD_MAX {
            standard_parameter(product.parameter_id)
        } else {
            lookup_override(self.profile.overrides, product.parameter_id)
        };

        match hit {
            Some(info) => ParameterNames {
                short_name: info.short_name.to_string(),
                long_name: info.long_name.to_string(),
                units: info.units.to_string(),
            },
            None => ParameterNames {
                short_name: format!("P{}", product.parameter_id),
                long_name: format!("unknown parameter {}", product.parameter_id),
                units: String::new(),
            },
        }
    }

    /// Whether the grid's rows run north to south.
    pub fn grid_orientation(&self, grid: &GridDescription) -> bool {
        grid.north_to_south
    }

    /// Repair a quasi-regular grid into a rectangular one.
    ///
    /// No-op unless the profile enables regridding and the grid carries
    /// per-row point counts. The regridded width is the widest input row;
    /// the returned description has its row-length list cleared.
    pub fn map_quasi_to_regular(
        &self,
        grid: &GridDescription,
        data: &[f32],
    ) -> Option<(Vec<f32>, GridDescription)> {
        if !self.profile.quasi_regrid {
            return None;
        }
        let rows = grid.row_lengths.as_ref()?;
        let nrows = rows.len();
        let out_width = rows.iter().copied().max().unwrap_or(0);
        if nrows == 0 || out_width == 0 {
            return None;
        }
        // An empty row has no values to interpolate from.
        if rows.iter().any(|&len| len == 0) {
            warn!(rows = nrows, "quasi-regular grid declares an empty row, leaving grid untouched");
            return None;
        }

        let mut row_index = Vec::with_capacity(nrows + 1);
        let mut offset = 0usize;
        row_index.push(0);
        for len in rows {
            offset += len;
            row_index.push(offset);
        }

        let mut out = vec![0.0f32; out_width * nrows];
        qlin(nrows, &row_index, data, out_width, nrows, &mut out);

        debug!(
            rows = nrows,
            out_width = out_width,
            in_points = data.len(),
            "regridded quasi-regular grid"
        );

        let mut regular = grid.clone();
        regular.nx = out_width;
        regular.row_lengths = None;
        Some((out, regular))
    }
}

/// Build the working projection descriptor for one record's grid.
pub fn descriptor_from_grid(grid: &GridDescription) -> ProjectionDescriptor {
    let kind = match grid.kind {
        GridKind::LatLon => ProjectionKind::LatLon,
        GridKind::PolarStereo => ProjectionKind::PolarStereo,
        GridKind::LambertConf => ProjectionKind::LambertConf,
    };
    ProjectionDescriptor {
        kind,
        nx: grid.nx,
        ny: grid.ny,
        nz: 1,
        dx: grid.dx,
        dy: grid.dy,
        dz: 1.0,
        minx: grid.first_lon,
        miny: grid.first_lat,
        minz: 0.0,
        rotation: grid.rotation,
        param1: grid.proj_param1,
        param2: grid.proj_param2,
        dz_constant: true,
    }
}

/// Reverse row order in place, turning a north-to-south grid into
/// south-to-north, and rewrite the origin latitude.
///
/// A flipped origin computing to exactly +90 is the south pole row; the
/// upstream projection copy reports it with the wrong sign, so it is
/// rewritten to -90 here rather than corrected at the source.
pub fn swap_orientation_ns_to_sn(data: &mut [f32], proj: &mut ProjectionDescriptor) {
    let nx = proj.nx;
    let ny = proj.ny;
    debug_assert_eq!(data.len(), nx * ny);

    let tmp = data.to_vec();
    for row in 0..ny {
        let dst = ny - 1 - row;
        data[dst * nx..(dst + 1) * nx].copy_from_slice(&tmp[row * nx..(row + 1) * nx]);
    }

    // The origin was the northernmost row; after the flip it is the
    // southern edge.
    let mut miny = proj.miny - (ny as f64 - 1.0) * proj.dy;
    if miny == 90.0 {
        miny = -90.0;
    }
    proj.miny = miny;
}

/// Diagnostic label for one record.
pub fn record_label(product: &ProductDefinition) -> String {
    format!(
        "parameter {} at {}",
        product.parameter_id,
        level_description(product.level_type, product.level_value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use chrono::{TimeZone, Utc};
    use grib_records::EnsembleMap;

    /// Decoder stub; adapter tests never touch the wire.
    struct NullDecoder;

    impl SectionDecoder for NullDecoder {
        fn record_length(&self, _indicator: &[u8]) -> Result<usize, DecodeError> {
            Err(DecodeError::Garbage("null decoder".into()))
        }
        fn inventory(&self, _record: &[u8]) -> Result<DecodedRecord, DecodeError> {
            Err(DecodeError::Garbage("null decoder".into()))
        }
        fn unpack(&self, _record: &[u8], _grid_points: usize) -> Result<Vec<f32>, DecodeError> {
            Err(DecodeError::Garbage("null decoder".into()))
        }
    }

    fn product(parameter_id: i32) -> ProductDefinition {
        ProductDefinition {
            parameter_id,
            level_type: 100,
            level_value: 500.0,
            generate_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            forecast_secs: 3600,
            ensemble_id: None,
            decimal_scale: 0,
            has_bitmap: false,
        }
    }

    fn adapter(provider: Provider) -> ProjectionAdapter<NullDecoder> {
        ProjectionAdapter::new(NullDecoder, provider.profile())
    }

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
    fn test_resolve_standard_parameter() {
        let names = adapter(Provider::Avn).resolve_parameter(&product(33));
        assert_eq!(names.short_name, "UGRD");
        assert_eq!(names.units, "m/s");
    }

    #[test]
    fn test_resolve_override_parameter() {
        let names = adapter(Provider::Ruc).resolve_parameter(&product(170));
        assert_eq!(names.short_name, "RWMR");
    }

    #[test]
    fn test_resolve_unknown_parameter_synthesized() {
        let names = adapter(Provider::Dtra).resolve_parameter(&product(240));
        assert_eq!(names.short_name, "P240");
    }

    #[test]
    fn test_resolve_ensemble_bypasses_tables() {
        let mut map = EnsembleMap::new();
        map.insert(3, "ENS_MEM03".to_string());
        let profile = Provider::Avn.profile().with_ensemble_map(map);
        let adapter = ProjectionAdapter::new(NullDecoder, profile);

        let mut prod = product(33);
        prod.ensemble_id = Some(3);
        let names = adapter.resolve_parameter(&prod);
        assert_eq!(names.short_name, "ENS_MEM03");
        // Units still come from the standard entry for the code.
        assert_eq!(names.units, "m/s");

        // Unknown ensemble code falls back to the standard path.
        prod.ensemble_id = Some(99);
        let names = adapter.resolve_parameter(&prod);
        assert_eq!(names.short_name, "UGRD");
    }

    #[test]
    fn test_find_first_record_skips_header() {
        let adapter = adapter(Provider::Afwa);
        let payload: Vec<u8> = (0..100u8).collect();
        let mut reader = std::io::Cursor::new(payload);
        adapter.find_first_record(&mut reader).unwrap();
        assert_eq!(reader.position(), 80);
    }

    #[test]
    fn test_find_first_record_default_noop() {
        let adapter = adapter(Provider::Avn);
        let mut reader = std::io::Cursor::new(vec![0u8; 16]);
        adapter.find_first_record(&mut reader).unwrap();
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_quasi_regrid_disabled_provider_noop() {
        let mut grid = latlon_grid(4, 2);
        grid.row_lengths = Some(vec![4, 2]);
        let data = [1.0f32; 6];
        assert!(adapter(Provider::Avn)
            .map_quasi_to_regular(&grid, &data)
            .is_none());
    }

    #[test]
    fn test_quasi_regrid_repairs_rows() {
        let mut grid = latlon_grid(4, 2);
        grid.row_lengths = Some(vec![4, 2]);
        // Constant rows must survive interpolation untouched.
        let data = [3.0, 3.0, 3.0, 3.0, 8.0, 8.0];
        let (out, regular) = adapter(Provider::Wafs)
            .map_quasi_to_regular(&grid, &data)
            .unwrap();
        assert_eq!(regular.nx, 4);
        assert!(regular.row_lengths.is_none());
        assert_eq!(&out[0..4], &[3.0; 4]);
        assert_eq!(&out[4..8], &[8.0; 4]);
    }

    #[test]
    fn test_quasi_regrid_rejects_empty_row() {
        let mut grid = latlon_grid(4, 3);
        grid.row_lengths = Some(vec![4, 0, 2]);
        let data = [1.0f32; 6];
        assert!(adapter(Provider::Wafs)
            .map_quasi_to_regular(&grid, &data)
            .is_none());
    }

    #[test]
    fn test_quasi_regrid_regular_grid_noop() {
        let grid = latlon_grid(4, 2);
        let data = [1.0f32; 8];
        assert!(adapter(Provider::Wafs)
            .map_quasi_to_regular(&grid, &data)
            .is_none());
    }

    #[test]
    fn test_orientation_flip_reverses_rows() {
        let mut proj = descriptor_from_grid(&latlon_grid(2, 3));
        proj.miny = 60.0;
        proj.dy = 30.0;
        let mut data = vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        swap_orientation_ns_to_sn(&mut data, &mut proj);
        assert_eq!(data, vec![3.0, 3.0, 2.0, 2.0, 1.0, 1.0]);
        assert_eq!(proj.miny, 0.0);
    }

    #[test]
    fn test_orientation_flip_involutive_on_rows() {
        let mut proj = descriptor_from_grid(&latlon_grid(2, 2));
        let original = vec![1.0, 2.0, 3.0, 4.0];
        let mut data = original.clone();
        swap_orientation_ns_to_sn(&mut data, &mut proj);
        swap_orientation_ns_to_sn(&mut data, &mut proj);
        assert_eq!(data, original);
    }

    #[test]
    fn test_orientation_flip_pole_quirk() {
        // A flip whose origin computes to exactly +90 must land on -90.
        let mut proj = descriptor_from_grid(&latlon_grid(2, 1));
        proj.miny = 90.0;
        let mut data = vec![1.0, 2.0];
        swap_orientation_ns_to_sn(&mut data, &mut proj);
        assert_eq!(proj.miny, -90.0);
        assert_eq!(data, vec![1.0, 2.0]);
    }

    #[test]
    fn test_descriptor_from_grid() {
        let mut grid = latlon_grid(10, 5);
        grid.first_lat = -30.0;
        grid.first_lon = 120.0;
        let proj = descriptor_from_grid(&grid);
        assert_eq!(proj.kind, ProjectionKind::LatLon);
        assert_eq!((proj.nx, proj.ny, proj.nz), (10, 5, 1));
        assert_eq!(proj.miny, -30.0);
        assert_eq!(proj.minx, 120.0);
    }

    #[test]
    fn test_record_label() {
        let label = record_label(&product(33));
        assert_eq!(label, "parameter 33 at 500 mb");
    }
}
