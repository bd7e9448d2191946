//! Record scanning and plane routing.
//!
//! [`RecordScanner`] owns the input stream for one file at a time: it
//! finds record boundaries, reads whole records into a reusable buffer,
//! drives the [`ProjectionAdapter`], filters to the requested parameters,
//! and routes unpacked planes into per-parameter [`Field`] accumulators.
//! Assembly runs once per field after the scan loop finishes.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use grib_records::{DecodeError, SectionDecoder, RECORD_MARKER};
use grid_volume::Field;

use crate::adapter::{
    descriptor_from_grid, record_label, swap_orientation_ns_to_sn, ProjectionAdapter,
};
use crate::config::{IngestConfig, OrientationPolicy};
use crate::error::Result;

/// Leading bytes needed before the record length is known.
const INDICATOR_PREFIX: usize = 8;

/// What one file's scan produced.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Records successfully framed and inventoried or skipped.
    pub records_read: u64,
    /// Records dropped as garbage, irrelevant, or unpackable.
    pub records_skipped: u64,
    /// Assembled fields, one per (parameter, level-type) pair seen.
    pub fields: Vec<Field>,
    /// Reference time from the first decoded record, if any.
    pub reference_time: Option<DateTime<Utc>>,
}

/// Scans record streams and accumulates fields.
pub struct RecordScanner<D: SectionDecoder> {
    adapter: ProjectionAdapter<D>,
    config: IngestConfig,
    /// Reusable record buffer, grown only when a record exceeds capacity.
    record_buf: Vec<u8>,
    /// Monotonic record counter across files, for diagnostics.
    records_seen: u64,
}

impl<D: SectionDecoder> RecordScanner<D> {
    pub fn new(adapter: ProjectionAdapter<D>, config: IngestConfig) -> Self {
        Self {
            adapter,
            config,
            record_buf: Vec::new(),
            records_seen: 0,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Total records framed across all files processed by this scanner.
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    /// Scan one file and assemble every accumulated field.
    pub fn process_file(&mut self, path: &Path) -> Result<ScanOutcome> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let outcome = self.process_reader(&mut reader)?;
        info!(
            path = %path.display(),
            records = outcome.records_read,
            skipped = outcome.records_skipped,
            fields = outcome.fields.len(),
            "scanned file"
        );
        Ok(outcome)
    }

    /// Scan a record stream. Per-file state (field accumulators, the
    /// reference-time cache) lives on the stack of this call; nothing
    /// survives into the next file.
    pub fn process_reader<R: Read>(&mut self, reader: &mut R) -> Result<ScanOutcome> {
        let mut fields: HashMap<(i32, i32), Field> = HashMap::new();
        let mut reference_time: Option<DateTime<Utc>> = None;
        let mut records_read = 0u64;
        let mut records_skipped = 0u64;

        self.adapter.find_first_record(reader)?;

        loop {
            if !seek_marker(reader)? {
                break; // EOF
            }

            let mut head = [0u8; INDICATOR_PREFIX];
            head[..4].copy_from_slice(&RECORD_MARKER);
            if !read_fully(reader, &mut head[4..])? {
                warn!("stream ends inside an indicator section");
                break;
            }

            let total_len = match self.adapter.record_length(&head) {
                Ok(len) if len > INDICATOR_PREFIX => len,
                Ok(len) => {
                    debug!(declared = len, "implausible record length, skipping");
                    self.records_seen += 1;
                    records_skipped += 1;
                    continue;
                }
                Err(DecodeError::Corrupt(msg)) => {
                    error!(error = %msg, "corrupt indicator section, stopping file");
                    return Err(DecodeError::Corrupt(msg).into());
                }
                Err(e) => {
                    debug!(error = %e, "unreadable indicator, skipping");
                    self.records_seen += 1;
                    records_skipped += 1;
                    continue;
                }
            };

            self.record_buf.clear();
            if self.record_buf.capacity() < total_len {
                self.record_buf.reserve(total_len);
            }
            self.record_buf.extend_from_slice(&head);
            self.record_buf.resize(total_len, 0);
            if !read_fully(reader, &mut self.record_buf[INDICATOR_PREFIX..])? {
                warn!(declared = total_len, "stream ends inside a record");
                break;
            }

            self.records_seen += 1;
            records_read += 1;

            let record = match self.adapter.inventory_record(&self.record_buf) {
                Ok(record) => record,
                Err(DecodeError::Corrupt(msg)) => {
                    error!(error = %msg, record = self.records_seen, "fatal decode failure, stopping file");
                    return Err(DecodeError::Corrupt(msg).into());
                }
                Err(e) => {
                    debug!(error = %e, record = self.records_seen, "skipping undecodable record");
                    records_skipped += 1;
                    continue;
                }
            };

            if reference_time.is_none() {
                reference_time = Some(record.product.generate_time);
                debug!(reference_time = %record.product.generate_time, "cached reference time");
            }

            let parameter_id = record.product.parameter_id;
            let level_type = record.product.level_type;
            if !self.config.is_relevant(parameter_id, level_type) {
                records_skipped += 1;
                continue;
            }

            let mut data = match self
                .adapter
                .unpack_record(&self.record_buf, record.grid.point_count())
            {
                Ok(data) => data,
                Err(e) => {
                    warn!(error = %e, record = %record_label(&record.product), "payload unpack failed, skipping record");
                    records_skipped += 1;
                    continue;
                }
            };

            let mut grid = record.grid.clone();
            if let Some((regridded, regular)) = self.adapter.map_quasi_to_regular(&grid, &data) {
                data = regridded;
                grid = regular;
            }

            let mut proj = descriptor_from_grid(&grid);
            let flip = match self.config.orientation {
                OrientationPolicy::Forced => true,
                OrientationPolicy::Auto => self.adapter.grid_orientation(&grid),
            };
            if flip {
                // Row reversal assumes a rectangular payload; a declined
                // quasi-regular repair leaves one that is not.
                if data.len() != proj.plane_points() {
                    warn!(
                        record = %record_label(&record.product),
                        expected = proj.plane_points(),
                        actual = data.len(),
                        "payload is not rectangular, cannot flip rows, skipping record"
                    );
                    records_skipped += 1;
                    continue;
                }
                swap_orientation_ns_to_sn(&mut data, &mut proj);
            }

            let field = fields.entry((parameter_id, level_type)).or_insert_with(|| {
                let names = self.adapter.resolve_parameter(&record.product);
                debug!(
                    param = %names.short_name,
                    level_type = level_type,
                    "first plane for field"
                );
                let mut field = Field::new(parameter_id, level_type, proj);
                field.short_name = names.short_name;
                field.long_name = names.long_name;
                field.units = names.units;
                field.generate_time = record.product.generate_time;
                field.forecast_secs = record.product.forecast_secs;
                field
            });
            field.add_plane(record.product.level_value as f64, &data);
        }

        let mut fields: Vec<Field> = fields.into_values().collect();
        for field in &mut fields {
            field.assemble();
        }
        fields.sort_by_key(|f| (f.parameter_id(), f.level_type()));

        Ok(ScanOutcome {
            records_read,
            records_skipped,
            fields,
            reference_time,
        })
    }

    /// Process a batch of files. Per-file failures are reported and do
    /// not halt the remaining files.
    pub fn run_batch(&mut self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<ScanOutcome>)> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.process_file(path);
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "file failed, continuing batch");
            }
            results.push((path.clone(), result));
        }
        results
    }
}

/// Advance the reader to just past the next record marker.
/// Returns false at end of stream.
fn seek_marker<R: Read>(reader: &mut R) -> Result<bool> {
    let mut window = [0u8; 4];
    let mut filled = 0usize;
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            return Ok(false);
        }
        if filled < 4 {
            window[filled] = byte[0];
            filled += 1;
        } else {
            window.rotate_left(1);
            window[3] = byte[0];
        }
        if filled == 4 && window == RECORD_MARKER {
            return Ok(true);
        }
    }
}

/// Fill `buf` completely. Returns false on a clean EOF before the first
/// byte; mid-buffer EOF is reported the same way with a warning left to
/// the caller.
fn read_fully<R: Read>(reader: &mut R, mut buf: &mut [u8]) -> Result<bool> {
    while !buf.is_empty() {
        let n = reader.read(buf)?;
        if n == 0 {
            return Ok(false);
        }
        buf = &mut buf[n..];
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use chrono::{TimeZone, Utc};
    use grib_records::{
        levels, params, DecodedRecord, GridDescription, GridKind, Indicator, ProductDefinition,
    };

    use crate::config::RequestedField;
    use crate::provider::Provider;

    /// Emits one fixed north-to-south quasi-regular record regardless of
    /// input bytes.
    struct QuasiNorthDecoder;

    impl SectionDecoder for QuasiNorthDecoder {
        fn record_length(&self, _indicator: &[u8]) -> std::result::Result<usize, DecodeError> {
            Ok(16)
        }

        fn inventory(&self, _record: &[u8]) -> std::result::Result<DecodedRecord, DecodeError> {
            Ok(DecodedRecord {
                indicator: Indicator {
                    total_length: 16,
                    edition: 1,
                },
                product: ProductDefinition {
                    parameter_id: params::UGRD,
                    level_type: levels::ISOBARIC,
                    level_value: 500.0,
                    generate_time: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                    forecast_secs: 0,
                    ensemble_id: None,
                    decimal_scale: 0,
                    has_bitmap: false,
                },
                grid: GridDescription {
                    kind: GridKind::LatLon,
                    nx: 4,
                    ny: 2,
                    dx: 1.0,
                    dy: 1.0,
                    first_lat: 10.0,
                    first_lon: 0.0,
                    north_to_south: true,
                    row_lengths: Some(vec![4, 2]),
                    proj_param1: 0.0,
                    proj_param2: 0.0,
                    rotation: 0.0,
                },
            })
        }

        fn unpack(&self, _record: &[u8], grid_points: usize) -> std::result::Result<Vec<f32>, DecodeError> {
            Ok(vec![1.0; grid_points])
        }
    }

    #[test]
    fn test_non_rectangular_payload_skips_record_instead_of_flipping() {
        // The provider does not repair quasi-regular grids, so the payload
        // stays shorter than nx*ny; the pending row flip must skip the
        // record rather than index past the payload.
        let config = IngestConfig {
            requested: vec![RequestedField::new(params::UGRD, levels::ISOBARIC)],
            ..IngestConfig::default()
        };
        let mut scanner = RecordScanner::new(
            ProjectionAdapter::new(QuasiNorthDecoder, Provider::Avn.profile()),
            config,
        );

        let mut bytes = RECORD_MARKER.to_vec();
        bytes.extend_from_slice(&[0u8; 12]);
        let outcome = scanner.process_reader(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(outcome.records_read, 1);
        assert_eq!(outcome.records_skipped, 1);
        assert!(outcome.fields.is_empty());
    }

    #[test]
    fn test_seek_marker_finds_offset_marker() {
        let mut stream = Cursor::new(b"junkGRIBtail".to_vec());
        assert!(seek_marker(&mut stream).unwrap());
        assert_eq!(stream.position(), 8);
    }

    #[test]
    fn test_seek_marker_eof_without_marker() {
        let mut stream = Cursor::new(b"no marker here".to_vec());
        assert!(!seek_marker(&mut stream).unwrap());
    }

    #[test]
    fn test_read_fully_short_stream() {
        let mut stream = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        assert!(!read_fully(&mut stream, &mut buf).unwrap());
    }
}
