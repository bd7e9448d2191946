//! Per-parameter level accumulation and volume assembly.

use std::collections::BTreeMap;
use std::mem;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use grib_records::is_isobaric;

use crate::projection::ProjectionDescriptor;

/// Ordered level key.
///
/// Isobaric level types order by negated value: pressure decreases with
/// altitude, so the largest pressure is the lowest level.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LevelKey(f64);

impl Eq for LevelKey {}

impl PartialOrd for LevelKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LevelKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One accumulated 2-D plane awaiting assembly.
#[derive(Debug, Clone)]
struct Plane {
    level: f64,
    data: Vec<f32>,
}

/// Accumulator for one (parameter, level-type) pair.
///
/// Collects planes as records arrive in arbitrary level order, then
/// compacts them into one contiguous volume. Lives for one input file;
/// the scanner drops all fields between files.
#[derive(Debug)]
pub struct Field {
    parameter_id: i32,
    level_type: i32,
    /// Isobaric ordering runs inverted (descending pressure).
    inverted: bool,
    planes: BTreeMap<LevelKey, Plane>,
    /// Level values in assembled order; empty until `assemble`.
    levels: Vec<f64>,
    /// Compacted nx*ny*nz volume; reused across assemblies when capacity
    /// suffices.
    volume: Vec<f32>,
    proj: ProjectionDescriptor,

    pub short_name: String,
    pub long_name: String,
    pub units: String,
    pub generate_time: DateTime<Utc>,
    pub forecast_secs: i64,
}

impl Field {
    /// Create an empty accumulator. The projection descriptor is copied by
    /// value; its vertical components are rewritten by [`assemble`](Self::assemble).
    pub fn new(parameter_id: i32, level_type: i32, proj: ProjectionDescriptor) -> Self {
        Self {
            parameter_id,
            level_type,
            inverted: is_isobaric(level_type),
            planes: BTreeMap::new(),
            levels: Vec::new(),
            volume: Vec::new(),
            proj,
            short_name: String::new(),
            long_name: String::new(),
            units: String::new(),
            generate_time: DateTime::<Utc>::UNIX_EPOCH,
            forecast_secs: 0,
        }
    }

    pub fn parameter_id(&self) -> i32 {
        self.parameter_id
    }

    pub fn level_type(&self) -> i32 {
        self.level_type
    }

    pub fn proj(&self) -> &ProjectionDescriptor {
        &self.proj
    }

    /// Levels in assembled order (isobaric: descending pressure).
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Number of distinct accumulated levels.
    pub fn level_count(&self) -> usize {
        if self.planes.is_empty() {
            self.levels.len()
        } else {
            self.planes.len()
        }
    }

    fn key(&self, level: f64) -> LevelKey {
        if self.inverted {
            LevelKey(-level)
        } else {
            LevelKey(level)
        }
    }

    /// Accumulate one plane. A level already present is dropped with a
    /// diagnostic; the stored plane is untouched. A plane whose length
    /// does not match the grid is also dropped.
    pub fn add_plane(&mut self, level: f64, data: &[f32]) {
        if data.len() != self.proj.plane_points() {
            warn!(
                param = self.parameter_id,
                level = level,
                expected = self.proj.plane_points(),
                actual = data.len(),
                "plane size does not match grid, dropping"
            );
            return;
        }
        let key = self.key(level);
        if self.planes.contains_key(&key) {
            warn!(
                param = self.parameter_id,
                level_type = self.level_type,
                level = level,
                "duplicate level, dropping plane"
            );
            return;
        }
        self.planes.insert(
            key,
            Plane {
                level,
                data: data.to_vec(),
            },
        );
    }

    /// Compact accumulated planes into the contiguous volume buffer and
    /// fill in the vertical metadata (nz, dz, minz, dz-constant).
    ///
    /// Per-level storage is freed as each plane is copied, so peak memory
    /// is bounded by the raw planes plus one compacted volume.
    pub fn assemble(&mut self) {
        let nz = self.planes.len();
        if nz == 0 {
            warn!(
                param = self.parameter_id,
                level_type = self.level_type,
                "assemble called with no accumulated planes"
            );
            return;
        }

        let needed = self.proj.plane_points() * nz;
        if self.volume.capacity() < needed {
            self.volume = Vec::with_capacity(needed);
        }
        self.volume.clear();
        self.levels.clear();

        let mut min_level = 0.0;
        let mut dz = 1.0;
        let mut prev_level: Option<f64> = None;
        let mut prev_dz: Option<f64> = None;
        let mut dz_constant = true;
        // The first delta-to-delta comparison is intentionally skipped;
        // comparisons begin with the second pair of spacings.
        let mut comparisons_skipped = 0u32;

        for (idx, (_, plane)) in mem::take(&mut self.planes).into_iter().enumerate() {
            if idx == 0 {
                min_level = plane.level;
            }
            if let Some(prev) = prev_level {
                let this_dz = plane.level - prev;
                if let Some(last_dz) = prev_dz {
                    if comparisons_skipped == 0 {
                        comparisons_skipped += 1;
                    } else if this_dz != last_dz {
                        dz_constant = false;
                    }
                }
                prev_dz = Some(this_dz);
                dz = this_dz;
            }
            prev_level = Some(plane.level);

            self.levels.push(plane.level);
            self.volume.extend_from_slice(&plane.data);
            // `plane` dropped here, releasing its level-local storage.
        }

        self.proj.nz = nz;
        self.proj.dz = dz;
        self.proj.minz = min_level;
        self.proj.dz_constant = dz_constant;

        debug!(
            param = self.parameter_id,
            level_type = self.level_type,
            nz = nz,
            dz = dz,
            minz = min_level,
            dz_constant = dz_constant,
            "assembled field volume"
        );
    }

    /// The assembled volume, empty before [`assemble`](Self::assemble).
    pub fn volume(&self) -> &[f32] {
        &self.volume
    }

    /// One level's slice of the assembled volume.
    pub fn level_slice(&self, index: usize) -> &[f32] {
        let n = self.proj.plane_points();
        &self.volume[index * n..(index + 1) * n]
    }

    /// Consume the field, yielding the assembled payload.
    pub fn into_volume(self) -> Vec<f32> {
        self.volume
    }
}
