//! Final output staging.
//!
//! [`VolumeBuilder`] takes the assembled fields from one scanned file and
//! turns them into [`OutputField`]s: derives requested wind products from
//! their components, prunes fields that were only decoded for derivation,
//! applies geometry fixups and unit conversions, and hands non-native
//! projections to the configured [`GridRemapper`].

use std::mem;

use tracing::{debug, warn};

use grib_records::params;
use grid_volume::{Field, ProjectionKind};

use crate::config::{IngestConfig, UnitConversion};
use crate::derive::{derive_wind, WindProduct};
use crate::output::{GridRemapper, OutputField};

pub struct VolumeBuilder<'a> {
    config: &'a IngestConfig,
    remapper: Option<&'a dyn GridRemapper>,
}

impl<'a> VolumeBuilder<'a> {
    pub fn new(config: &'a IngestConfig) -> Self {
        Self {
            config,
            remapper: None,
        }
    }

    pub fn with_remapper(mut self, remapper: &'a dyn GridRemapper) -> Self {
        self.remapper = Some(remapper);
        self
    }

    /// Stage every assembled field for output.
    ///
    /// Fields that cannot be completed (missing wind components, remap
    /// failures, unsupported target projections) are reported and dropped;
    /// the rest of the batch is unaffected.
    pub fn build(&self, mut fields: Vec<Field>) -> Vec<OutputField> {
        self.derive_requested_wind(&mut fields);

        if !self.config.output_all_fields {
            fields.retain(|f| {
                let keep = self.config.is_requested(f.parameter_id(), f.level_type());
                if !keep {
                    debug!(
                        param = %f.short_name,
                        level_type = f.level_type(),
                        "pruning field not in requested set"
                    );
                }
                keep
            });
        }

        fields.into_iter().filter_map(|f| self.finalize(f)).collect()
    }

    /// Synthesize requested WIND/WDIR fields that did not arrive decoded.
    fn derive_requested_wind(&self, fields: &mut Vec<Field>) {
        for product in [WindProduct::Speed, WindProduct::Direction] {
            let parameter_id = product.parameter_id();
            let wanted: Vec<i32> = self
                .config
                .requested
                .iter()
                .filter(|r| r.parameter_id == parameter_id)
                .map(|r| r.level_type)
                .filter(|&lt| {
                    !fields
                        .iter()
                        .any(|f| f.parameter_id() == parameter_id && f.level_type() == lt)
                })
                .collect();

            for level_type in wanted {
                let u = fields
                    .iter()
                    .find(|f| f.parameter_id() == params::UGRD && f.level_type() == level_type);
                let v = fields
                    .iter()
                    .find(|f| f.parameter_id() == params::VGRD && f.level_type() == level_type);
                let (Some(u), Some(v)) = (u, v) else {
                    debug!(
                        level_type = level_type,
                        "wind components unavailable, cannot derive"
                    );
                    continue;
                };
                if u.proj().nx != v.proj().nx || u.proj().ny != v.proj().ny {
                    warn!(
                        level_type = level_type,
                        "wind components on different grids, cannot derive"
                    );
                    continue;
                }
                let derived = derive_wind(product, u, v);
                fields.push(derived);
            }
        }
    }

    fn finalize(&self, field: Field) -> Option<OutputField> {
        let parameter_id = field.parameter_id();
        let level_type = field.level_type();

        // An explicit geometry replaces the decoded horizontal navigation;
        // the vertical structure always comes from the assembled data.
        let mut proj = match self.config.override_geometry {
            Some(geom) => {
                let mut p = geom.to_descriptor();
                p.nz = field.proj().nz;
                p.dz = field.proj().dz;
                p.minz = field.proj().minz;
                p.dz_constant = field.proj().dz_constant;
                p
            }
            None => *field.proj(),
        };

        while proj.minx < -180.0 {
            proj.minx += 360.0;
        }
        while proj.minx >= 180.0 {
            proj.minx -= 360.0;
        }

        match proj.kind {
            ProjectionKind::PolarStereo => {
                // Grid spacing is given at 60 degrees latitude; rescale to
                // the pole-tangent plane.
                let factor = 2.0 / (1.0 + 60.0f64.to_radians().sin());
                proj.dx *= factor;
                proj.dy *= factor;
            }
            ProjectionKind::LambertConf => {
                if proj.param1.abs() > proj.param2.abs() {
                    mem::swap(&mut proj.param1, &mut proj.param2);
                }
            }
            _ => {}
        }

        let conversion = self.config.conversion_for(parameter_id, level_type);
        let units = match conversion.target_units() {
            Some(target) => target.to_string(),
            None => field.units.clone(),
        };

        let staged = OutputField {
            parameter_id,
            level_type,
            short_name: field.short_name.clone(),
            long_name: field.long_name.clone(),
            units,
            generate_time: field.generate_time,
            forecast_secs: field.forecast_secs,
            proj,
            data: {
                let mut data = field.into_volume();
                if conversion != UnitConversion::None {
                    for value in &mut data {
                        *value = conversion.apply(*value);
                    }
                }
                data
            },
        };

        let target = self.config.output_projection;
        if target == ProjectionKind::Native || target == staged.proj.kind {
            return Some(staged);
        }
        match target {
            ProjectionKind::Flat | ProjectionKind::LatLon | ProjectionKind::LambertConf => {
                let Some(remapper) = self.remapper else {
                    warn!(
                        projection = ?target,
                        param = %staged.short_name,
                        "no remapper configured, dropping field"
                    );
                    return None;
                };
                match remapper.remap(&staged, target) {
                    Ok(remapped) => Some(remapped),
                    Err(e) => {
                        warn!(
                            error = %e,
                            param = %staged.short_name,
                            "projection remap failed, dropping field"
                        );
                        None
                    }
                }
            }
            _ => {
                warn!(
                    projection = ?target,
                    param = %staged.short_name,
                    "unsupported output projection, dropping field"
                );
                None
            }
        }
    }
}
