//! Wind speed and direction derived from u/v component fields.

use tracing::debug;

use grib_records::params;
use grid_volume::Field;

/// Relative tolerance for matching levels across the two components.
const LEVEL_MATCH_TOLERANCE: f64 = 0.001;

/// Which wind product to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindProduct {
    Speed,
    Direction,
}

impl WindProduct {
    pub fn parameter_id(self) -> i32 {
        match self {
            WindProduct::Speed => params::WIND,
            WindProduct::Direction => params::WDIR,
        }
    }

    fn names(self) -> (&'static str, &'static str, &'static str) {
        match self {
            WindProduct::Speed => ("WIND", "Wind speed", "m/s"),
            WindProduct::Direction => ("WDIR", "Wind direction", "deg"),
        }
    }

    fn compute(self, u: f32, v: f32) -> f32 {
        match self {
            WindProduct::Speed => u.hypot(v),
            // Meteorological convention: the direction the wind blows
            // from, degrees clockwise from north.
            WindProduct::Direction => {
                let mut deg = (-u).atan2(-v).to_degrees();
                if deg < 0.0 {
                    deg += 360.0;
                }
                if deg >= 360.0 {
                    deg -= 360.0;
                }
                deg
            }
        }
    }
}

/// Derive one wind product from its component fields.
///
/// Components with equal level counts pair plane-for-plane by index and
/// the product is computed elementwise; their level values are not
/// compared. When the counts differ, output levels follow whichever
/// component carries more of them, a component level matches when the two
/// values agree to within 0.1 percent, and an output level with no match
/// on the other component is filled with missing values.
///
/// Both components must already be assembled on the same horizontal grid.
pub fn derive_wind(product: WindProduct, u: &Field, v: &Field) -> Field {
    let (short_name, long_name, units) = product.names();

    let mut out = Field::new(product.parameter_id(), u.level_type(), *u.proj());
    out.short_name = short_name.to_string();
    out.long_name = long_name.to_string();
    out.units = units.to_string();
    out.generate_time = u.generate_time;
    out.forecast_secs = u.forecast_secs;

    let mut plane = vec![0.0f32; u.proj().plane_points()];

    if u.level_count() == v.level_count() {
        for (i, &level) in u.levels().iter().enumerate() {
            compute_plane(product, u.level_slice(i), v.level_slice(i), &mut plane);
            out.add_plane(level, &plane);
        }
        out.assemble();
        return out;
    }

    let (leader, follower, leader_is_u) = if u.level_count() > v.level_count() {
        (u, v, true)
    } else {
        (v, u, false)
    };

    for (i, &level) in leader.levels().iter().enumerate() {
        match matching_level(follower.levels(), level) {
            Some(j) => {
                let (u_plane, v_plane) = if leader_is_u {
                    (leader.level_slice(i), follower.level_slice(j))
                } else {
                    (follower.level_slice(j), leader.level_slice(i))
                };
                compute_plane(product, u_plane, v_plane, &mut plane);
            }
            None => {
                debug!(
                    product = short_name,
                    level = level,
                    "no matching component level, filling with missing values"
                );
                plane.fill(f32::NAN);
            }
        }
        out.add_plane(level, &plane);
    }

    out.assemble();
    out
}

fn compute_plane(product: WindProduct, u_plane: &[f32], v_plane: &[f32], out: &mut [f32]) {
    for (dst, (&uu, &vv)) in out.iter_mut().zip(u_plane.iter().zip(v_plane)) {
        *dst = product.compute(uu, vv);
    }
}

fn matching_level(levels: &[f64], target: f64) -> Option<usize> {
    levels.iter().position(|&l| {
        if l == target {
            return true;
        }
        if l == 0.0 {
            return false;
        }
        ((target - l) / l).abs() < LEVEL_MATCH_TOLERANCE
    })
}
