//! Quasi-regular to regular grid repair.
//!
//! Some provider grids shrink their rows toward the poles instead of
//! keeping a constant width. [`qlin`] resamples such a grid onto a fixed
//! width by row-wise linear interpolation.

use std::collections::HashMap;

/// Precomputed weights for one output position: source index plus the two
/// blend coefficients for that point and its right neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowWeight {
    pub index: usize,
    pub w0: f32,
    pub w1: f32,
}

/// Interpolation weights mapping an `n`-point row onto `m` output points.
///
/// Positions advance by integer division of `k * (n - 1)` by `m - 1`,
/// with the remainder giving the fractional blend.
pub fn resample_weights(n: usize, m: usize) -> Vec<RowWeight> {
    let mut weights = Vec::with_capacity(m);
    if n <= 1 || m == 1 {
        for _ in 0..m {
            weights.push(RowWeight {
                index: 0,
                w0: 1.0,
                w1: 0.0,
            });
        }
        return weights;
    }
    for k in 0..m {
        let num = k * (n - 1);
        let index = num / (m - 1);
        let rem = num % (m - 1);
        let w1 = rem as f32 / (m - 1) as f32;
        weights.push(RowWeight {
            index,
            w0: 1.0 - w1,
            w1,
        });
    }
    weights
}

/// Resample one row through precomputed weights.
pub fn linear(row: &[f32], weights: &[RowWeight], out: &mut [f32]) {
    debug_assert_eq!(weights.len(), out.len());
    let last = row.len() - 1;
    for (o, w) in out.iter_mut().zip(weights) {
        let right = if w.index < last { w.index + 1 } else { last };
        *o = w.w0 * row[w.index] + w.w1 * row[right];
    }
}

/// Resample a variable-row-length grid onto a fixed-width grid.
///
/// `row_index` holds `nrows + 1` start offsets into `input`; row `i`
/// spans `input[row_index[i]..row_index[i + 1]]`. `out` must hold
/// `out_width * out_rows` values.
///
/// An output row landing exactly on an input row is resampled from that
/// row alone. A fractional position resamples both adjacent rows and
/// blends them. In this pipeline `out_rows` always equals `nrows`, so
/// the blend branch is reached only through direct calls.
pub fn qlin(
    nrows: usize,
    row_index: &[usize],
    input: &[f32],
    out_width: usize,
    out_rows: usize,
    out: &mut [f32],
) {
    debug_assert_eq!(row_index.len(), nrows + 1);
    debug_assert_eq!(out.len(), out_width * out_rows);

    // Weights are shared between rows of equal length.
    let mut weight_cache: HashMap<usize, Vec<RowWeight>> = HashMap::new();
    let mut upper = vec![0.0f32; out_width];
    let mut lower = vec![0.0f32; out_width];

    for j in 0..out_rows {
        let (row, frac) = if out_rows <= 1 || nrows <= 1 {
            (0, 0u32)
        } else {
            let num = j * (nrows - 1);
            ((num / (out_rows - 1)), (num % (out_rows - 1)) as u32)
        };

        let out_row = &mut out[j * out_width..(j + 1) * out_width];
        let row_slice = |r: usize| &input[row_index[r]..row_index[r + 1]];

        if frac == 0 {
            let src = row_slice(row);
            let weights = weight_cache
                .entry(src.len())
                .or_insert_with(|| resample_weights(src.len(), out_width));
            linear(src, weights, out_row);
        } else {
            let f = frac as f32 / (out_rows - 1) as f32;
            let a = row_slice(row);
            let b = row_slice(row + 1);
            {
                let weights = weight_cache
                    .entry(a.len())
                    .or_insert_with(|| resample_weights(a.len(), out_width));
                linear(a, weights, &mut upper);
            }
            {
                let weights = weight_cache
                    .entry(b.len())
                    .or_insert_with(|| resample_weights(b.len(), out_width));
                linear(b, weights, &mut lower);
            }
            for (o, (ua, lb)) in out_row.iter_mut().zip(upper.iter().zip(&lower)) {
                *o = (1.0 - f) * ua + f * lb;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints_and_midpoint() {
        let row = [0.0, 2.0];
        let weights = resample_weights(2, 3);
        let mut out = [0.0; 3];
        linear(&row, &weights, &mut out);
        assert_eq!(out, [0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_linear_single_point_row() {
        let row = [7.0];
        let weights = resample_weights(1, 4);
        let mut out = [0.0; 4];
        linear(&row, &weights, &mut out);
        assert_eq!(out, [7.0; 4]);
    }

    #[test]
    fn test_qlin_constant_rows_reproduced() {
        // Two rows of lengths 4 and 2, each holding a constant;
        // interpolation of a constant is the constant.
        let input = [3.0, 3.0, 3.0, 3.0, 8.0, 8.0];
        let row_index = [0usize, 4, 6];
        let mut out = [0.0f32; 8];
        qlin(2, &row_index, &input, 4, 2, &mut out);
        assert_eq!(&out[0..4], &[3.0; 4]);
        assert_eq!(&out[4..8], &[8.0; 4]);
    }

    #[test]
    fn test_qlin_widens_short_row() {
        let input = [0.0, 1.0, 2.0, 3.0, 0.0, 3.0];
        let row_index = [0usize, 4, 6];
        let mut out = [0.0f32; 8];
        qlin(2, &row_index, &input, 4, 2, &mut out);
        // Full-width row passes through untouched.
        assert_eq!(&out[0..4], &[0.0, 1.0, 2.0, 3.0]);
        // Two-point row stretches linearly across four columns.
        assert_eq!(&out[4..8], &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn blends_between_rows_at_fractional_positions() {
        // No pipeline caller passes out_rows != nrows; this exercises the
        // fractional-row branch directly so it stays validated.
        let input = [0.0, 0.0, 2.0, 2.0];
        let row_index = [0usize, 2, 4];
        let mut out = [0.0f32; 6];
        qlin(2, &row_index, &input, 2, 3, &mut out);
        assert_eq!(&out[0..2], &[0.0, 0.0]);
        assert_eq!(&out[2..4], &[1.0, 1.0]);
        assert_eq!(&out[4..6], &[2.0, 2.0]);
    }

    #[test]
    fn test_qlin_single_row() {
        let input = [1.0, 2.0];
        let row_index = [0usize, 2];
        let mut out = [0.0f32; 3];
        qlin(1, &row_index, &input, 3, 1, &mut out);
        assert_eq!(out, [1.0, 1.5, 2.0]);
    }
}
