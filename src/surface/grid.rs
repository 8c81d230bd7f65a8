//! Regular-grid interpolation of the scattered implied volatility cloud.
//!
//! Points arrive on expiry slices (one time-to-expiration per listed expiration).
//! Each node is filled by interpolating linearly along the strike axis inside the
//! two slices that bracket its time, then linearly in time between them. Nodes
//! outside the observed data are left empty rather than extrapolated.

use anyhow::{anyhow, Result};
use std::cmp::Ordering;

use super::types::{AxisKind, SurfacePoint};

/// Two times closer than this belong to the same expiry slice
const SLICE_EPSILON: f64 = 1e-8;

/// Interpolated surface on an evenly spaced `(time, axis)` grid
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    pub axis: AxisKind,
    /// Time-to-expiration nodes (years)
    pub xs: Vec<f64>,
    /// Strike or moneyness nodes
    pub ys: Vec<f64>,
    /// `z[iy][ix]`, implied volatility in percent; `None` where masked
    pub z: Vec<Vec<Option<f64>>>,
}

impl SurfaceGrid {
    /// Interpolate `points` onto a `size` x `size` grid.
    pub fn interpolate(points: &[SurfacePoint], axis: AxisKind, size: usize) -> Result<Self> {
        let xyz: Vec<(f64, f64, f64)> = points
            .iter()
            .map(|p| (p.time_to_expiration, axis.value(p), p.implied_vol_pct))
            .collect();
        Self::from_xyz(&xyz, axis, size)
    }

    pub fn from_xyz(xyz: &[(f64, f64, f64)], axis: AxisKind, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(anyhow!("Grid size must be at least 2, got {}", size));
        }
        let finite: Vec<(f64, f64, f64)> = xyz
            .iter()
            .copied()
            .filter(|(x, y, z)| x.is_finite() && y.is_finite() && z.is_finite())
            .collect();
        if finite.len() < 2 {
            return Err(anyhow!(
                "Insufficient points for surface interpolation: {}",
                finite.len()
            ));
        }

        let slices = group_slices(&finite);
        let (x_min, x_max) = min_max(finite.iter().map(|p| p.0));
        let (y_min, y_max) = min_max(finite.iter().map(|p| p.1));

        let xs = linspace(x_min, x_max, size);
        let ys = linspace(y_min, y_max, size);

        let z = ys
            .iter()
            .map(|&y| xs.iter().map(|&x| interp_at(&slices, x, y)).collect())
            .collect();

        Ok(Self { axis, xs, ys, z })
    }

    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        self.z.get(iy).and_then(|row| row.get(ix)).copied().flatten()
    }

    /// Number of unmasked nodes
    pub fn filled(&self) -> usize {
        self.z.iter().flatten().filter(|v| v.is_some()).count()
    }

    /// Smallest and largest unmasked value
    pub fn z_range(&self) -> Option<(f64, f64)> {
        let values: Vec<f64> = self.z.iter().flatten().filter_map(|v| *v).collect();
        if values.is_empty() {
            return None;
        }
        Some(min_max(values.into_iter()))
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
        .collect()
}

/// Linear interpolation on sorted `(x, y)` pairs without extrapolation
pub fn linear_interp(sorted_points: &[(f64, f64)], query_x: f64) -> Option<f64> {
    let (first, last) = match (sorted_points.first(), sorted_points.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return None,
    };

    if query_x < first.0 - SLICE_EPSILON || query_x > last.0 + SLICE_EPSILON {
        return None;
    }
    if sorted_points.len() == 1 || query_x <= first.0 {
        return Some(first.1);
    }
    if query_x >= last.0 {
        return Some(last.1);
    }

    for pair in sorted_points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        if query_x >= x1 && query_x <= x2 {
            let t = (query_x - x1) / (x2 - x1);
            return Some(y1 + t * (y2 - y1));
        }
    }

    None
}

/// One expiry slice: its time and sorted `(axis, iv)` pairs
type Slice = (f64, Vec<(f64, f64)>);

/// Group points into expiry slices sorted by time, averaging duplicate axis values
fn group_slices(points: &[(f64, f64, f64)]) -> Vec<Slice> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    });

    let mut slices: Vec<Slice> = Vec::new();
    for (x, y, z) in sorted {
        match slices.last_mut() {
            Some((t, pairs)) if (x - *t).abs() < SLICE_EPSILON => pairs.push((y, z)),
            _ => slices.push((x, vec![(y, z)])),
        }
    }

    for (_, pairs) in slices.iter_mut() {
        *pairs = average_duplicates(pairs);
    }
    slices
}

fn average_duplicates(sorted_pairs: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64, usize)> = Vec::with_capacity(sorted_pairs.len());
    for &(y, z) in sorted_pairs {
        match out.last_mut() {
            Some((py, sum, n)) if (y - *py).abs() < SLICE_EPSILON => {
                *sum += z;
                *n += 1;
            }
            _ => out.push((y, z, 1)),
        }
    }
    out.into_iter()
        .map(|(y, sum, n)| (y, sum / n as f64))
        .collect()
}

fn interp_at(slices: &[Slice], x: f64, y: f64) -> Option<f64> {
    let (first_t, last_t) = match (slices.first(), slices.last()) {
        (Some(f), Some(l)) => (f.0, l.0),
        _ => return None,
    };
    if x < first_t - SLICE_EPSILON || x > last_t + SLICE_EPSILON {
        return None;
    }

    // exact slice hit (covers the single-expiry case)
    if let Some((_, pairs)) = slices.iter().find(|(t, _)| (x - t).abs() < SLICE_EPSILON) {
        return linear_interp(pairs, y);
    }

    for pair in slices.windows(2) {
        let (t1, p1) = (pair[0].0, &pair[0].1);
        let (t2, p2) = (pair[1].0, &pair[1].1);
        if x > t1 && x < t2 {
            let v1 = linear_interp(p1, y)?;
            let v2 = linear_interp(p2, y)?;
            let w = (x - t1) / (t2 - t1);
            return Some(v1 + w * (v2 - v1));
        }
    }

    None
}

fn min_max<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
