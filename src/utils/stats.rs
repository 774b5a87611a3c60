//! Descriptive statistics helpers shared by the analyzers.
//!
//! Standard deviations are sample deviations (n - 1 denominator) and are
//! undefined for fewer than two values. Binning reproduces the equal-width
//! cut used for geographic buckets: right-closed intervals with the lowest
//! edge nudged down so the minimum value lands in the first bin.

use std::cmp::Ordering;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Round to two decimals for report output
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Equal-width bins spanning the observed range of a column
#[derive(Debug, Clone, PartialEq)]
pub struct EqualWidthBins {
    edges: Vec<f64>,
}

impl EqualWidthBins {
    /// Build `count` equal-width bins over `values`. Returns `None` for empty input.
    pub fn from_values(values: &[f64], count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let mut lo = min(values)?;
        let mut hi = max(values)?;

        if lo == hi {
            lo -= if lo != 0.0 { 0.001 * lo.abs() } else { 0.001 };
            hi += if hi != 0.0 { 0.001 * hi.abs() } else { 0.001 };
            Some(Self {
                edges: linspace(lo, hi, count + 1),
            })
        } else {
            let mut edges = linspace(lo, hi, count + 1);
            edges[0] -= (hi - lo) * 0.001;
            Some(Self { edges })
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the right-closed bin `(edge[i], edge[i + 1]]` containing `value`
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value <= self.edges[0] || value > self.edges[self.edges.len() - 1] {
            return None;
        }
        // First edge that is >= value closes the bin on the right
        let upper = self.edges.partition_point(|edge| *edge < value);
        Some(upper - 1)
    }
}

fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    if num == 1 {
        return vec![start];
    }
    let step = (stop - start) / (num - 1) as f64;
    let mut points: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
    // Pin the last edge so the maximum value is never lost to rounding
    points[num - 1] = stop;
    points
}

/// Histogram with `count` equal-width bins over [min, max]; the last bin is closed.
///
/// Returns `(bin_start, bin_end, frequency)` triples.
pub fn histogram(values: &[f64], count: usize) -> Vec<(f64, f64, usize)> {
    let (Some(lo), Some(hi)) = (min(values), max(values)) else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }
    let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    let width = (hi - lo) / count as f64;

    let mut counts = vec![0usize; count];
    for value in values {
        let idx = (((value - lo) / width).floor() as usize).min(count - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (lo + width * i as f64, lo + width * (i + 1) as f64, c))
        .collect()
}
