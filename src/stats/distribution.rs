//! Histogram binning and Gaussian kernel density estimation.

use statrs::distribution::{Continuous, Normal};

/// Number of points the density curve is evaluated at.
pub const KDE_GRID_SIZE: usize = 200;

/// Equal-width histogram over the data range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning [min, max].
    ///
    /// The last bin is closed on the right. A zero-width range is widened
    /// by 0.5 on each side. Returns `None` when there is nothing to bin.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0usize; bins];
        for v in &finite {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Self { edges, counts })
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (
            self.edges.first().copied().unwrap_or(0.0),
            self.edges.last().copied().unwrap_or(1.0),
        )
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Scott's rule bandwidth: sample std * n^(-1/5).
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let std = statrs::statistics::Statistics::std_dev(values);
    let bw = std * (values.len() as f64).powf(-0.2);
    (bw.is_finite() && bw > 0.0).then_some(bw)
}

/// Gaussian KDE evaluated on an even grid over [lo, hi].
///
/// Returns `(x, density)` pairs, or `None` with fewer than two values or no spread.
pub fn gaussian_kde(values: &[f64], lo: f64, hi: f64, grid_size: usize) -> Option<Vec<(f64, f64)>> {
    let bandwidth = scott_bandwidth(values)?;
    let kernel = Normal::new(0.0, bandwidth).ok()?;
    let n = values.len() as f64;
    let steps = grid_size.max(2) - 1;

    Some(
        (0..=steps)
            .map(|i| {
                let x = lo + (hi - lo) * i as f64 / steps as f64;
                let density = values.iter().map(|v| kernel.pdf(x - v)).sum::<f64>() / n;
                (x, density)
            })
            .collect(),
    )
}

/// Density curve scaled to histogram counts.
pub fn kde_counts(values: &[f64], histogram: &Histogram) -> Option<Vec<(f64, f64)>> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale = finite.len() as f64 * histogram.bin_width();

    gaussian_kde(&finite, lo, hi, KDE_GRID_SIZE)
        .map(|curve| curve.into_iter().map(|(x, d)| (x, d * scale)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let hist = Histogram::new(&values, 30).unwrap();
        assert_eq!(hist.edges.len(), 31);
        assert_eq!(hist.counts.len(), 30);
        assert_eq!(hist.total(), 100);
        assert_eq!(hist.range(), (0.0, 99.0));
        assert!((hist.bin_width() - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_last_bin_is_closed() {
        let hist = Histogram::new(&[0.0, 1.0, 2.0], 2).unwrap();
        assert_eq!(hist.counts, vec![1, 2]);
    }

    #[test]
    fn test_histogram_constant_values_widen_range() {
        let hist = Histogram::new(&[5.0, 5.0, 5.0], 30).unwrap();
        assert_eq!(hist.range(), (4.5, 5.5));
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_histogram_empty_is_none() {
        assert!(Histogram::new(&[], 30).is_none());
        assert!(Histogram::new(&[f64::NAN], 30).is_none());
    }

    #[test]
    fn test_kde_integrates_to_about_one() {
        let values: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        let curve = gaussian_kde(&values, -20.0, 30.0, 1001).unwrap();
        let dx = 50.0 / 1000.0;
        let area: f64 = curve.iter().map(|(_, d)| d * dx).sum();
        assert!((area - 1.0).abs() < 0.01, "area = {area}");
    }

    #[test]
    fn test_kde_skipped_without_spread() {
        assert!(scott_bandwidth(&[1.0]).is_none());
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], 0.0, 4.0, 10).is_none());
    }

    #[test]
    fn test_kde_counts_scale() {
        let values: Vec<f64> = (0..40).map(|i| i as f64 / 4.0).collect();
        let hist = Histogram::new(&values, 10).unwrap();
        let curve = kde_counts(&values, &hist).unwrap();
        assert_eq!(curve.len(), KDE_GRID_SIZE);
        let peak = curve.iter().map(|(_, c)| *c).fold(0.0, f64::max);
        assert!(peak > 0.0 && peak <= hist.max_count() as f64 * 2.0);
    }
}
