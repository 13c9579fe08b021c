//! Trailing-window statistics over the calibrated series.

use crate::store::ChannelSeries;

/// Display statistics for one channel over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Last calibrated value in the window.
    pub current: f64,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub sample_count: usize,
}

/// Compute statistics over a calibrated window. `None` for an empty
/// window; never a divide-by-zero or NaN from emptiness.
pub fn compute(calibrated: &[f64]) -> Option<WindowStats> {
    let current = *calibrated.last()?;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut sum = 0.0;
    for &v in calibrated {
        max = max.max(v);
        min = min.min(v);
        sum += v;
    }
    Some(WindowStats {
        current,
        max,
        min,
        mean: sum / calibrated.len() as f64,
        sample_count: calibrated.len(),
    })
}

/// Statistics over the trailing `window_s` seconds of a channel series.
pub fn window_stats(series: &ChannelSeries, window_s: f64) -> Option<WindowStats> {
    compute(&series.window(window_s).calibrated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_yields_none() {
        assert_eq!(compute(&[]), None);
    }

    #[test]
    fn one_two_three() {
        let s = compute(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.current, 3.0);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.sample_count, 3);
    }
}
