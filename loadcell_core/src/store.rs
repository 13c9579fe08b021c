//! Bounded time-series storage, one series per channel.

use std::collections::VecDeque;

/// Default ring capacity per channel (samples).
pub const DEFAULT_CAPACITY: usize = 5000;

/// A contiguous window of a channel's series, cloned out for the consumer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesWindow {
    pub elapsed: Vec<f64>,
    pub raw: Vec<f64>,
    pub calibrated: Vec<f64>,
}

impl SeriesWindow {
    pub fn is_empty(&self) -> bool {
        self.elapsed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elapsed.len()
    }
}

/// One channel's bounded history: raw and calibrated values sharing one
/// elapsed-time sequence. The three deques always have equal length, at
/// most `capacity`; the oldest sample is evicted first.
#[derive(Debug, Clone)]
pub struct ChannelSeries {
    capacity: usize,
    elapsed: VecDeque<f64>,
    raw: VecDeque<f64>,
    calibrated: VecDeque<f64>,
}

impl ChannelSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            elapsed: VecDeque::with_capacity(capacity),
            raw: VecDeque::with_capacity(capacity),
            calibrated: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.elapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed.is_empty()
    }

    /// Append one sample, evicting the oldest when full. `elapsed_s` must
    /// be non-decreasing within a session; the window lookup relies on it.
    pub fn append(&mut self, elapsed_s: f64, raw: f64, calibrated: f64) {
        debug_assert!(
            self.elapsed.back().is_none_or(|&last| elapsed_s >= last),
            "elapsed_s must be non-decreasing"
        );
        if self.elapsed.len() == self.capacity {
            self.elapsed.pop_front();
            self.raw.pop_front();
            self.calibrated.pop_front();
        }
        self.elapsed.push_back(elapsed_s);
        self.raw.push_back(raw);
        self.calibrated.push_back(calibrated);
    }

    /// Most recent sample, if any: (elapsed, raw, calibrated).
    pub fn latest(&self) -> Option<(f64, f64, f64)> {
        Some((
            *self.elapsed.back()?,
            *self.raw.back()?,
            *self.calibrated.back()?,
        ))
    }

    /// The suffix with `elapsed >= now_s - window_s` (clamped at 0).
    pub fn window_ending(&self, now_s: f64, window_s: f64) -> SeriesWindow {
        if self.elapsed.is_empty() {
            return SeriesWindow::default();
        }
        let tmin = (now_s - window_s).max(0.0);
        let start = self.elapsed.partition_point(|&t| t < tmin);
        SeriesWindow {
            elapsed: self.elapsed.iter().skip(start).copied().collect(),
            raw: self.raw.iter().skip(start).copied().collect(),
            calibrated: self.calibrated.iter().skip(start).copied().collect(),
        }
    }

    /// The trailing window ending at the latest stored sample.
    pub fn window(&self, window_s: f64) -> SeriesWindow {
        match self.elapsed.back() {
            Some(&latest) => self.window_ending(latest, window_s),
            None => SeriesWindow::default(),
        }
    }

    /// Up to `count` most recent raw readings, oldest first.
    pub fn recent_raw(&self, count: usize) -> Vec<f64> {
        let start = self.raw.len().saturating_sub(count);
        self.raw.iter().skip(start).copied().collect()
    }

    pub fn clear(&mut self) {
        self.elapsed.clear();
        self.raw.clear();
        self.calibrated.clear();
    }
}

impl Default for ChannelSeries {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
