//! Temporal wave detection over a rolling wrist history
//!
//! A wave is repeated left-right wrist motion while the hand is open. The
//! detector keeps a short trailing window of normalized wrist x positions
//! and counts direction reversals between fast-moving sample pairs.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Length of the trailing history window in seconds
pub const WAVE_WINDOW_SECS: f64 = 0.9;

/// Minimum samples in the window before detection is attempted
pub const MIN_WAVE_SAMPLES: usize = 6;

/// Minimum horizontal travel (normalized units) across the window
pub const MIN_WAVE_AMPLITUDE: f32 = 0.25;

/// Pairs moving slower than this (normalized units per second) are jitter
pub const MIN_WAVE_VELOCITY: f64 = 0.4;

/// Direction reversals required for a wave
pub const MIN_WAVE_REVERSALS: u32 = 2;

/// One wrist observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WristSample {
    /// Seconds on the caller's clock
    pub t: f64,
    /// Normalized horizontal position in `[0, 1]`
    pub x: f32,
}

impl WristSample {
    pub fn new(t: f64, x: f32) -> Self {
        Self { t, x }
    }
}

/// Count velocity sign changes between consecutive qualifying pairs
///
/// Pairs with non-positive `dt` or speed below [`MIN_WAVE_VELOCITY`] are
/// skipped entirely and do not reset the last seen direction.
pub fn count_reversals<'a, I>(samples: I) -> u32
where
    I: IntoIterator<Item = &'a WristSample>,
{
    let mut reversals = 0;
    let mut last_sign: Option<bool> = None;
    let mut prev: Option<&WristSample> = None;

    for sample in samples {
        if let Some(p) = prev {
            let dt = sample.t - p.t;
            if dt > 0.0 {
                let v = f64::from(sample.x - p.x) / dt;
                if v.abs() >= MIN_WAVE_VELOCITY {
                    let positive = v > 0.0;
                    if last_sign.is_some_and(|s| s != positive) {
                        reversals += 1;
                    }
                    last_sign = Some(positive);
                }
            }
        }
        prev = Some(sample);
    }

    reversals
}

/// Whether a wrist history contains a wave
///
/// Requires at least [`MIN_WAVE_SAMPLES`] samples, a horizontal amplitude
/// of at least [`MIN_WAVE_AMPLITUDE`], and [`MIN_WAVE_REVERSALS`] direction
/// reversals among fast pairs.
pub fn detect_wave<'a, I>(history: I) -> bool
where
    I: IntoIterator<Item = &'a WristSample>,
    I::IntoIter: Clone,
{
    let iter = history.into_iter();
    if iter.clone().count() < MIN_WAVE_SAMPLES {
        return false;
    }

    let (min_x, max_x) = iter
        .clone()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.x), hi.max(s.x))
        });
    if max_x - min_x < MIN_WAVE_AMPLITUDE {
        return false;
    }

    count_reversals(iter) >= MIN_WAVE_REVERSALS
}

/// Rolling wrist history with trailing-window eviction
#[derive(Debug, Clone)]
pub struct WaveDetector {
    history: VecDeque<WristSample>,
    window: f64,
}

impl Default for WaveDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDetector {
    pub fn new() -> Self {
        Self::with_window(WAVE_WINDOW_SECS)
    }

    /// Detector with a custom trailing window length in seconds
    pub fn with_window(window: f64) -> Self {
        Self {
            history: VecDeque::with_capacity(64),
            window,
        }
    }

    /// Append a sample and evict everything older than the window
    ///
    /// Samples are expected in time order. An out-of-order sample becomes
    /// the newest entry and ages the window from its own timestamp.
    pub fn push(&mut self, t: f64, x: f32) {
        self.history.push_back(WristSample::new(t, x));
        while let Some(front) = self.history.front() {
            if t - front.t > self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Run detection over the current window
    pub fn detect(&self) -> bool {
        detect_wave(&self.history)
    }

    /// Drop all history, e.g. when the hand leaves the frame
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &WristSample> {
        self.history.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(f64, f32)]) -> Vec<WristSample> {
        points.iter().map(|&(t, x)| WristSample::new(t, x)).collect()
    }

    /// Six samples over 0.9 s alternating between 0.2 and 0.6
    fn oscillating() -> Vec<WristSample> {
        samples(&[
            (0.0, 0.2),
            (0.18, 0.6),
            (0.36, 0.2),
            (0.54, 0.6),
            (0.72, 0.2),
            (0.9, 0.6),
        ])
    }

    #[test]
    fn test_oscillation_is_wave() {
        let history = oscillating();
        assert_eq!(count_reversals(&history), 4);
        assert!(detect_wave(&history));
    }

    #[test]
    fn test_too_few_samples() {
        let history = &oscillating()[..5];
        assert!(!detect_wave(history));
    }

    #[test]
    fn test_small_amplitude_rejected() {
        // Fast reversals but only 0.2 of travel
        let history = samples(&[
            (0.0, 0.4),
            (0.05, 0.6),
            (0.10, 0.4),
            (0.15, 0.6),
            (0.20, 0.4),
            (0.25, 0.6),
        ]);
        assert!(count_reversals(&history) >= 2);
        assert!(!detect_wave(&history));
    }

    #[test]
    fn test_single_sweep_not_wave() {
        let history = samples(&[
            (0.0, 0.1),
            (0.1, 0.2),
            (0.2, 0.3),
            (0.3, 0.4),
            (0.4, 0.5),
            (0.5, 0.6),
        ]);
        assert_eq!(count_reversals(&history), 0);
        assert!(!detect_wave(&history));
    }

    #[test]
    fn test_slow_pairs_are_jitter() {
        // One real reversal; the slow back-drift between does not count
        let history = samples(&[
            (0.0, 0.2),
            (0.1, 0.5),
            (0.2, 0.49),
            (0.3, 0.48),
            (0.4, 0.2),
            (0.5, 0.21),
        ]);
        assert_eq!(count_reversals(&history), 1);
        assert!(!detect_wave(&history));
    }

    #[test]
    fn test_zero_dt_pairs_skipped() {
        let history = samples(&[(0.0, 0.2), (0.0, 0.8), (0.1, 0.2)]);
        assert_eq!(count_reversals(&history), 0);
    }

    #[test]
    fn test_window_eviction() {
        let mut detector = WaveDetector::new();
        detector.push(0.0, 0.5);
        detector.push(0.5, 0.5);
        detector.push(0.9, 0.5);
        assert_eq!(detector.len(), 3);

        detector.push(1.0, 0.5);
        assert_eq!(detector.len(), 3);
        assert!(detector.samples().all(|s| 1.0 - s.t <= WAVE_WINDOW_SECS));
    }

    #[test]
    fn test_detector_keeps_history_after_detection() {
        let mut detector = WaveDetector::new();
        for s in oscillating() {
            detector.push(s.t, s.x);
        }
        assert!(detector.detect());
        assert_eq!(detector.len(), 6);
        assert!(detector.detect());

        detector.clear();
        assert!(detector.is_empty());
        assert!(!detector.detect());
    }

    #[test]
    fn test_custom_window() {
        let mut detector = WaveDetector::with_window(0.3);
        detector.push(0.0, 0.2);
        detector.push(0.2, 0.6);
        detector.push(0.4, 0.2);
        assert_eq!(detector.len(), 2);

        // Six samples never fit in a 0.3 s window at this rate
        for s in oscillating() {
            detector.push(s.t + 1.0, s.x);
        }
        assert!(detector.len() < MIN_WAVE_SAMPLES);
        assert!(!detector.detect());
    }
}
