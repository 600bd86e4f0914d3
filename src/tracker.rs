//! Boundary-lock progress tracking.
//!
//! Raw progress derived from a pointer angle wraps discontinuously at the
//! 0/360 seam of the ring: a drag past the maximum reads as an instant fall
//! to near zero and vice versa. The tracker consumes raw samples one at a
//! time, quantizes them by the configured step, and pins the committed value
//! at an extreme until the pointer makes an intentional reversal back into
//! the detection band near that extreme. Without the hysteresis, jitter at
//! the seam oscillates the value between min and max.

use tracing::{debug, trace};

/// Detection band width near each extreme, as a fraction of the range.
const DETECT_BAND: f32 = 0.05;

/// Whether the committed value is pinned at an extreme of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryLock {
    Free,
    AtMax,
    AtMin,
}

/// Per-session progress state. Owns the only mutable data in the core:
/// everything else in the crate recomputes from the committed points value.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    min: i32,
    max: i32,
    step: i32,
    points: i32,
    previous_raw: Option<f32>,
    current_raw: f32,
    samples: u32,
    lock: BoundaryLock,
}

impl ProgressTracker {
    /// Builds a tracker with the initial value clamped into `[min, max]`.
    ///
    /// Range and step validity is the caller's responsibility; the widget
    /// configuration rejects `step <= 0` and `min >= max` before a tracker
    /// is ever constructed.
    pub fn new(min: i32, max: i32, step: i32, initial_points: i32) -> Self {
        Self {
            min,
            max,
            step,
            points: initial_points.clamp(min, max),
            previous_raw: None,
            current_raw: 0.0,
            samples: 0,
            lock: BoundaryLock::Free,
        }
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn lock(&self) -> BoundaryLock {
        self.lock
    }

    /// Starts a drag session: resets the sample counter, releases any
    /// boundary lock, and re-arms the origin guard.
    pub fn begin_session(&mut self) {
        debug!(points = self.points, "tracking session started");
        self.samples = 0;
        self.previous_raw = None;
        self.lock = BoundaryLock::Free;
    }

    /// Ends a drag session (pointer up or cancel). The guard is re-armed so
    /// a stale raw value from this session cannot leak into the next one.
    pub fn end_session(&mut self) {
        debug!(points = self.points, "tracking session ended");
        self.samples = 0;
        self.previous_raw = None;
    }

    /// Feeds one raw progress sample through the state machine.
    ///
    /// Returns `Some(points)` when a change notification should fire and
    /// `None` when the sample was dropped or only released a lock without
    /// committing a new value.
    pub fn sample(&mut self, raw: f32) -> Option<i32> {
        let max_detect = self.max as f32 * (1.0 - DETECT_BAND);
        let min_detect = self.max as f32 * DETECT_BAND + self.min as f32;

        self.samples = self.samples.saturating_add(1);
        if !raw.is_finite() {
            trace!(raw, "dropped non-finite sample");
            return None;
        }

        // A first touch landing near the seam must not read as a jump to max.
        if raw > max_detect && self.previous_raw.is_none() {
            trace!(raw, "origin guard dropped seam-adjacent first sample");
            return None;
        }

        let prev = match self.previous_raw {
            None => {
                self.current_raw = raw;
                self.previous_raw = Some(raw);
                raw
            }
            Some(_) => {
                let p = self.current_raw;
                self.previous_raw = Some(p);
                self.current_raw = raw;
                p
            }
        };

        match self.lock {
            BoundaryLock::Free => {
                if self.samples > 1 {
                    // Raw fell from the max band straight into the min band:
                    // the pointer crossed the seam going up. Pin at max.
                    if prev >= max_detect && self.current_raw <= min_detect && prev > self.current_raw {
                        self.lock = BoundaryLock::AtMax;
                        self.points = self.max;
                        self.current_raw = self.max as f32;
                        debug!(points = self.points, "wrapped past max, locked");
                        return Some(self.points);
                    }
                    // Mirror case crossing the seam going down, or the raw
                    // value dropping onto the floor of the range.
                    if (self.current_raw >= max_detect && prev <= min_detect && self.current_raw > prev)
                        || self.current_raw <= self.min as f32
                    {
                        self.lock = BoundaryLock::AtMin;
                        self.points = self.min;
                        self.current_raw = self.min as f32;
                        debug!(points = self.points, "wrapped past min, locked");
                        return Some(self.points);
                    }
                }
            }
            BoundaryLock::AtMax => {
                // Only a decrease that stays inside the max band counts as
                // an intentional retreat from the ceiling.
                if self.current_raw < prev && self.current_raw >= max_detect {
                    debug!("reversal inside max band, unlocked");
                    self.lock = BoundaryLock::Free;
                } else {
                    return None;
                }
            }
            BoundaryLock::AtMin => {
                if prev < self.current_raw
                    && prev <= min_detect
                    && self.current_raw <= min_detect
                    && self.points >= self.min
                {
                    debug!("increase inside min band, unlocked");
                    self.lock = BoundaryLock::Free;
                } else {
                    return None;
                }
            }
        }

        // Truncate, never round: the committed value must not exceed the raw.
        let clamped = (raw as i32).clamp(self.min, self.max);
        self.points = self.quantize(clamped);
        trace!(raw, points = self.points, "committed sample");
        Some(self.points)
    }

    /// Programmatic value update. Clamps and quantizes, releases any lock,
    /// and does not count as a user sample.
    pub fn set_points(&mut self, points: i32) -> i32 {
        self.points = self.quantize(points.clamp(self.min, self.max));
        self.lock = BoundaryLock::Free;
        self.points
    }

    fn quantize(&self, p: i32) -> i32 {
        p - p % self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ProgressTracker {
        let mut t = ProgressTracker::new(0, 100, 10, 0);
        t.begin_session();
        t
    }

    #[test]
    fn initial_points_are_clamped() {
        assert_eq!(ProgressTracker::new(0, 100, 10, 250).points(), 100);
        assert_eq!(ProgressTracker::new(10, 100, 10, -5).points(), 10);
    }

    #[test]
    fn samples_are_quantized_down_to_step() {
        let mut t = tracker();
        assert_eq!(t.sample(47.0), Some(40));
        assert_eq!(t.sample(59.9), Some(50));
        assert_eq!(t.points(), 50);
    }

    #[test]
    fn quantization_floors_and_never_reaches_max_without_the_seam() {
        let mut t = tracker();
        assert_eq!(t.sample(59.9), Some(50));
        // A raw just under the ceiling commits the step below it; only a
        // seam crossing can commit max itself.
        assert_eq!(t.sample(99.7), Some(90));
        assert_eq!(t.points(), 90);
        assert_eq!(t.lock(), BoundaryLock::Free);
    }

    #[test]
    fn committed_points_stay_in_range_and_on_step() {
        let mut t = tracker();
        for raw in [3.0, 18.2, 94.7, 91.0, 55.5, 0.4] {
            if let Some(points) = t.sample(raw) {
                assert!((0..=100).contains(&points));
                assert_eq!(points % 10, 0);
                assert!(points as f32 <= raw);
            }
        }
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut t = tracker();
        t.sample(50.0);
        assert_eq!(t.sample(f32::NAN), None);
        assert_eq!(t.sample(f32::INFINITY), None);
        assert_eq!(t.points(), 50);
    }

    #[test]
    fn origin_guard_drops_first_seam_sample() {
        let mut t = tracker();
        assert_eq!(t.sample(97.0), None);
        assert_eq!(t.points(), 0);
        assert_eq!(t.lock(), BoundaryLock::Free);
        // A sample away from the seam disarms the guard.
        assert_eq!(t.sample(50.0), Some(50));
        assert_eq!(t.sample(97.0), Some(90));
    }

    #[test]
    fn guard_rearms_between_sessions() {
        let mut t = tracker();
        t.sample(50.0);
        t.end_session();
        t.begin_session();
        assert_eq!(t.sample(98.0), None);
    }

    #[test]
    fn dropping_to_floor_locks_at_min() {
        let mut t = tracker();
        t.sample(30.0);
        assert_eq!(t.sample(0.0), Some(0));
        assert_eq!(t.lock(), BoundaryLock::AtMin);
    }

    #[test]
    fn seam_crossing_downward_locks_at_min() {
        let mut t = tracker();
        t.sample(10.0);
        t.sample(3.0);
        // Raw jumps from the min band to the max band: crossed the seam
        // going down.
        assert_eq!(t.sample(98.0), Some(0));
        assert_eq!(t.lock(), BoundaryLock::AtMin);
    }

    #[test]
    fn min_lock_releases_inside_min_band() {
        let mut t = tracker();
        t.sample(10.0);
        t.sample(3.0);
        t.sample(98.0);
        assert_eq!(t.lock(), BoundaryLock::AtMin);
        // Jitter in the max band keeps the lock.
        assert_eq!(t.sample(97.0), None);
        assert_eq!(t.points(), 0);
        assert_eq!(t.sample(2.0), None);
        // An increasing pair inside the min band releases it.
        assert_eq!(t.sample(4.0), Some(0));
        assert_eq!(t.lock(), BoundaryLock::Free);
        assert_eq!(t.sample(22.0), Some(20));
    }

    #[test]
    fn set_points_clamps_quantizes_and_unlocks() {
        let mut t = tracker();
        t.sample(50.0);
        t.sample(96.0);
        t.sample(2.0);
        assert_eq!(t.lock(), BoundaryLock::AtMax);
        assert_eq!(t.set_points(137), 100);
        assert_eq!(t.set_points(44), 40);
        assert_eq!(t.lock(), BoundaryLock::Free);
    }
}
