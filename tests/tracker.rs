//! Scenario tests for the seam-wraparound hysteresis, driven both through
//! the tracker directly and through the widget's input path.

use std::sync::{Arc, Mutex};

use seekring::{BoundaryLock, ChangeListener, ProgressTracker, SeekRing, SeekRingConfig};

fn tracker() -> ProgressTracker {
    let mut t = ProgressTracker::new(0, 100, 10, 0);
    t.begin_session();
    t
}

#[test]
fn drag_past_the_ceiling_locks_at_max() {
    let mut t = tracker();

    assert_eq!(t.sample(50.0), Some(50));
    assert_eq!(t.sample(96.0), Some(90));
    assert_eq!(t.lock(), BoundaryLock::Free);

    // Raw falls from the max band straight into the min band: the pointer
    // crossed the seam, not the whole range.
    assert_eq!(t.sample(2.0), Some(100));
    assert_eq!(t.lock(), BoundaryLock::AtMax);
    assert_eq!(t.points(), 100);
}

#[test]
fn reversal_in_the_max_band_unlocks_and_recommits() {
    let mut t = tracker();
    t.sample(50.0);
    t.sample(96.0);
    t.sample(2.0);
    assert_eq!(t.lock(), BoundaryLock::AtMax);

    // Coming back down while still inside the max band is an intentional
    // retreat from the ceiling.
    assert_eq!(t.sample(97.0), Some(90));
    assert_eq!(t.lock(), BoundaryLock::Free);
}

#[test]
fn seam_jitter_while_locked_does_not_oscillate() {
    let mut t = tracker();
    t.sample(50.0);
    t.sample(96.0);
    t.sample(2.0);
    assert_eq!(t.points(), 100);

    // Noise on the far side of the seam keeps the value pinned at max
    // instead of flapping between the extremes.
    for raw in [2.0, 1.0, 3.0, 0.5, 4.0] {
        assert_eq!(t.sample(raw), None);
        assert_eq!(t.points(), 100);
        assert_eq!(t.lock(), BoundaryLock::AtMax);
    }
}

#[test]
fn session_start_near_the_seam_is_ignored() {
    let mut t = ProgressTracker::new(0, 100, 10, 30);
    t.begin_session();
    assert_eq!(t.sample(97.0), None);
    assert_eq!(t.points(), 30);
    assert_eq!(t.lock(), BoundaryLock::Free);
}

#[derive(Default)]
struct Recorder {
    changes: Vec<(i32, bool)>,
    sessions: Vec<&'static str>,
}

#[derive(Clone, Default)]
struct SharedRecorder(Arc<Mutex<Recorder>>);

impl ChangeListener for SharedRecorder {
    fn on_points_changed(&mut self, points: i32, from_user: bool) {
        self.0.lock().unwrap().changes.push((points, from_user));
    }

    fn on_tracking_started(&mut self) {
        self.0.lock().unwrap().sessions.push("start");
    }

    fn on_tracking_ended(&mut self) {
        self.0.lock().unwrap().sessions.push("end");
    }
}

fn ring_with_recorder() -> (SeekRing, SharedRecorder) {
    let config = SeekRingConfig::builder().build();
    let mut ring = SeekRing::new(config).unwrap();
    let recorder = SharedRecorder::default();
    ring.set_listener(Box::new(recorder.clone()));
    (ring, recorder)
}

#[test]
fn drag_positions_flow_through_to_notifications() {
    let (mut ring, recorder) = ring_with_recorder();

    ring.begin_tracking();
    // Right edge of a 300x300 surface: a quarter turn, raw 25, snapped 20.
    ring.drag_to(270.0, 150.0, 300, 300);
    // Bottom edge: half a turn, raw 50.
    ring.drag_to(150.0, 270.0, 300, 300);
    ring.end_tracking();

    let state = recorder.0.lock().unwrap();
    assert_eq!(state.changes, vec![(20, true), (50, true)]);
    assert_eq!(state.sessions, vec!["start", "end"]);
    drop(state);
    assert_eq!(ring.points(), 50);
}

#[test]
fn counter_clockwise_drag_mirrors_the_value() {
    let config = SeekRingConfig::builder().clockwise(false).build();
    let mut ring = SeekRing::new(config).unwrap();

    ring.begin_tracking();
    // The left edge is a quarter turn when the ring runs counter-clockwise.
    ring.drag_to(30.0, 150.0, 300, 300);
    ring.end_tracking();

    assert_eq!(ring.points(), 20);
}

#[test]
fn programmatic_updates_notify_without_from_user() {
    let (mut ring, recorder) = ring_with_recorder();
    ring.set_points(47);
    assert_eq!(ring.points(), 40);
    let state = recorder.0.lock().unwrap();
    assert_eq!(state.changes, vec![(40, false)]);
    assert!(state.sessions.is_empty());
}

#[test]
fn disabling_mid_drag_still_closes_the_session() {
    let (mut ring, recorder) = ring_with_recorder();

    ring.begin_tracking();
    ring.drag_to(270.0, 150.0, 300, 300);
    ring.set_enabled(false);
    ring.end_tracking();

    let state = recorder.0.lock().unwrap();
    assert_eq!(state.sessions, vec!["start", "end"]);
    assert_eq!(state.changes, vec![(20, true)]);
}

#[test]
fn guard_rearms_for_every_new_drag_session() {
    let (mut ring, recorder) = ring_with_recorder();

    ring.begin_tracking();
    ring.drag_to(150.0, 270.0, 300, 300); // half turn, 50
    ring.end_tracking();

    // New session starting just left of the top lands near raw max; it must
    // not register as a jump to the ceiling.
    ring.begin_tracking();
    ring.drag_to(140.0, 30.0, 300, 300);
    ring.end_tracking();

    assert_eq!(ring.points(), 50);
    let state = recorder.0.lock().unwrap();
    assert_eq!(state.changes, vec![(50, true)]);
}
