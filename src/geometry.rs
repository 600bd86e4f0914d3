//! Angle/progress conversion for the ring.
//!
//! Angle 0 sits at the top of the ring and grows clockwise (mirrored when the
//! control is configured counter-clockwise). All functions here are pure;
//! session state lives in [`crate::tracker`].

/// Converts a pointer position into a compass-style angle in `[0, 360)`.
///
/// `(cx, cy)` is the ring center in the same coordinate space as `(x, y)`.
/// The point exactly at the center is accepted: `atan2(0, 0)` is 0 under
/// IEEE semantics, which maps to the top of the ring.
pub fn point_to_angle(x: f32, y: f32, cx: f32, cy: f32, clockwise: bool) -> f32 {
    let dx = if clockwise { x - cx } else { cx - x };
    let dy = y - cy;
    let angle = dy.atan2(dx).to_degrees() + 90.0;
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Linear map from an angle in degrees to an unclamped raw progress value.
///
/// Defined as 0 for `max <= 0` so a degenerate range cannot produce NaN.
pub fn angle_to_raw_progress(angle_degrees: f32, max: i32) -> f32 {
    if max <= 0 {
        return 0.0;
    }
    angle_degrees * (max as f32 / 360.0)
}

/// Arc sweep in degrees for a committed points value.
pub fn sweep_degrees(points: i32, max: i32) -> f32 {
    if max <= 0 {
        return 0.0;
    }
    points as f32 / (max as f32 / 360.0)
}

/// Offset of the indicator knob from the ring center for a given sweep,
/// with sweep 0 at the top of the ring.
pub fn indicator_position(sweep_degrees: f32, radius: f32) -> (f32, f32) {
    let knob_angle = (sweep_degrees + 90.0).to_radians();
    (-radius * knob_angle.cos(), -radius * knob_angle.sin())
}
