//! Interactive demo: drag the indicator around the ring to set a value.
//!
//! The label font is not bundled; pass a .ttf/.otf path as the first
//! argument or via SEEKRING_FONT.

use seekring::{ChangeListener, SeekRing, SeekRingConfig};
use std::env;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct LogListener;

impl ChangeListener for LogListener {
    fn on_points_changed(&mut self, points: i32, from_user: bool) {
        info!(points, from_user, "points changed");
    }

    fn on_tracking_started(&mut self) {
        info!("tracking started");
    }

    fn on_tracking_ended(&mut self) {
        info!("tracking ended");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let font_path = env::args()
        .nth(1)
        .or_else(|| env::var("SEEKRING_FONT").ok())
        .ok_or("usage: seekring <font-path> (or set SEEKRING_FONT)")?;
    let font_data: &'static [u8] = Box::leak(fs::read(&font_path)?.into_boxed_slice());

    let config = SeekRingConfig::builder()
        .title("seekring".to_string())
        .min(0)
        .max(100)
        .step(10)
        .points(30)
        .font_data(font_data)
        .build();

    let mut ring = SeekRing::new(config)?;
    ring.set_listener(Box::new(LogListener));

    info!(points = ring.points(), "showing ring");
    ring.show()
}
