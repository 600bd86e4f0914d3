// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod geometry;
pub mod tracker;

pub use tracker::{BoundaryLock, ProgressTracker};

// External crate imports
use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rusttype::{point, Font, PositionedGlyph, Scale};
use thiserror::Error;
use tracing::{debug, warn};

// Standard library imports
use std::sync::mpsc::Receiver;
use std::time::Instant;

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color representation for ring elements
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Configuration rejected before any window or tracker is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("step must be positive, got {0}")]
    StepNotPositive(i32),
    #[error("min {min} must be less than max {max}")]
    EmptyRange { min: i32, max: i32 },
    #[error("window dimensions must be nonzero")]
    ZeroWindow,
    #[error("font data could not be parsed")]
    UnreadableFont,
}

/// Change notifications delivered to the host application.
///
/// At most one listener is registered at a time; `from_user` is false for
/// programmatic updates via [`SeekRing::set_points`] or a command channel.
pub trait ChangeListener {
    fn on_points_changed(&mut self, points: i32, from_user: bool);
    fn on_tracking_started(&mut self);
    fn on_tracking_ended(&mut self);
}

/// Command enum for type-safe updates while the window is running
#[derive(Debug, Clone)]
pub enum SeekRingCommand {
    SetPoints(i32),
    SetEnabled(bool),
    SetClockwise(bool),
}

#[derive(Debug, Clone, Builder)]
pub struct SeekRingConfig {
    #[builder(default = "".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 300)]
    pub window_width: usize,
    #[builder(default = 300)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Value range
    #[builder(default = 0)]
    pub min: i32,
    #[builder(default = 100)]
    pub max: i32,
    #[builder(default = 10)]
    pub step: i32,
    #[builder(default = 0)]
    pub points: i32,
    #[builder(default = true)]
    pub clockwise: bool,
    #[builder(default = true)]
    pub enabled: bool,

    // Ring geometry
    #[builder(default = 30)]
    pub ring_margin: i32,
    #[builder(default = 12.0)]
    pub ring_width: f32,
    #[builder(default = 12.0)]
    pub progress_width: f32,
    #[builder(default = 14.0)]
    pub indicator_radius: f32,

    // Label
    #[builder(default = 72.0)]
    pub text_size: f32,

    // Colors
    #[builder(default = Color::new(0xf2, 0xf2, 0xf2))]
    pub background_color: Color,
    #[builder(default = Color::new(0xd5, 0xd5, 0xd5))]
    pub ring_color: Color,
    #[builder(default = Color::new(0x00, 0x7a, 0xcc))]
    pub progress_color: Color,
    #[builder(default = Color::new(0x20, 0x20, 0x20))]
    pub text_color: Color,
    #[builder(default = Color::new(0x00, 0x7a, 0xcc))]
    pub indicator_color: Color,
    #[builder(default = Color::new(0x00, 0x4a, 0x7c))]
    pub indicator_pressed_color: Color,

    // Font configuration; the host supplies the glyph data. Without a font
    // the ring renders with no numeric label.
    pub font_data: Option<&'static [u8]>,
}

impl SeekRingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step <= 0 {
            return Err(ConfigError::StepNotPositive(self.step));
        }
        if self.min >= self.max {
            return Err(ConfigError::EmptyRange {
                min: self.min,
                max: self.max,
            });
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if (self.max - self.min) % self.step != 0 {
            warn!(
                min = self.min,
                max = self.max,
                step = self.step,
                "step does not evenly partition the range, snapping will be uneven"
            );
        }
        Ok(())
    }
}

/// Main seek ring struct - the primary public interface
pub struct SeekRing {
    config: SeekRingConfig,
    tracker: ProgressTracker,
    listener: Option<Box<dyn ChangeListener>>,
    font: Option<Font<'static>>,
}

impl SeekRing {
    pub fn new(config: SeekRingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        // Parse the font once up front; a malformed font fails construction
        // instead of panicking at draw time.
        let font = match config.font_data {
            Some(data) => {
                Some(Font::try_from_vec(data.to_vec()).ok_or(ConfigError::UnreadableFont)?)
            }
            None => None,
        };
        let tracker = ProgressTracker::new(config.min, config.max, config.step, config.points);
        Ok(Self {
            config,
            tracker,
            listener: None,
            font,
        })
    }

    /// Registers the change listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listener = Some(listener);
    }

    pub fn points(&self) -> i32 {
        self.tracker.points()
    }

    /// Programmatic value update: clamped and snapped to the step, notified
    /// with `from_user = false`.
    pub fn set_points(&mut self, points: i32) {
        let committed = self.tracker.set_points(points);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_points_changed(committed, false);
        }
    }

    pub fn min(&self) -> i32 {
        self.config.min
    }

    pub fn max(&self) -> i32 {
        self.config.max
    }

    pub fn step(&self) -> i32 {
        self.config.step
    }

    pub fn is_clockwise(&self) -> bool {
        self.config.clockwise
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_clockwise(&mut self, clockwise: bool) {
        self.config.clockwise = clockwise;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Reconfigures the value range and step, re-clamping the current value.
    pub fn set_range(&mut self, min: i32, max: i32, step: i32) -> Result<(), ConfigError> {
        let current = self.tracker.points();
        let mut candidate = self.config.clone();
        candidate.min = min;
        candidate.max = max;
        candidate.step = step;
        candidate.validate()?;
        self.config = candidate;
        self.tracker = ProgressTracker::new(min, max, step, current);
        Ok(())
    }

    pub fn show(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<SeekRingCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    // ------------------------------------------------------------------
    // Input handling (shared by the window loop and the tests)
    // ------------------------------------------------------------------

    /// Feeds one drag position, in framebuffer coordinates, through the
    /// converter and tracker.
    pub fn drag_to(&mut self, x: f32, y: f32, fb_width: usize, fb_height: usize) {
        if !self.config.enabled {
            return;
        }
        let (cx, cy) = (fb_width as f32 / 2.0, fb_height as f32 / 2.0);
        let angle = geometry::point_to_angle(x, y, cx, cy, self.config.clockwise);
        let raw = geometry::angle_to_raw_progress(angle, self.config.max);
        if let Some(points) = self.tracker.sample(raw) {
            if let Some(listener) = self.listener.as_mut() {
                listener.on_points_changed(points, true);
            }
        }
    }

    pub fn begin_tracking(&mut self) {
        if !self.config.enabled {
            return;
        }
        self.tracker.begin_session();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_tracking_started();
        }
    }

    /// Ends the drag session. Not gated on `enabled`: a widget disabled
    /// mid-drag still has an open session to close.
    pub fn end_tracking(&mut self) {
        self.tracker.end_session();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_tracking_ended();
        }
    }

    fn apply_command(&mut self, command: SeekRingCommand) {
        debug!(?command, "applying command");
        match command {
            SeekRingCommand::SetPoints(points) => self.set_points(points),
            SeekRingCommand::SetEnabled(enabled) => self.set_enabled(enabled),
            SeekRingCommand::SetClockwise(clockwise) => self.set_clockwise(clockwise),
        }
    }

    fn run_window(
        &mut self,
        receiver: Option<Receiver<SeekRingCommand>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let title = self.config.title.clone();
        let logical_width = self.config.window_width;
        let logical_height = self.config.window_height;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&title)
            .with_inner_size(LogicalSize::new(
                logical_width as f64,
                logical_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let target_fps = self.config.max_framerate;
        let frame_duration = std::time::Duration::from_secs_f64(1.0 / target_fps);
        let mut last_frame = Instant::now();

        let mut cursor = (0.0f32, 0.0f32);
        let mut dragging = false;

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = (position.x as f32, position.y as f32);
                        if dragging {
                            self.drag_to(cursor.0, cursor.1, fb_width, fb_height);
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            match state {
                                ElementState::Pressed if self.config.enabled => {
                                    dragging = true;
                                    self.begin_tracking();
                                    self.drag_to(cursor.0, cursor.1, fb_width, fb_height);
                                }
                                ElementState::Released if dragging => {
                                    dragging = false;
                                    self.end_tracking();
                                }
                                _ => {}
                            }
                        }
                    }
                    WindowEvent::Touch(touch) => {
                        let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                        match touch.phase {
                            TouchPhase::Started if self.config.enabled => {
                                dragging = true;
                                self.begin_tracking();
                                self.drag_to(x, y, fb_width, fb_height);
                            }
                            TouchPhase::Moved => {
                                self.drag_to(x, y, fb_width, fb_height);
                            }
                            TouchPhase::Ended | TouchPhase::Cancelled if dragging => {
                                dragging = false;
                                self.end_tracking();
                            }
                            _ => {}
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            while let Ok(command) = receiver.try_recv() {
                                self.apply_command(command);
                            }
                        }

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        let scene =
                            build_scene(&self.config, fb_width, fb_height, self.tracker.points(), dragging);
                        scene.render(&mut canvas, self.font.as_ref());
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug)]
enum DrawCommand {
    Clear(Color),
    /// Full circular track.
    Ring {
        cx: i32,
        cy: i32,
        r: i32,
        width: f32,
        color: Color,
    },
    /// Partial arc from the top of the ring, mirrored when not clockwise.
    ProgressArc {
        cx: i32,
        cy: i32,
        r: i32,
        width: f32,
        sweep_degrees: f32,
        clockwise: bool,
        color: Color,
    },
    /// Centered numeric label.
    Label {
        cx: i32,
        cy: i32,
        text: String,
        font_size: f32,
        color: Color,
    },
    /// The draggable indicator knob.
    Knob {
        cx: i32,
        cy: i32,
        radius: f32,
        color: Color,
    },
}

struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn render(&self, canvas: &mut Canvas, font: Option<&Font<'static>>) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => {
                    canvas.clear(color.as_tuple());
                }
                DrawCommand::Ring {
                    cx,
                    cy,
                    r,
                    width,
                    color,
                } => {
                    render_ring(canvas, *cx, *cy, *r, *width, 360.0, true, color.as_tuple());
                }
                DrawCommand::ProgressArc {
                    cx,
                    cy,
                    r,
                    width,
                    sweep_degrees,
                    clockwise,
                    color,
                } => {
                    render_ring(
                        canvas,
                        *cx,
                        *cy,
                        *r,
                        *width,
                        *sweep_degrees,
                        *clockwise,
                        color.as_tuple(),
                    );
                }
                DrawCommand::Label {
                    cx,
                    cy,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = font {
                        draw_text_centered(
                            canvas,
                            *cx,
                            *cy,
                            text,
                            font,
                            Scale::uniform(*font_size),
                            color.as_tuple(),
                        );
                    }
                }
                DrawCommand::Knob {
                    cx,
                    cy,
                    radius,
                    color,
                } => {
                    draw_disc(canvas, *cx, *cy, *radius, color.as_tuple());
                }
            }
        }
    }
}

/// Builds the frame's draw list from the committed points value. Layout
/// derives from the framebuffer dimensions, the same coordinate space the
/// input path samples in.
fn build_scene(
    config: &SeekRingConfig,
    fb_width: usize,
    fb_height: usize,
    points: i32,
    dragging: bool,
) -> Scene {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(config.background_color));

    let cx = fb_width as i32 / 2;
    let cy = fb_height as i32 / 2;
    let r = (fb_width.min(fb_height) as i32) / 2 - config.ring_margin;

    scene.add_command(DrawCommand::Ring {
        cx,
        cy,
        r,
        width: config.ring_width,
        color: config.ring_color,
    });

    let sweep = geometry::sweep_degrees(points, config.max);
    scene.add_command(DrawCommand::ProgressArc {
        cx,
        cy,
        r,
        width: config.progress_width,
        sweep_degrees: sweep,
        clockwise: config.clockwise,
        color: config.progress_color,
    });

    scene.add_command(DrawCommand::Label {
        cx,
        cy,
        text: points.to_string(),
        font_size: config.text_size,
        color: config.text_color,
    });

    // Indicator only participates while the control is enabled.
    if config.enabled {
        let (ox, oy) = geometry::indicator_position(sweep, r as f32);
        let ox = if config.clockwise { ox } else { -ox };
        scene.add_command(DrawCommand::Knob {
            cx: cx + ox.round() as i32,
            cy: cy + oy.round() as i32,
            radius: config.indicator_radius,
            color: if dragging {
                config.indicator_pressed_color
            } else {
                config.indicator_color
            },
        });
    }

    scene
}

// ============================================================================
// CORE DATA TYPES
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn set_pixel(canvas: &mut Canvas, x: i32, y: i32, color: (u8, u8, u8), alpha: f32) {
    if x < 0 || y < 0 || x as usize >= canvas.width || y as usize >= canvas.height {
        return;
    }
    let idx = (y as usize * canvas.width + x as usize) * 4;
    let a = alpha.clamp(0.0, 1.0);
    let src = [color.0 as f32, color.1 as f32, color.2 as f32];
    for c in 0..3 {
        let dst = canvas.frame[idx + c] as f32;
        canvas.frame[idx + c] = (src[c] * a + dst * (1.0 - a)).round() as u8;
    }
    canvas.frame[idx + 3] = 0xff;
}

/// Draws an annular arc starting at the top of the ring.
///
/// `sweep_degrees` of 360 or more fills the whole track. Pixel membership in
/// the arc reuses the same compass-angle convention as the input path, so the
/// drawn sweep and the touch geometry cannot drift apart.
fn render_ring(
    canvas: &mut Canvas,
    cx: i32,
    cy: i32,
    r: i32,
    width: f32,
    sweep_degrees: f32,
    clockwise: bool,
    color: (u8, u8, u8),
) {
    if sweep_degrees <= 0.0 || r <= 0 {
        return;
    }
    let half = width / 2.0;
    let bound = (r as f32 + half).ceil() as i32 + 1;
    for y in (cy - bound)..=(cy + bound) {
        for x in (cx - bound)..=(cx + bound) {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            let dist = (dx * dx + dy * dy).sqrt();
            // Radial coverage with a one-pixel anti-aliased edge.
            let radial = (half + 0.5 - (dist - r as f32).abs()).clamp(0.0, 1.0);
            if radial <= 0.0 {
                continue;
            }
            if sweep_degrees < 360.0 {
                let angle =
                    geometry::point_to_angle(x as f32, y as f32, cx as f32, cy as f32, clockwise);
                if angle > sweep_degrees {
                    continue;
                }
            }
            set_pixel(canvas, x, y, color, radial);
        }
    }
}

fn draw_disc(canvas: &mut Canvas, cx: i32, cy: i32, radius: f32, color: (u8, u8, u8)) {
    let bound = radius.ceil() as i32 + 1;
    for y in -bound..=bound {
        for x in -bound..=bound {
            let dist = ((x * x + y * y) as f32).sqrt();
            let aa = (radius + 0.5 - dist).clamp(0.0, 1.0);
            if aa > 0.0 {
                set_pixel(canvas, cx + x, cy + y, color, aa);
            }
        }
    }
}

fn draw_text_centered(
    canvas: &mut Canvas,
    cx: i32,
    cy: i32,
    text: &str,
    font: &Font,
    scale: Scale,
    color: (u8, u8, u8),
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();

    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    if min_x >= max_x {
        return;
    }

    let offset_x = cx - (max_x - min_x) / 2;
    let offset_y = cy - (max_y - min_y) / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                set_pixel(canvas, px, py, color, v);
            });
        }
    }
}
