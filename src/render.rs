// Render Surface - Platform-agnostic drawing commands
// The scene records commands; any frontend (webview canvas, TUI, tests) replays them

use serde::{Deserialize, Serialize};

// =============================================================================
// COLORS
// =============================================================================

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Color with a fractional alpha in 0..=1
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self::new(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Channels given as reals (e.g. randomized shades), clamped to 0..=255
    pub fn from_channels(r: f64, g: f64, b: f64, alpha: f64) -> Self {
        let channel = |c: f64| c.clamp(0.0, 255.0).round() as u8;
        Self::rgba(channel(r), channel(g), channel(b), alpha)
    }

    /// Same channels with a fractional alpha in 0..=1
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self::rgba(self.r, self.g, self.b, alpha)
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// CSS `rgba()` string for canvas frontends
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.alpha())
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    // Scene palette
    pub const SPACE: Self = Self::rgb(0x0f, 0x11, 0x30);
    pub const GROUND: Self = Self::rgb(0x1a, 0x1d, 0x3f);
    pub const STAR: Self = Self::new(255, 255, 255, 64);
    pub const PURPLE: Self = Self::rgb(93, 59, 141);
    pub const ROYAL_BLUE: Self = Self::rgb(65, 105, 225);
    pub const CRIMSON: Self = Self::rgb(220, 20, 60);
    pub const DARK_ORANGE: Self = Self::rgb(255, 140, 0);
    pub const SADDLE_BROWN: Self = Self::rgb(139, 69, 19);
    pub const SIENNA: Self = Self::rgb(160, 82, 45);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

/// Soft shadow/glow around a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    pub color: Color,
    pub blur: f64,
}

impl Glow {
    pub fn new(color: Color, blur: f64) -> Self {
        Self { color, blur }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64, // 0..=1
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
}

// =============================================================================
// RENDER COMMANDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the whole surface
    Clear { color: Color },

    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },

    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stroke: Stroke,
    },

    /// Rounded box (legend panel)
    RoundedRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Color,
        stroke: Stroke,
    },

    Circle {
        x: f64,
        y: f64,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        glow: Option<Glow>,
    },

    /// Filled circle shaded from `inner_radius` out to `radius`
    RadialGradient {
        x: f64,
        y: f64,
        inner_radius: f64,
        radius: f64,
        stops: Vec<GradientStop>,
    },

    /// Horizontal gradient bar (progress fill)
    LinearGradientBar {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stops: Vec<GradientStop>,
        glow: Option<Glow>,
    },

    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
        glow: Option<Glow>,
    },

    /// Text anchored at its vertical middle
    Text {
        x: f64,
        y: f64,
        text: String,
        font_px: f64,
        color: Color,
        align: TextAlign,
        outline: Option<Stroke>,
    },

    /// Clickable control drawn over the canvas
    Button {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: String,
    },
}

// =============================================================================
// SURFACES
// =============================================================================

/// Fixed-size 2D surface the scene draws onto
pub trait DrawSurface {
    fn submit(&mut self, command: RenderCommand);

    /// Rendered width of `text` in pixels at the given font size
    fn measure_text(&self, text: &str, font_px: f64) -> f64;
}

/// Average glyph advance as a fraction of font size (system-ui)
const GLYPH_ADVANCE: f64 = 0.55;

/// Records one frame of commands for later replay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameBuffer {
    commands: Vec<RenderCommand>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<RenderCommand> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text drawn this frame, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for FrameBuffer {
    fn submit(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * GLYPH_ADVANCE
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_alpha_conversion() {
        let c = Color::rgba(255, 140, 0, 0.12);
        assert_eq!(c.a, 31);
        assert_eq!(Color::rgba(0, 0, 0, 2.0).a, 255);
        assert_eq!(Color::rgb(1, 2, 3).to_css(), "rgba(1,2,3,1.000)");
        assert_eq!(
            Color::SADDLE_BROWN.with_alpha(0.9),
            Color::rgba(139, 69, 19, 0.9)
        );
        assert_eq!(Color::BLACK.with_alpha(0.4).a, 102);
    }

    #[test]
    fn test_channels_are_clamped() {
        let c = Color::from_channels(300.0, -4.0, 19.6, 0.9);
        assert_eq!((c.r, c.g, c.b), (255, 0, 20));
    }

    #[test]
    fn test_frame_buffer_records_text() {
        let mut frame = FrameBuffer::new();
        frame.submit(RenderCommand::Clear { color: Color::SPACE });
        frame.submit(RenderCommand::Text {
            x: 0.0,
            y: 0.0,
            text: "Severity: High".to_string(),
            font_px: 12.0,
            color: Color::WHITE,
            align: TextAlign::Left,
            outline: None,
        });
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.texts(), vec!["Severity: High"]);

        let wide = frame.measure_text("Thermal: 10.0 km (50%)", 11.0);
        let narrow = frame.measure_text("Air", 11.0);
        assert!(wide > narrow);
    }
}
