// Scene Composer - One impact animation session
// Owns the clock, particles and ring renderer for a single metrics record and draws each tick

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::animation_clock::{AnimationClock, Phase, TickEvents};
use crate::config::AnimationConfig;
use crate::error::ConfigError;
use crate::impact_calculator::ImpactMetrics;
use crate::particles::{ParticleSystem, Vec2};
use crate::render::{
    Color, DrawSurface, Glow, GradientStop, RenderCommand, Stroke, TextAlign,
};
use crate::rings::{Ring, RingRenderer, RingScale};

const STAR_COUNT: u32 = 15;
const METEOR_START: Vec2 = Vec2 { x: -40.0, y: 20.0 };
const METEOR_RADIUS: f64 = 6.0;

const LEGEND_X: f64 = 8.0;
const LEGEND_Y: f64 = 8.0;
const LEGEND_WIDTH: f64 = 220.0;
const LEGEND_PAD_X: f64 = 10.0;
const LEGEND_PAD_Y: f64 = 8.0;
const LEGEND_LINE_HEIGHT: f64 = 14.0;
const PROGRESS_HEIGHT: f64 = 6.0;

const RESTART_WIDTH: f64 = 150.0;
const RESTART_HEIGHT: f64 = 30.0;
const RESTART_INSET: f64 = 10.0;

// =============================================================================
// LAYOUT
// =============================================================================

/// Fixed canvas geometry for a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub width: f64,
    pub height: f64,
    pub ground_y: f64,
    pub impact: Vec2,
    pub meteor_start: Vec2,
}

impl SceneLayout {
    pub fn new(config: &AnimationConfig) -> Self {
        let ground_y = config.ground_y();
        Self {
            width: config.canvas_width,
            height: config.canvas_height,
            ground_y,
            impact: Vec2::new(config.canvas_width / 2.0, ground_y - 2.0),
            meteor_start: METEOR_START,
        }
    }

    /// Meteor position along the straight approach path
    pub fn meteor_at(&self, progress: f64) -> Vec2 {
        let delta = Vec2::new(
            self.impact.x - self.meteor_start.x,
            self.impact.y - self.meteor_start.y,
        );
        self.meteor_start.add(&delta.scale(progress))
    }
}

/// Restart affordance shown once the run completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartControl {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
}

impl RestartControl {
    pub const LABEL: &'static str = "🔄 Restart Animation";

    /// Top-right corner of a canvas `canvas_width` wide
    pub fn new(canvas_width: f64) -> Self {
        Self {
            x: canvas_width - RESTART_INSET - RESTART_WIDTH,
            y: RESTART_INSET,
            width: RESTART_WIDTH,
            height: RESTART_HEIGHT,
            label: Self::LABEL.to_string(),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    fn draw(&self, surface: &mut impl DrawSurface) {
        surface.submit(RenderCommand::Button {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            label: self.label.clone(),
        });
    }
}

/// Snapshot of a session for status polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationStatus {
    pub frame: u32,
    pub phase: Phase,
    pub expansion: f64,
    pub crater_progress: f64,
    pub particle_count: usize,
    pub complete: bool,
    pub restart: Option<RestartControl>,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct ImpactSession {
    metrics: ImpactMetrics,
    config: AnimationConfig,
    layout: SceneLayout,
    rings: RingRenderer,
    clock: AnimationClock,
    particles: ParticleSystem,
    restart: Option<RestartControl>,
}

impl ImpactSession {
    pub fn new(metrics: ImpactMetrics, config: AnimationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let layout = SceneLayout::new(&config);
        let scale = RingScale::new(&metrics, &config);
        tracing::info!(
            energy_mt = metrics.energy_megatons_tnt,
            severity = %metrics.severity,
            max_effect_km = scale.max_effect_km,
            "impact session started"
        );

        Ok(Self {
            rings: RingRenderer::new(layout.impact, scale),
            clock: AnimationClock::new(&config),
            particles: ParticleSystem::new(config.rng_seed),
            restart: None,
            metrics,
            config,
            layout,
        })
    }

    /// Soft entry point for metrics handed over as JSON: a malformed record
    /// yields no session instead of an error
    pub fn from_json(json: &str, config: AnimationConfig) -> Option<Self> {
        let metrics = match ImpactMetrics::from_json(json) {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed metrics, nothing to animate");
                return None;
            }
        };
        match Self::new(metrics, config) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "invalid animation config, nothing to animate");
                None
            }
        }
    }

    pub fn metrics(&self) -> &ImpactMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn restart_control(&self) -> Option<&RestartControl> {
        self.restart.as_ref()
    }

    pub fn status(&self) -> AnimationStatus {
        AnimationStatus {
            frame: self.clock.frame(),
            phase: self.clock.phase(),
            expansion: self.clock.expansion(),
            crater_progress: self.clock.crater_progress(),
            particle_count: self.particles.len(),
            complete: self.clock.state().is_complete(),
            restart: self.restart.clone(),
        }
    }

    /// Nothing left to move: rings complete, crater formed, particles gone
    pub fn is_settled(&self) -> bool {
        self.clock.state().is_complete()
            && self.clock.crater_progress() >= 1.0
            && self.particles.is_empty()
    }

    /// Back to frame 0: clock, both particle populations and the restart
    /// control are reset together
    pub fn reset(&mut self) {
        self.clock.reset();
        self.particles.clear();
        self.restart = None;
        tracing::info!("impact animation restarted");
    }

    /// Route a canvas click; returns true when it hit the restart control
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        let hit = self
            .restart
            .as_ref()
            .map(|control| control.contains(x, y))
            .unwrap_or(false);
        if hit {
            self.reset();
        }
        hit
    }

    fn crater_radius_px(&self) -> f64 {
        (self.rings.scale().km_to_px(self.metrics.crater_km) * 0.5).max(2.0)
    }

    /// Draw the current frame, then step the clock and fire the bursts and
    /// controls the new frame calls for. The published state therefore always
    /// matches the frame counter.
    pub fn tick(&mut self, surface: &mut impl DrawSurface) -> TickEvents {
        self.render_frame(surface);

        if self.is_settled() {
            return TickEvents::default();
        }

        let events = self.clock.advance();
        if events.exploded {
            self.particles
                .spawn_explosion(self.layout.impact, self.config.explosion_particles);
        }
        if events.crater_started {
            let spawned = self.particles.spawn_crater_ejecta(
                self.layout.impact,
                self.crater_radius_px(),
                self.config.max_crater_particles,
            );
            tracing::debug!(spawned, "crater ejecta burst");
        }
        if events.completed {
            self.restart = Some(RestartControl::new(self.layout.width));
            tracing::info!(frame = self.clock.frame(), "impact animation complete");
        }
        events
    }

    /// Physics step and draw calls for the frame the clock is on
    fn render_frame(&mut self, surface: &mut impl DrawSurface) {
        self.draw_background(surface);

        if self.clock.in_flight() {
            self.draw_meteor(self.clock.flight_progress(), surface);
        } else {
            let expansion = self.clock.expansion();

            let rings = Ring::all(&self.metrics);
            self.rings.draw_rings(&rings, expansion, surface);

            self.particles.update_explosion();
            self.particles.draw_explosion(surface);

            let crater_progress = self.clock.crater_progress();
            if crater_progress > 0.0 {
                self.draw_crater(crater_progress, surface);
                self.particles.update_ejecta();
                self.particles.draw_ejecta(surface);
            }

            self.rings.draw_ring_labels(&rings, expansion, surface);
            self.draw_legend(expansion, surface);
        }

        if let Some(control) = &self.restart {
            control.draw(surface);
        }
    }

    // =========================================================================
    // DRAWING
    // =========================================================================

    fn draw_background(&self, surface: &mut impl DrawSurface) {
        let SceneLayout {
            width,
            height,
            ground_y,
            ..
        } = self.layout;

        surface.submit(RenderCommand::Clear { color: Color::SPACE });

        // Fixed pseudo-random star field in the upper half
        let star_band = (height * 0.5).floor().max(1.0);
        for i in 0..STAR_COUNT {
            let i = i as f64;
            surface.submit(RenderCommand::FillRect {
                x: (i * 83.0) % width,
                y: (i * 57.0) % star_band,
                width: 1.0,
                height: 1.0,
                color: Color::STAR,
            });
        }

        surface.submit(RenderCommand::FillRect {
            x: 0.0,
            y: ground_y,
            width,
            height: height - ground_y,
            color: Color::GROUND,
        });
    }

    fn draw_meteor(&self, progress: f64, surface: &mut impl DrawSurface) {
        let at = self.layout.meteor_at(progress);

        let trail = Color::rgba(255, 200, 120, 0.7);
        surface.submit(RenderCommand::Line {
            x1: at.x - 20.0,
            y1: at.y - 12.0,
            x2: at.x,
            y2: at.y,
            stroke: Stroke::new(trail, 2.0),
            glow: Some(Glow::new(Color::rgba(255, 200, 120, 0.8), 8.0)),
        });

        surface.submit(RenderCommand::RadialGradient {
            x: at.x,
            y: at.y,
            inner_radius: 1.0,
            radius: METEOR_RADIUS,
            stops: vec![
                GradientStop::new(0.0, Color::rgb(0xff, 0xf5, 0xe6)),
                GradientStop::new(0.3, Color::rgb(0xff, 0xd2, 0x7a)),
                GradientStop::new(0.7, Color::rgb(0xff, 0x8c, 0x00)),
                GradientStop::new(1.0, Color::rgb(0xff, 0x7b, 0x00)),
            ],
        });

        // Hot core highlight
        surface.submit(RenderCommand::Circle {
            x: at.x - 1.0,
            y: at.y - 1.0,
            radius: 2.0,
            fill: Some(Color::WHITE.with_alpha(0.3)),
            stroke: None,
            glow: None,
        });
    }

    fn draw_crater(&self, progress: f64, surface: &mut impl DrawSurface) {
        let center = self.layout.impact;
        let radius = self.crater_radius_px() * progress;

        surface.submit(RenderCommand::RadialGradient {
            x: center.x,
            y: center.y,
            inner_radius: 0.0,
            radius,
            stops: vec![
                GradientStop::new(0.0, Color::PURPLE.with_alpha(0.6)),
                GradientStop::new(0.7, Color::PURPLE.with_alpha(0.3)),
                GradientStop::new(1.0, Color::PURPLE.with_alpha(0.1)),
            ],
        });

        surface.submit(RenderCommand::Circle {
            x: center.x,
            y: center.y,
            radius,
            fill: None,
            stroke: Some(Stroke::new(Color::SADDLE_BROWN.with_alpha(0.9), 3.0)),
            glow: Some(Glow::new(Color::SADDLE_BROWN.with_alpha(0.5), 4.0)),
        });

        if progress > 0.5 {
            surface.submit(RenderCommand::Circle {
                x: center.x,
                y: center.y,
                radius: radius * 0.6,
                fill: None,
                stroke: Some(Stroke::new(Color::SIENNA.with_alpha(0.6), 1.0)),
                glow: None,
            });
        }
    }

    fn draw_legend(&self, expansion: f64, surface: &mut impl DrawSurface) {
        let lines = [
            format!("Energy: {} Mt TNT", self.metrics.energy_megatons_tnt),
            format!("Severity: {}", self.metrics.severity),
            format!("Animation: {}%", (expansion * 100.0).round()),
        ];
        let box_height = LEGEND_PAD_Y * 2.0 + LEGEND_LINE_HEIGHT * lines.len() as f64 + 20.0;

        surface.submit(RenderCommand::RoundedRect {
            x: LEGEND_X,
            y: LEGEND_Y,
            width: LEGEND_WIDTH,
            height: box_height,
            radius: 8.0,
            fill: Color::BLACK.with_alpha(0.4),
            stroke: Stroke::new(Color::WHITE.with_alpha(0.2), 1.0),
        });

        let text_x = LEGEND_X + LEGEND_PAD_X;
        for (i, line) in lines.iter().enumerate() {
            surface.submit(RenderCommand::Text {
                x: text_x,
                y: LEGEND_Y + LEGEND_PAD_Y + i as f64 * LEGEND_LINE_HEIGHT,
                text: line.clone(),
                font_px: 12.0,
                color: Color::WHITE,
                align: TextAlign::Left,
                outline: None,
            });
        }

        // Progress bar: track, gradient fill, border
        let bar_y = LEGEND_Y + LEGEND_PAD_Y + lines.len() as f64 * LEGEND_LINE_HEIGHT + 5.0;
        let bar_width = LEGEND_WIDTH - LEGEND_PAD_X * 2.0;
        surface.submit(RenderCommand::FillRect {
            x: text_x,
            y: bar_y,
            width: bar_width,
            height: PROGRESS_HEIGHT,
            color: Color::WHITE.with_alpha(0.2),
        });

        let glow = (expansion > 0.9).then(|| {
            let pulse = (expansion * PI * 10.0).sin() * 0.1 + 0.9;
            Glow::new(Color::rgb(0x4e, 0xcd, 0xc4), 8.0 * pulse)
        });
        surface.submit(RenderCommand::LinearGradientBar {
            x: text_x,
            y: bar_y,
            width: expansion * bar_width,
            height: PROGRESS_HEIGHT,
            stops: vec![
                GradientStop::new(0.0, Color::rgb(0xff, 0x6b, 0x6b)),
                GradientStop::new(0.5, Color::rgb(0x4e, 0xcd, 0xc4)),
                GradientStop::new(1.0, Color::rgb(0x45, 0xb7, 0xd1)),
            ],
            glow,
        });

        surface.submit(RenderCommand::StrokeRect {
            x: text_x,
            y: bar_y,
            width: bar_width,
            height: PROGRESS_HEIGHT,
            stroke: Stroke::new(Color::WHITE.with_alpha(0.4), 1.0),
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================
