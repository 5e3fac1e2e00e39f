// Animation Configuration
// Timing and sizing constants for the impact animation, overridable from the environment

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub canvas_width: f64,  // px
    pub canvas_height: f64, // px
    /// Frames spent on the meteor approach
    pub travel_frames: u32,
    /// Frames for rings to reach full size after impact
    pub expansion_frames: u32,
    /// Frames after impact before the crater starts forming
    pub crater_start_frames: u32,
    pub crater_formation_frames: u32,
    pub explosion_particles: usize,
    pub max_crater_particles: usize,
    /// Largest ring as a fraction of min(width, ground line)
    pub visual_radius_fraction: f64,
    pub frame_interval_ms: u64, // ~60 FPS
    /// Fixed seed for reproducible particle bursts
    pub rng_seed: Option<u64>,
    pub log_level: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 450.0,
            travel_frames: 90,
            expansion_frames: 90,
            crater_start_frames: 90,
            crater_formation_frames: 60,
            explosion_particles: 40,
            max_crater_particles: 120,
            visual_radius_fraction: 0.45,
            frame_interval_ms: 16,
            rng_seed: None,
            log_level: "info".to_string(),
        }
    }
}

fn read_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(None),
    }
}

impl AnimationConfig {
    /// Defaults overridden by `IMPACT_*` variables (a `.env` file is honored)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        if let Some(v) = read_var("IMPACT_CANVAS_WIDTH")? {
            config.canvas_width = v;
        }
        if let Some(v) = read_var("IMPACT_CANVAS_HEIGHT")? {
            config.canvas_height = v;
        }
        if let Some(v) = read_var("IMPACT_TRAVEL_FRAMES")? {
            config.travel_frames = v;
        }
        if let Some(v) = read_var("IMPACT_EXPANSION_FRAMES")? {
            config.expansion_frames = v;
        }
        if let Some(v) = read_var("IMPACT_CRATER_START_FRAMES")? {
            config.crater_start_frames = v;
        }
        if let Some(v) = read_var("IMPACT_CRATER_FORMATION_FRAMES")? {
            config.crater_formation_frames = v;
        }
        if let Some(v) = read_var("IMPACT_EXPLOSION_PARTICLES")? {
            config.explosion_particles = v;
        }
        if let Some(v) = read_var("IMPACT_MAX_CRATER_PARTICLES")? {
            config.max_crater_particles = v;
        }
        if let Some(v) = read_var("IMPACT_FRAME_INTERVAL_MS")? {
            config.frame_interval_ms = v;
        }
        if let Some(v) = read_var("IMPACT_RNG_SEED")? {
            config.rng_seed = Some(v);
        }
        if let Some(v) = read_var::<String>("IMPACT_LOG")? {
            config.log_level = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.canvas_width.is_finite() && self.canvas_width > 0.0) {
            return Err(ConfigError::Inconsistent(format!(
                "canvas width must be positive, got {}",
                self.canvas_width
            )));
        }
        if !(self.canvas_height.is_finite() && self.canvas_height > 0.0) {
            return Err(ConfigError::Inconsistent(format!(
                "canvas height must be positive, got {}",
                self.canvas_height
            )));
        }
        if self.travel_frames == 0
            || self.expansion_frames == 0
            || self.crater_formation_frames == 0
        {
            return Err(ConfigError::Inconsistent(
                "travel, expansion and crater formation frame counts must be non-zero".to_string(),
            ));
        }
        // The crater has to start before the run is declared complete
        if self.crater_start_frames > self.expansion_frames {
            return Err(ConfigError::Inconsistent(format!(
                "crater start ({} frames) is after expansion ends ({} frames)",
                self.crater_start_frames, self.expansion_frames
            )));
        }
        if !(self.visual_radius_fraction > 0.0 && self.visual_radius_fraction <= 1.0) {
            return Err(ConfigError::Inconsistent(format!(
                "visual radius fraction must be in (0, 1], got {}",
                self.visual_radius_fraction
            )));
        }
        Ok(())
    }

    /// Y coordinate of the ground line
    pub fn ground_y(&self) -> f64 {
        (self.canvas_height * 0.75).round()
    }
}

// =============================================================================
// TESTS
// =============================================================================
