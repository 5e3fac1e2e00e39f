// State Manager - Thread-safe animation session handling
// Holds the active impact session, drives it from a background render loop and exposes desktop commands

use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::AnimationConfig;
use crate::error::{ConfigError, ImpactError};
use crate::impact_calculator::{ImpactInput, ImpactMetrics, ImpactReport};
use crate::render::{FrameBuffer, RenderCommand};
use crate::scene::{AnimationStatus, ImpactSession};

// =============================================================================
// GLOBAL STATE
// =============================================================================

pub struct AppState {
    /// At most one active session; `None` renders nothing
    pub session: Arc<RwLock<Option<ImpactSession>>>,
    /// Last frame published by the render loop
    pub frame: Arc<RwLock<Vec<RenderCommand>>>,
    pub is_running: Arc<RwLock<bool>>,
    pub config: AnimationConfig,
}

impl AppState {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            frame: Arc::new(RwLock::new(Vec::new())),
            is_running: Arc::new(RwLock::new(false)),
            config,
        }
    }

    /// Compute a report and replace the running animation with one for it
    pub fn calculate(
        &self,
        input: &ImpactInput,
        option: Option<i64>,
    ) -> Result<ImpactReport, ImpactError> {
        let report = ImpactReport::compute(input, option)?;
        if let Err(e) = self.start_session(report.metrics.clone()) {
            tracing::warn!(error = %e, "calculated metrics but could not start animation");
        }
        Ok(report)
    }

    pub fn start_session(&self, metrics: ImpactMetrics) -> Result<(), ConfigError> {
        let session = ImpactSession::new(metrics, self.config.clone())?;
        *self.session.write() = Some(session);
        Ok(())
    }

    /// Start a session from a metrics JSON record. A malformed record clears
    /// the current session and returns false.
    pub fn load_metrics_json(&self, json: &str) -> bool {
        let session = ImpactSession::from_json(json, self.config.clone());
        let loaded = session.is_some();
        *self.session.write() = session;
        if !loaded {
            self.frame.write().clear();
        }
        loaded
    }

    /// Returns false when there is nothing to restart
    pub fn restart(&self) -> bool {
        match self.session.write().as_mut() {
            Some(session) => {
                session.reset();
                true
            }
            None => false,
        }
    }

    pub fn click(&self, x: f64, y: f64) -> bool {
        self.session
            .write()
            .as_mut()
            .map(|session| session.click(x, y))
            .unwrap_or(false)
    }

    pub fn latest_frame(&self) -> Vec<RenderCommand> {
        self.frame.read().clone()
    }

    pub fn status(&self) -> Option<AnimationStatus> {
        self.session.read().as_ref().map(|session| session.status())
    }

    /// Advance the session by one frame outside the render loop
    pub fn tick_once(&self) {
        tick_session(&self.session, &self.frame);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

// =============================================================================
// RENDER LOOP (runs in background thread)
// =============================================================================

/// Tick under the session write lock and publish the recorded frame
fn tick_session(session: &RwLock<Option<ImpactSession>>, frame: &RwLock<Vec<RenderCommand>>) {
    let mut buffer = FrameBuffer::new();
    {
        let mut session = session.write();
        if let Some(session) = session.as_mut() {
            session.tick(&mut buffer);
        }
    }
    *frame.write() = buffer.into_commands();
}

pub fn start_animation_loop(
    session: Arc<RwLock<Option<ImpactSession>>>,
    frame: Arc<RwLock<Vec<RenderCommand>>>,
    is_running: Arc<RwLock<bool>>,
    frame_interval: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tracing::info!(interval_ms = frame_interval.as_millis() as u64, "animation loop started");

        loop {
            let start = Instant::now();

            tick_session(&session, &frame);

            // Check if we should stop
            if !*is_running.read() {
                break;
            }

            // Sleep to maintain frame rate
            let elapsed = start.elapsed();
            if elapsed < frame_interval {
                thread::sleep(frame_interval - elapsed);
            }
        }

        tracing::info!("animation loop stopped");
    })
}

// =============================================================================
// TAURI COMMANDS
// =============================================================================

#[cfg(feature = "desktop")]
use tauri::State;

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn calculate_impact(
    state: State<AppState>,
    input: ImpactInput,
    option: Option<i64>,
) -> Result<ImpactReport, String> {
    state.calculate(&input, option).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn load_metrics(state: State<AppState>, metrics_json: String) -> bool {
    state.load_metrics_json(&metrics_json)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn get_frame(state: State<AppState>) -> Vec<RenderCommand> {
    state.latest_frame()
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn get_animation_status(state: State<AppState>) -> Option<AnimationStatus> {
    state.status()
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn restart_animation(state: State<AppState>) -> Result<(), String> {
    if state.restart() {
        Ok(())
    } else {
        Err("No active animation".to_string())
    }
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn canvas_click(state: State<AppState>, x: f64, y: f64) -> bool {
    state.click(x, y)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation_clock::Phase;
    use crate::physics_engine::TargetMaterial;

    fn state() -> AppState {
        AppState::new(AnimationConfig {
            rng_seed: Some(11),
            ..AnimationConfig::default()
        })
    }

    fn input() -> ImpactInput {
        ImpactInput::new(1_000_000.0, 20.0, TargetMaterial::Rock).unwrap()
    }

    #[test]
    fn test_no_session_renders_nothing() {
        let state = state();
        state.tick_once();
        assert!(state.latest_frame().is_empty());
        assert!(state.status().is_none());
        assert!(!state.restart());
        assert!(!state.click(700.0, 20.0));
    }

    #[test]
    fn test_calculate_starts_session() {
        let state = state();
        let report = state.calculate(&input(), Some(3)).unwrap();
        assert!(report.headline.starts_with("Air Blast Radius: "));
        assert_eq!(report.insights.len(), 7);

        state.tick_once();
        assert!(!state.latest_frame().is_empty());
        assert_eq!(state.status().unwrap().frame, 1);
    }

    #[test]
    fn test_calculate_rejects_invalid_input() {
        let state = state();
        let bad = ImpactInput {
            mass_tons: -1.0,
            velocity_kms: 20.0,
            target_material: TargetMaterial::Rock,
        };
        assert!(matches!(
            state.calculate(&bad, None),
            Err(ImpactError::InvalidMass(_))
        ));
        assert!(state.status().is_none());
    }

    #[test]
    fn test_malformed_metrics_clear_session() {
        let state = state();
        state.calculate(&input(), None).unwrap();
        state.tick_once();

        assert!(!state.load_metrics_json("<script>"));
        assert!(state.status().is_none());
        assert!(state.latest_frame().is_empty());
    }

    #[test]
    fn test_restart_between_ticks() {
        let state = state();
        state.calculate(&input(), None).unwrap();
        for _ in 0..120 {
            state.tick_once();
        }
        assert_eq!(state.status().unwrap().phase, Phase::Expanding);

        assert!(state.restart());
        let status = state.status().unwrap();
        assert_eq!(status.frame, 0);
        assert_eq!(status.particle_count, 0);
        assert_eq!(status.phase, Phase::Flight);
    }

    #[test]
    fn test_loop_ticks_until_stopped() {
        let state = state();
        state.calculate(&input(), None).unwrap();
        *state.is_running.write() = true;

        let handle = start_animation_loop(
            state.session.clone(),
            state.frame.clone(),
            state.is_running.clone(),
            Duration::from_millis(1),
        );
        thread::sleep(Duration::from_millis(50));
        *state.is_running.write() = false;
        handle.join().unwrap();

        let frame = state.status().unwrap().frame;
        assert!(frame > 0);
        assert!(!state.latest_frame().is_empty());

        // Stopped loop no longer advances
        thread::sleep(Duration::from_millis(10));
        assert_eq!(state.status().unwrap().frame, frame);
    }
}
