// ImpactViz - Asteroid Impact Calculator & Animation Engine
// Library root: calculation engine, animation engine and the desktop entry point

pub mod animation_clock;
pub mod config;
pub mod error;
pub mod impact_calculator;
pub mod particles;
pub mod physics_engine;
pub mod render;
pub mod rings;
pub mod scene;
pub mod state_manager;

pub use config::AnimationConfig;
pub use error::{ConfigError, ImpactError};
pub use impact_calculator::{
    calculate_all_metrics, generate_insights, ImpactInput, ImpactMetrics, ImpactReport, Severity,
};
pub use physics_engine::TargetMaterial;
pub use render::{DrawSurface, FrameBuffer, RenderCommand};
pub use scene::ImpactSession;
pub use state_manager::{start_animation_loop, AppState};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Unknown level names fall back to info
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global fmt subscriber. Fails if one is already installed.
pub fn init_tracing(level: &str) -> Result<(), ConfigError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use state_manager::{
        calculate_impact, canvas_click, get_animation_status, get_frame, load_metrics,
        restart_animation,
    };
    use std::time::Duration;

    let (config, config_error) = match AnimationConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => (AnimationConfig::default(), Some(e)),
    };
    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("{e}");
    }
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "falling back to default animation config");
    }
    tracing::info!("ImpactViz v{}", env!("CARGO_PKG_VERSION"));

    let app_state = AppState::new(config);

    // Start background render loop
    *app_state.is_running.write() = true;
    start_animation_loop(
        app_state.session.clone(),
        app_state.frame.clone(),
        app_state.is_running.clone(),
        Duration::from_millis(app_state.config.frame_interval_ms),
    );

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            calculate_impact,
            load_metrics,
            get_frame,
            get_animation_status,
            restart_animation,
            canvas_click,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

// =============================================================================
// TESTS
// =============================================================================
