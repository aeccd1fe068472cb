//! Headless spacecraft scene runner
//!
//! Loads an optional config file (TOML or RON) given as the first argument,
//! builds the scene with logging renderables and runs the frame loop. Set
//! `RUST_LOG=trace` to see every draw.

use spacecraft_engine::core::ConfigError;
use spacecraft_engine::foundation::logging;
use spacecraft_engine::prelude::*;

/// Seconds between status lines
const STATUS_INTERVAL: f32 = 1.0;

/// Logs where the robots are and whether the dancer is awake
struct SpacecraftApp {
    since_status: f32,
    was_dancing: bool,
}

impl SpacecraftApp {
    fn new() -> Self {
        Self {
            since_status: 0.0,
            was_dancing: false,
        }
    }

    fn report(&self, engine: &Engine) -> Result<(), AppError> {
        let scene = engine.scene();
        let patrol = scene
            .patrol_position()
            .map_err(|e| AppError::Custom(e.to_string()))?;
        let dancer = scene
            .dancer_position()
            .map_err(|e| AppError::Custom(e.to_string()))?;
        let distance = scene.last_proximity().map_or(f32::NAN, |link| link.distance);

        log::info!(
            "t={:.1}s patrol=({:.2}, {:.2}, {:.2}) waypoint={} {:?} dancer=({:.2}, {:.2}, {:.2}) distance={:.2} dancing={}",
            engine.timer().total_time(),
            patrol.x,
            patrol.y,
            patrol.z,
            scene.patrol().waypoint_index(),
            scene.patrol().mode(),
            dancer.x,
            dancer.y,
            dancer.z,
            distance,
            scene.is_dancing()
        );
        Ok(())
    }
}

impl Application for SpacecraftApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!(
            "Scene ready with {} nodes",
            engine.scene().graph().len()
        );
        self.report(engine)
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        let dancing = engine.scene().is_dancing();
        if dancing != self.was_dancing {
            log::info!("Dancer {}", if dancing { "woke up" } else { "went to sleep" });
            self.was_dancing = dancing;
        }

        self.since_status += delta_time;
        if self.since_status >= STATUS_INTERVAL {
            self.since_status = 0.0;
            self.report(engine)?;
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!("Cleaning up after {} frames", engine.timer().frame_count());
    }
}

/// Load the config at `path`, or the defaults when no path was given
fn load_config(path: Option<&str>) -> Result<ApplicationConfig, ConfigError> {
    match path {
        Some(path) => ApplicationConfig::load_from_file(path),
        None => Ok(ApplicationConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1);
    let config = load_config(path.as_deref())?;

    // The log level lives in the config, so logging starts only now
    logging::init_with_level(&config.engine.log_level);
    match &path {
        Some(path) => log::info!("Starting spacecraft scene with configuration from {path}"),
        None => log::info!("Starting spacecraft scene with default configuration"),
    }

    let mut factory = LoggingRenderableFactory;
    let mut engine = Engine::new(&config, &mut factory, Box::new(SystemClock::new()))?;
    let mut app = SpacecraftApp::new();
    engine.run(&mut app)?;

    log::info!("Spacecraft scene exited successfully");
    Ok(())
}
