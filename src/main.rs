//! Application entry point — poem camera.
//!
//! # Startup sequence
//!
//! 1. Load `.env` so the service credentials can come from a file on the
//!    device.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Initialise logging (console + persistent log file).
//! 4. Read [`Secrets`] from the environment — missing credentials are fatal.
//! 5. Create the image directory.
//! 6. Initialise hardware: camera (with warm-up), shutter button, printer
//!    channel — any failure here is fatal.
//! 7. Build the service clients and the [`Orchestrator`].
//! 8. Serve button presses until the trigger closes, the appliance becomes
//!    unrecoverable, or the operator interrupts.
//!
//! Operator interrupt (ctrl-c) stops the camera best-effort and exits 0;
//! any startup or appliance-level failure exits non-zero.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;

use poem_camera::{
    config::{AppConfig, Secrets, TriggerBackend},
    hal::{Camera, GpioButton, StdinTrigger, StillCamera, TriggerSource},
    pipeline::{Orchestrator, SharedCamera, SharedTrigger},
    poet::ApiPoet,
    printer::DevicePrinter,
    vision::ApiCaptioner,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment file (credentials live here on the device)
    dotenvy::dotenv().ok();

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("warning: failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Logging
    poem_camera::logging::init(std::path::Path::new(&config.storage.log_file));
    log::info!("poem camera starting up");

    // 4. Credentials — absence is a startup error, not a per-run error
    let secrets = Secrets::from_env().context("reading service credentials")?;

    // 5. Image directory
    std::fs::create_dir_all(&config.storage.image_dir)
        .with_context(|| format!("creating image directory {}", config.storage.image_dir))?;

    // 6. Hardware
    let camera: SharedCamera = {
        let mut camera = StillCamera::new(&config.camera.capture_command)
            .context("initialising still camera")?;
        camera.start().context("starting camera")?;
        Arc::new(Mutex::new(camera))
    };
    tokio::time::sleep(Duration::from_secs_f64(config.camera.warmup_secs)).await;
    log::info!("camera started and warmed up");

    let trigger: SharedTrigger = match config.trigger.backend {
        TriggerBackend::Gpio => {
            let button = GpioButton::new(
                config.trigger.gpio_line,
                Duration::from_millis(config.trigger.poll_interval_ms),
            )
            .with_context(|| {
                format!("initialising GPIO button on line {}", config.trigger.gpio_line)
            })?;
            Arc::new(Mutex::new(button)) as Arc<Mutex<dyn TriggerSource>>
        }
        TriggerBackend::Stdin => {
            log::info!("stdin trigger selected: press enter to fire");
            Arc::new(Mutex::new(StdinTrigger)) as Arc<Mutex<dyn TriggerSource>>
        }
    };

    let printer = Arc::new(DevicePrinter::new(config.printer.device.as_str()));

    // 7. Service clients + orchestrator
    let captioner = Arc::new(ApiCaptioner::from_config(
        &config.caption,
        secrets.caption_token.clone(),
    ));
    let poet = Arc::new(ApiPoet::from_config(
        &config.poem,
        secrets.poem_api_key.clone(),
    ));

    let orchestrator = Orchestrator::new(camera, printer, captioner, poet, trigger, config);

    log::info!("press the button to take a photo and print a poem");

    // 8. Serve until shutdown
    tokio::select! {
        result = orchestrator.serve() => {
            result.context("appliance stopped")?;
            log::info!("serve loop ended");
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("interrupt received; shutting down");
            orchestrator.shutdown().await;
        }
    }

    Ok(())
}
