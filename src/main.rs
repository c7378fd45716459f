mod app;
mod capture;
mod config;
mod logger;
mod mqtt;
mod types;
mod utils;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use log::{error, info, warn};

use app::SensorMonitorApp;
use capture::{CaptureController, SampleRouter, SessionHandle};
use config::{ConfigManager, DEFAULT_CONFIG_FILE};
use mqtt::MqttSensorHub;

fn main() {
    logger::init_logger();
    info!("Application starting");

    let config_manager = match ConfigManager::load_or_default(DEFAULT_CONFIG_FILE) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Failed to load {}: {}", DEFAULT_CONFIG_FILE, e);
            std::process::exit(1);
        }
    };
    let config = config_manager.get_config().clone();
    match config_manager.config_path() {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => {
            info!("No {} found, writing defaults", DEFAULT_CONFIG_FILE);
            if let Err(e) = config.save_to_file(DEFAULT_CONFIG_FILE) {
                warn!("Failed to write default configuration: {}", e);
            }
        }
    }

    let session = SessionHandle::new();
    let router = Arc::new(SampleRouter::new(Arc::clone(&session), config.capture.warmup()));
    let (display_sender, display_receiver) = bounded(config.channels.display_channel_capacity);
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    let (client, connection) = mqtt::connect(&config.mqtt);
    let shutdown_client = client.clone();

    let mqtt_topics = config.mqtt.topics.clone();
    let mqtt_shutdown = Arc::clone(&shutdown_signal);
    let mqtt_handle = thread::spawn(move || {
        if let Err(e) = mqtt::run_mqtt_client(connection, mqtt_topics, router, mqtt_shutdown) {
            error!("MQTT thread failed: {}", e);
        }
    });

    let hub = MqttSensorHub::new(client, config.mqtt.topics.clone(), config.mqtt.qos);
    let controller = CaptureController::new(hub, session, &config.capture, display_sender);

    let options = eframe::NativeOptions {
        vsync: config.window.vsync,
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(config.window.resizable),
        ..Default::default()
    };

    // the controller is dropped with the app, which stops and trims an unfinished session
    if let Err(e) = eframe::run_native(
        &config.window.title,
        options,
        Box::new(move |cc| Ok(Box::new(SensorMonitorApp::new(&cc.egui_ctx, controller, display_receiver)))),
    ) {
        error!("GUI failed: {}", e);
        std::process::exit(1);
    }

    // GUI 关闭后，发送关闭信号给 MQTT 线程
    info!("GUI closed, signaling MQTT thread to shutdown");
    shutdown_signal.store(true, Ordering::Relaxed);
    if let Err(e) = shutdown_client.disconnect() {
        warn!("Failed to request MQTT disconnect: {}", e);
    }

    match mqtt_handle.join() {
        Ok(()) => info!("MQTT thread shut down gracefully"),
        Err(e) => error!("MQTT thread panicked: {:?}", e),
    }
}
