use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dotenv::dotenv;
use log::{debug, error, info, warn};
use rumqttc::{Client, Connection, Event, MqttOptions, Packet};

use crate::capture::{RouteOutcome, SampleRouter};
use crate::config::{MqttConfig, SensorTopics};
use crate::types::SensorEvent;

/// Builds the MQTT client/connection pair. Credentials come from `MQTT_USER`/`MQTT_PASS`
/// (also read from `.env`) and are optional.
pub fn connect(config: &MqttConfig) -> (Client, Connection) {
    dotenv().ok(); // 加载 .env 文件

    let mut mqtt_options = MqttOptions::new(
        config.client_id.clone(),
        config.broker.clone(),
        config.port,
    );

    if let (Ok(user), Ok(pass)) = (env::var("MQTT_USER"), env::var("MQTT_PASS")) {
        mqtt_options.set_credentials(user, pass);
    }

    mqtt_options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive.max(1))));

    Client::new(mqtt_options, 10)
}

/// Drives the MQTT event loop and hands every sensor publish to the router. Runs on the
/// sensor delivery thread until shutdown or a connection error.
pub fn run_mqtt_client(
    mut connection: Connection,
    topics: SensorTopics,
    router: Arc<SampleRouter>,
    shutdown_signal: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    for event in connection.iter() {
        // 检查关闭信号
        if shutdown_signal.load(Ordering::Relaxed) {
            info!("MQTT thread received shutdown signal, exiting gracefully");
            break;
        }

        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if topics.kind_for(&publish.topic).is_none() {
                    continue;
                }
                match parse_sensor_event(&publish.payload) {
                    Ok(sensor_event) => {
                        let outcome = router.route(&sensor_event, Instant::now());
                        if outcome == RouteOutcome::MalformedValues {
                            warn!("Sensor event on {} carries fewer than 3 values", publish.topic);
                        }
                    }
                    Err(e) => warn!("Invalid sensor data: {}", e),
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => info!("Connected to MQTT broker"),
            Ok(Event::Incoming(Packet::Disconnect)) => {
                info!("MQTT broker closed the connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if shutdown_signal.load(Ordering::Relaxed) {
                    debug!("MQTT connection closed during shutdown: {}", e);
                    break;
                }
                error!("MQTT connection error: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}

pub fn parse_sensor_event(payload: &[u8]) -> Result<SensorEvent, String> {
    let payload_str = std::str::from_utf8(payload)
        .map_err(|e| format!("Invalid UTF-8: {}", e))?;

    serde_json::from_str::<SensorEvent>(payload_str)
        .map_err(|e| format!("JSON parsing error: {}", e))
}
