pub mod client;
pub mod hub;

pub use client::{connect, run_mqtt_client};
pub use hub::MqttSensorHub;
