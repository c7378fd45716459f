use std::time::Duration;

use log::{info, warn};
use rumqttc::{Client, QoS};
use serde::Serialize;

use crate::capture::{CaptureError, SensorHub};
use crate::config::SensorTopics;
use crate::types::SensorKind;

/// Asks the sensor node to stream `sensor_type` at the given period.
#[derive(Debug, Serialize)]
pub struct SamplingRequest {
    pub sensor_type: SensorKind,
    pub sampling_period_us: u64,
}

/// [`SensorHub`] backed by per-stream MQTT topics.
pub struct MqttSensorHub {
    client: Client,
    topics: SensorTopics,
    qos: QoS,
    subscribed: Vec<String>,
}

impl MqttSensorHub {
    pub fn new(client: Client, topics: SensorTopics, qos: u8) -> Self {
        Self {
            client,
            topics,
            qos: qos_from_level(qos),
            subscribed: Vec::new(),
        }
    }

    fn request_sampling(&mut self, kind: SensorKind, sampling_period: Duration) {
        let control = self.topics.control.trim().to_string();
        if control.is_empty() {
            return;
        }
        let request = SamplingRequest {
            sensor_type: kind,
            sampling_period_us: u64::try_from(sampling_period.as_micros()).unwrap_or(u64::MAX),
        };
        match serde_json::to_vec(&request) {
            Ok(payload) => {
                if let Err(e) = self.client.publish(control, self.qos, false, payload) {
                    warn!("Failed to publish sampling request for {}: {}", kind.display_name(), e);
                }
            }
            Err(e) => warn!("Failed to encode sampling request: {}", e),
        }
    }
}

impl SensorHub for MqttSensorHub {
    fn is_available(&self, kind: SensorKind) -> bool {
        self.topics.topic_for(kind).is_some()
    }

    fn subscribe(&mut self, kind: SensorKind, sampling_period: Duration) -> Result<(), CaptureError> {
        let topic = self
            .topics
            .topic_for(kind)
            .ok_or_else(|| CaptureError::Subscribe {
                kind,
                reason: "no topic configured".to_string(),
            })?
            .to_string();

        self.client
            .subscribe(topic.as_str(), self.qos)
            .map_err(|e| CaptureError::Subscribe {
                kind,
                reason: e.to_string(),
            })?;

        self.request_sampling(kind, sampling_period);
        info!("Subscribed to {} on {}", kind.display_name(), topic);
        self.subscribed.push(topic);
        Ok(())
    }

    fn unsubscribe_all(&mut self) {
        for topic in std::mem::take(&mut self.subscribed) {
            if let Err(e) = self.client.unsubscribe(topic.as_str()) {
                warn!("Failed to unsubscribe from {}: {}", topic, e);
            }
        }
    }
}

fn qos_from_level(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}
