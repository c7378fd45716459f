use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::SensorKind;

/// 应用配置管理模块
/// 集中管理所有配置项，提供默认值和配置验证

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "sensor_monitor.toml";

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub capture: CaptureConfig,
    pub mqtt: MqttConfig,
    pub channels: ChannelConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
}

/// 采集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Root directory; each activity gets a numbered subdirectory.
    pub output_dir: String,
    pub sampling_period_us: u64,
    /// Samples arriving this soon after start are dropped.
    pub warmup_ms: u64,
    /// Trailing lines removed from every file on stop.
    pub trim_lines: usize,
    pub tick_interval_ms: u64,
}

/// MQTT配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub topics: SensorTopics,
    pub qos: u8,
    pub keep_alive: u16,
}

/// MQTT主题配置，空字符串表示该传感器不可用
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorTopics {
    pub linear_acceleration: String,
    pub gravity: String,
    pub gyroscope: String,
    pub control: String,
}

/// 通道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub display_channel_capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 320.0,
            title: "Sensor Monitor".to_string(),
            resizable: true,
            vsync: true,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: "documents".to_string(),
            sampling_period_us: 10_000, // 100 Hz
            warmup_ms: 5_000,
            trim_lines: 500,
            tick_interval_ms: 1_000,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "localhost".to_string(),
            port: 1883,
            client_id: "sensor_monitor".to_string(),
            topics: SensorTopics::default(),
            qos: 1,
            keep_alive: 5,
        }
    }
}

impl Default for SensorTopics {
    fn default() -> Self {
        Self {
            linear_acceleration: "sensors/linear_acceleration".to_string(),
            gravity: "sensors/gravity".to_string(),
            gyroscope: "sensors/gyroscope".to_string(),
            control: "sensors/control".to_string(),
        }
    }
}

impl SensorTopics {
    /// Topic for a recorded stream, `None` when the sensor is not configured.
    pub fn topic_for(&self, kind: SensorKind) -> Option<&str> {
        let topic = match kind {
            SensorKind::LinearAcceleration => &self.linear_acceleration,
            SensorKind::Gravity => &self.gravity,
            SensorKind::Gyroscope => &self.gyroscope,
            SensorKind::Unrecognized => return None,
        };
        (!topic.trim().is_empty()).then_some(topic.as_str())
    }

    /// Reverse lookup used by the ingest loop.
    pub fn kind_for(&self, topic: &str) -> Option<SensorKind> {
        SensorKind::RECORDED
            .into_iter()
            .find(|kind| self.topic_for(*kind) == Some(topic))
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            display_channel_capacity: 16,
        }
    }
}

impl CaptureConfig {
    pub fn sampling_period(&self) -> Duration {
        Duration::from_micros(self.sampling_period_us)
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn output_root(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::ValidationError("Window dimensions must be positive".to_string()));
        }

        if self.capture.sampling_period_us == 0 {
            return Err(ConfigError::ValidationError("Sampling period must be positive".to_string()));
        }

        if self.capture.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationError("Tick interval must be positive".to_string()));
        }

        if self.mqtt.qos > 2 {
            return Err(ConfigError::ValidationError(format!("Invalid MQTT QoS: {}", self.mqtt.qos)));
        }

        if self.channels.display_channel_capacity == 0 {
            return Err(ConfigError::ValidationError("Display channel capacity must be positive".to_string()));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 配置管理器
pub struct ConfigManager {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_path: None,
        }
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(&path)?;
        Ok(Self {
            config,
            config_path: Some(path.as_ref().to_path_buf()),
        })
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::new())
        }
    }

    /// 获取当前配置
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 配置文件路径（使用默认配置时为空）
    pub fn config_path(&self) -> Option<&std::path::Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
