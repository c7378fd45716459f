use crate::types::SensorKind;

/// 采集错误类型
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("A session is already recording")]
    AlreadyRecording,
    #[error("No session is recording")]
    NotRecording,
    #[error("Unknown activity code: {0}")]
    UnknownActivity(usize),
    #[error("Failed to subscribe to {}: {reason}", kind.display_name())]
    Subscribe { kind: SensorKind, reason: String },
}
