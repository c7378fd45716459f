pub mod activity;
pub mod sample;

pub use activity::Activity;
pub use sample::{Sample, SensorEvent, SensorKind};
