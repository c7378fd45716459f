use serde::{Deserialize, Serialize};

/// 传感器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    LinearAcceleration,
    Gravity,
    Gyroscope,
    /// Anything the sender names that we do not record.
    #[serde(other)]
    Unrecognized,
}

impl SensorKind {
    /// The three streams that are recorded, in file order.
    pub const RECORDED: [SensorKind; 3] = [
        SensorKind::LinearAcceleration,
        SensorKind::Gravity,
        SensorKind::Gyroscope,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SensorKind::LinearAcceleration => "Linear Acceleration",
            SensorKind::Gravity => "Gravity",
            SensorKind::Gyroscope => "Gyroscope",
            SensorKind::Unrecognized => "Unrecognized",
        }
    }

    /// 输出文件名
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            SensorKind::LinearAcceleration => Some("linear.csv"),
            SensorKind::Gravity => Some("gravity.csv"),
            SensorKind::Gyroscope => Some("gyro.csv"),
            SensorKind::Unrecognized => None,
        }
    }

    /// Index into per-stream arrays; `None` for unrecognized types.
    pub fn stream_index(&self) -> Option<usize> {
        match self {
            SensorKind::LinearAcceleration => Some(0),
            SensorKind::Gravity => Some(1),
            SensorKind::Gyroscope => Some(2),
            SensorKind::Unrecognized => None,
        }
    }
}

/// One inbound reading as delivered by a sensor node.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SensorEvent {
    pub sensor_type: SensorKind,
    /// Sensor clock, nanoseconds.
    pub timestamp: i64,
    pub values: Vec<f64>,
}

impl SensorEvent {
    #[cfg(test)]
    pub fn new(sensor_type: SensorKind, timestamp: i64, values: [f64; 3]) -> Self {
        Self {
            sensor_type,
            timestamp,
            values: values.to_vec(),
        }
    }

    pub fn axes(&self) -> Option<(f64, f64, f64)> {
        match self.values.as_slice() {
            [x, y, z, ..] => Some((*x, *y, *z)),
            _ => None,
        }
    }
}

/// A labelled sample ready to be written to its stream file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub activity_label: usize,
    pub timestamp_ns: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn from_event(activity_label: usize, event: &SensorEvent) -> Option<Self> {
        let (x, y, z) = event.axes()?;
        Some(Self {
            activity_label,
            timestamp_ns: event.timestamp,
            x,
            y,
            z,
        })
    }

    /// `label,timestamp_us,x,y,z\n`
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{}\n",
            self.activity_label,
            self.timestamp_ns / 1000,
            format_sci9(self.x),
            format_sci9(self.y),
            format_sci9(self.z),
        )
    }
}

/// Scientific notation with a 9 digit fraction and a signed, two digit minimum exponent
/// (`9.700000000e+00`), matching C's `%.9e`.
pub fn format_sci9(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }

    let raw = format!("{:.9e}", value);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(rest) => ('-', rest),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci9_matches_c_style_exponent() {
        assert_eq!(format_sci9(0.1), "1.000000000e-01");
        assert_eq!(format_sci9(9.7), "9.700000000e+00");
        assert_eq!(format_sci9(0.0), "0.000000000e+00");
        assert_eq!(format_sci9(-123.5), "-1.235000000e+02");
        assert_eq!(format_sci9(1.5e-120), "1.500000000e-120");
        assert_eq!(format_sci9(f64::NAN), "NaN");
        assert_eq!(format_sci9(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn csv_line_converts_nanoseconds_to_microseconds() {
        let event = SensorEvent::new(SensorKind::Gravity, 6_000_000_000, [0.1, 9.7, 0.2]);
        let sample = Sample::from_event(2, &event).unwrap();
        assert_eq!(
            sample.to_csv_line(),
            "2,6000000,1.000000000e-01,9.700000000e+00,2.000000000e-01\n"
        );
    }

    #[test]
    fn csv_line_parses_back() {
        let event = SensorEvent::new(SensorKind::Gyroscope, 1_234_567_891, [-0.015, 3.25, 1e-7]);
        let line = Sample::from_event(5, &event).unwrap().to_csv_line();
        let fields: Vec<&str> = line.trim_end_matches('\n').split(',').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0].parse::<usize>().unwrap(), 5);
        assert_eq!(fields[1].parse::<i64>().unwrap(), 1_234_567);
        assert!((fields[2].parse::<f64>().unwrap() + 0.015).abs() < 1e-12);
        assert!((fields[3].parse::<f64>().unwrap() - 3.25).abs() < 1e-12);
        assert!((fields[4].parse::<f64>().unwrap() - 1e-7).abs() < 1e-16);
    }

    #[test]
    fn parses_sensor_payload() {
        let payload = r#"{"sensor_type":"gravity","timestamp":6000000000,"values":[0.1,9.7,0.2]}"#;
        let event: SensorEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.sensor_type, SensorKind::Gravity);
        assert_eq!(event.timestamp, 6_000_000_000);
        assert_eq!(event.axes(), Some((0.1, 9.7, 0.2)));
    }

    #[test]
    fn unknown_sensor_type_is_unrecognized() {
        let payload = r#"{"sensor_type":"magnetometer","timestamp":1,"values":[1.0,2.0,3.0]}"#;
        let event: SensorEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.sensor_type, SensorKind::Unrecognized);
        assert_eq!(event.sensor_type.file_name(), None);
    }

    #[test]
    fn short_value_list_has_no_axes() {
        let event = SensorEvent {
            sensor_type: SensorKind::Gyroscope,
            timestamp: 0,
            values: vec![1.0, 2.0],
        };
        assert_eq!(event.axes(), None);
        assert!(Sample::from_event(0, &event).is_none());
    }
}
