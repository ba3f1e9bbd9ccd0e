// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PLACEHOLDER_CHANNEL: &str = "YOUR_CHANNEL_ID";

/// One queryable upstream field: a numbered field on a ThingSpeak channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SensorFieldRef {
    pub channel_id: String,
    #[serde(default)]
    pub access_key: Option<String>,
    pub field_index: u8,
}

impl SensorFieldRef {
    #[cfg(test)]
    pub fn new(channel_id: impl Into<String>, access_key: Option<String>, field_index: u8) -> Self {
        Self {
            channel_id: channel_id.into(),
            access_key,
            field_index,
        }
    }

    /// Name of the per-record key holding this field's value, e.g. `field3`.
    pub fn field_key(&self) -> String {
        format!("field{}", self.field_index)
    }

    /// False for blank or placeholder channel ids, which are never polled.
    pub fn is_configured(&self) -> bool {
        let id = self.channel_id.trim();
        !id.is_empty() && id != PLACEHOLDER_CHANNEL
    }

    pub fn access_key(&self) -> Option<&str> {
        self.access_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Samples in ascending timestamp order. Rebuilt on every fetch.
pub type Series = Vec<Sample>;

/// Stable sort, so samples sharing a timestamp keep their upstream order.
pub fn sort_series(series: &mut Series) {
    series.sort_by_key(|s| s.timestamp);
}
