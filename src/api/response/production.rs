use super::null_as_default;
use serde::Deserialize;

/// Discriminator of production/consumption entries. Anything the collectors don't know about,
/// including a missing, empty or `null` `measurementType`, lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementType {
    Production,
    TotalConsumption,
    NetConsumption,
    #[serde(other)]
    Other,
}

impl Default for MeasurementType {
    fn default() -> Self {
        MeasurementType::Other
    }
}

/// Entry of the `production` and `consumption` arrays.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reading {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub measurement_type: MeasurementType,
    #[serde(deserialize_with = "null_as_default")]
    pub active_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub reading_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub w_now: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub wh_today: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub wh_lifetime: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub wh_last_seven_days: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub varh_lead_lifetime: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub varh_lag_lifetime: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub vah_lifetime: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub rms_current: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub rms_voltage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub react_pwr: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub apprnt_pwr: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub pwr_factor: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub vah_today: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub varh_lead_today: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub varh_lag_today: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageReading {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub active_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub reading_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub w_now: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub wh_now: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

/// `production.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceData {
    #[serde(deserialize_with = "null_as_default")]
    pub production: Vec<Reading>,
    #[serde(deserialize_with = "null_as_default")]
    pub consumption: Vec<Reading>,
    #[serde(deserialize_with = "null_as_default")]
    pub storage: Vec<StorageReading>,
}
