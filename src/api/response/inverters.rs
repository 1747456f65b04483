use super::null_as_default;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Inverter {
    #[serde(deserialize_with = "null_as_default")]
    pub serial_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_report_date: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub dev_type: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub last_report_watts: f64,
    /* Running maximum, not a daily total */
    #[serde(deserialize_with = "null_as_default")]
    pub max_report_watts: f64,
}

/// `api/v1/production/inverters`
pub type InvertersData = Vec<Inverter>;
