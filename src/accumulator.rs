use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Float(v) => v,
            FieldValue::Int(v) => v as f64,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

/// One emitted record: measurement name, fields, tags and an optional timestamp
/// (epoch seconds). Without a timestamp the sink's reception time applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub measurement: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub tags: BTreeMap<String, String>,
    pub timestamp: Option<i64>,
}

impl Metric {
    pub fn new(measurement: &str) -> Self {
        Metric {
            measurement: measurement.to_string(),
            fields: BTreeMap::new(),
            tags: BTreeMap::new(),
            timestamp: None,
        }
    }

    pub fn field<V: Into<FieldValue>>(mut self, name: &str, value: V) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn tag(mut self, name: &str, value: &str) -> Self {
        self.tags.insert(name.to_string(), value.to_string());
        self
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn get(&self, field: &str) -> Option<FieldValue> {
        self.fields.get(field).copied()
    }
}

/// Sink receiving metrics as soon as they are extracted.
pub trait Accumulator {
    fn add(&mut self, metric: Metric);
}

impl Accumulator for Vec<Metric> {
    fn add(&mut self, metric: Metric) {
        self.push(metric);
    }
}
