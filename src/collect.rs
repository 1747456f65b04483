//! Metric extraction from decoded envoy documents. Nothing here performs I/O.
//!
//! Readings are classified by `type` / `measurementType` only; entries matching no collector
//! are ignored.

use crate::accumulator::{Accumulator, Metric};
use crate::api::response::{DeviceData, InvertersData, MeasurementType, Reading};

/// Instantaneous readings below this many watts are idle noise and count as 0.
pub const NOISE_FLOOR_WATTS: f64 = 3.0;
/// An inverter that reported within this many seconds is online.
pub const ONLINE_WINDOW_SECS: i64 = 30 * 60;

const INVERTERS_TYPE: &str = "inverters";

/// Aggregated production/consumption and the resulting grid balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    pub production: f64,
    pub consumption: f64,
    /// `production - consumption`; positive values are exported to the grid.
    pub net: f64,
    pub import: f64,
    pub export: f64,
}

impl Balance {
    pub fn new(production: f64, consumption: f64) -> Self {
        let net = production - consumption;
        let (import, export) = if net > 0.0 {
            (0.0, net.abs())
        } else {
            (net.abs(), 0.0)
        };

        Balance {
            production,
            consumption,
            net,
            import,
            export,
        }
    }

    fn metric(&self, measurement: &str, serial_number: &str, kind: &str) -> Metric {
        Metric::new(measurement)
            .field("production", self.production)
            .field("consumption", self.consumption)
            .field("net", self.net)
            .field("import", self.import)
            .field("export", self.export)
            .tag("envoy", serial_number)
            .tag("type", kind)
    }
}

/// `watts` unless it is below the noise floor.
pub fn above_noise_floor(watts: f64) -> f64 {
    if watts >= NOISE_FLOOR_WATTS {
        watts
    } else {
        0.0
    }
}

/// Sum `value` of every reading of `measurement_type`.
pub fn sum<F>(readings: &[Reading], measurement_type: MeasurementType, value: F) -> f64
where
    F: Fn(&Reading) -> f64,
{
    readings
        .iter()
        .filter(|r| r.measurement_type == measurement_type)
        .map(value)
        .sum()
}

pub fn instant_balance(data: &DeviceData) -> Balance {
    Balance::new(
        sum(&data.production, MeasurementType::Production, |r| {
            above_noise_floor(r.w_now)
        }),
        sum(&data.consumption, MeasurementType::TotalConsumption, |r| {
            r.w_now
        }),
    )
}

pub fn today_balance(data: &DeviceData) -> Balance {
    Balance::new(
        sum(&data.production, MeasurementType::Production, |r| r.wh_today),
        sum(&data.consumption, MeasurementType::TotalConsumption, |r| {
            r.wh_today
        }),
    )
}

/// Active inverter count, timestamped with the reading time of the envoy.
pub fn general_information<A: Accumulator + ?Sized>(acc: &mut A, data: &DeviceData) {
    for reading in data.production.iter().filter(|r| r.kind == INVERTERS_TYPE) {
        acc.add(
            Metric::new("inverter")
                .field("count", reading.active_count)
                .at(reading.reading_time),
        );
    }
}

pub fn instant_report<A: Accumulator + ?Sized>(acc: &mut A, serial_number: &str, data: &DeviceData) {
    acc.add(instant_balance(data).metric("instant-report", serial_number, "instant"));
}

pub fn today_report<A: Accumulator + ?Sized>(acc: &mut A, serial_number: &str, data: &DeviceData) {
    acc.add(today_balance(data).metric("today-report", serial_number, "today"));
}

/// Whether an inverter last reported at `last_report_date` counts as online at `now`.
pub fn is_online(last_report_date: i64, now: i64) -> bool {
    last_report_date > now - ONLINE_WINDOW_SECS
}

/// Per inverter power and online status. `today` carries `maxReportWatts`, the highest
/// power the inverter reported, as the envoy API provides no daily energy per inverter.
pub fn inverters<A: Accumulator + ?Sized>(
    acc: &mut A,
    serial_number: &str,
    inverters: &InvertersData,
    now: i64,
) {
    for inverter in inverters {
        let status: i64 = if is_online(inverter.last_report_date, now) {
            1
        } else {
            0
        };

        acc.add(
            Metric::new("inverter")
                .field("instant", above_noise_floor(inverter.last_report_watts))
                .field("today", inverter.max_report_watts)
                .field("status", status)
                .tag("serialNumber", &inverter.serial_number)
                .tag("envoy", serial_number),
        );
    }
}
