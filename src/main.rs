#[macro_use]
extern crate rocket;

use envoy_rs::model::Envoy;
use envoy_rs::settings::read_settings;
use envoy_rs::{api, Error};
use metrics::PrometheusSink;
use rocket::State;
use std::sync::Mutex;
use std::time::Instant;

mod metrics;

/// Structure containing state for API handlers.
pub struct StateData {
    envoy: Envoy,
    interval: u64,
    /// Held for the duration of a collection pass so passes never overlap.
    sink: tokio::sync::Mutex<PrometheusSink>,
    /// Timestamp of last successful metric collection via `envoy_rs::gather()`
    timestamp: Mutex<Option<Instant>>,
}

impl StateData {
    /// Updates `timestamp` to `now()`.
    fn touch(&self) {
        if let Ok(mut ts) = self.timestamp.lock() {
            *ts = Some(Instant::now());
        } else {
            log::trace!("Unable to lock timestamp mutex, will refresh again")
        }
    }

    /// Checks whether `interval_seconds` elapsed since last `touch()`
    fn interval_elapsed(&self, interval_secs: u64) -> bool {
        let elapsed_opt = self
            .timestamp
            .lock()
            .ok()
            .and_then(|a| a.map(|b| b.elapsed().as_secs()));

        if let Some(elapsed) = elapsed_opt {
            elapsed >= interval_secs
        } else {
            /* If there is None timestamp/elapsed, always return true to trigger action */
            true
        }
    }
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, Error> {
    let mut sink = state.sink.lock().await;

    if state.interval_elapsed(state.interval) {
        log::debug!("collecting metrics from {:?}", state.envoy);
        envoy_rs::gather(&state.envoy, &mut *sink).await?;
        state.touch();
    } else {
        log::info!("interval time not yet elapsed since last run; returning cached result")
    }
    sink.read()
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = read_settings()?;
    let envoy = api::envoy(&settings)?;
    let state = StateData {
        envoy,
        interval: settings.interval,
        sink: tokio::sync::Mutex::new(PrometheusSink::new()),
        timestamp: Mutex::new(None),
    };

    let _rocket = rocket::build()
        .manage(state)
        .mount("/", routes![metrics_route])
        .launch()
        .await?;

    Ok(())
}
