use envoy_rs::{Accumulator, Error, Metric};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Prometheus sink: every metric field becomes a gauge named
/// `envoy_<measurement>_<field>`, labelled with the metric tags.
pub struct PrometheusSink {
    registry: Registry,
    gauges: HashMap<String, GaugeVec>,
}

fn gauge_name(measurement: &str, field: &str) -> String {
    format!("envoy_{}_{}", measurement, field)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl PrometheusSink {
    pub fn new() -> Self {
        PrometheusSink {
            registry: Registry::new(),
            gauges: HashMap::new(),
        }
    }

    /// Look up the gauge `name`, registering it with `labels` on first use.
    fn gauge(&mut self, name: &str, help: String, labels: &[&str]) -> Option<&GaugeVec> {
        if !self.gauges.contains_key(name) {
            let gauge = GaugeVec::new(Opts::new(name, help), labels)
                .and_then(|gauge| {
                    self.registry
                        .register(Box::new(gauge.clone()))
                        .map(|_| gauge)
                })
                .map_err(|e| log::warn!("Unable to register gauge {}: {}", name, e))
                .ok()?;
            self.gauges.insert(name.to_string(), gauge);
        }
        self.gauges.get(name)
    }

    /// Render the registry in Prometheus text format.
    pub fn read(&self) -> Result<String, Error> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        encoder
            .encode(&metric_families, &mut buffer)
            .or(Err(Error::FormatError))?;
        String::from_utf8(buffer).or(Err(Error::FormatError))
    }
}

impl Accumulator for PrometheusSink {
    fn add(&mut self, metric: Metric) {
        /* Gauges carry no timestamp; the scrape time applies */
        let labels: Vec<&str> = metric.tags.keys().map(String::as_str).collect();
        let values: HashMap<&str, &str> = metric
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        for (field, value) in &metric.fields {
            let name = gauge_name(&metric.measurement, field);
            let help = format!("{} {} reported by envoy", metric.measurement, field);

            if let Some(gauge) = self.gauge(&name, help, &labels) {
                match gauge.get_metric_with(&values) {
                    Ok(g) => g.set(value.as_f64()),
                    Err(e) => log::warn!("Dropping {} {:?}: {}", name, metric.tags, e),
                }
            }
        }
    }
}
