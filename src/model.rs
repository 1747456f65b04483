use crate::api::Transport;
use reqwest::Url;

/// Immutable context of one envoy, built once by `api::envoy()` and shared by every
/// collection pass.
pub struct Envoy {
    pub serial_number: String,
    pub production_url: Url,
    pub inverters_url: Url,
    /// Only set when the serial number is long enough to derive digest credentials.
    pub inverters_enabled: bool,
    pub transport: Box<dyn Transport>,
}

impl std::fmt::Debug for Envoy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envoy")
            .field("serial_number", &self.serial_number)
            .field("production_url", &self.production_url.as_str())
            .field("inverters_url", &self.inverters_url.as_str())
            .field("inverters_enabled", &self.inverters_enabled)
            .finish()
    }
}
