use config::{Config, ConfigError};

pub const DEFAULT_BASE_URL: &str = "http://envoy";
pub const DEFAULT_RESPONSE_TIMEOUT: i64 = 20;
pub const DEFAULT_SERIAL_NUMBER: &str = "";
pub const DEFAULT_INTERVAL: i64 = 0;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvoyConfig {
    pub base_url: String,
    /// Seconds, applied to every request.
    pub response_timeout: u64,
    pub serial_number: String,
    /// Minimum number of seconds between two collections.
    pub interval: u64,
}

impl Default for EnvoyConfig {
    fn default() -> Self {
        EnvoyConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT as u64,
            serial_number: DEFAULT_SERIAL_NUMBER.to_string(),
            interval: DEFAULT_INTERVAL as u64,
        }
    }
}

/// Read settings from an optional `envoy.{toml,json,yaml}` in the working directory, then
/// from `ENVOY_*` environment variables, falling back to defaults.
pub fn read_settings() -> Result<EnvoyConfig, ConfigError> {
    let mut settings = defaults()?;
    settings
        .merge(config::File::with_name("envoy").required(false))?
        .merge(config::Environment::with_prefix("ENVOY"))?;

    settings.try_into()
}

/// `Config` holding only the default of every setting.
fn defaults() -> Result<Config, ConfigError> {
    let mut settings = Config::default();
    settings
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("response_timeout", DEFAULT_RESPONSE_TIMEOUT)?
        .set_default("serial_number", DEFAULT_SERIAL_NUMBER)?
        .set_default("interval", DEFAULT_INTERVAL)?;

    Ok(settings)
}

#[cfg(test)]
mod test {
    use super::{defaults, EnvoyConfig};

    #[test]
    fn default_settings() {
        let settings: EnvoyConfig = defaults().unwrap().try_into().unwrap();
        let default = EnvoyConfig::default();

        assert_eq!(default.base_url, settings.base_url);
        assert_eq!("http://envoy", settings.base_url);
        assert_eq!(20, settings.response_timeout);
        assert_eq!("", settings.serial_number);
        assert_eq!(0, settings.interval);
    }
}
