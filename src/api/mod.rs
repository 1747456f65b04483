pub mod digest;
pub mod endpoint;
pub mod error;
pub mod response;
pub mod transport;

use crate::model;
use crate::settings::EnvoyConfig;
use digest::Credentials;
pub use error::Error;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use reqwest::Url;
use response::{DeviceData, InvertersData};
use serde::de::DeserializeOwned;
pub use transport::{HttpTransport, Transport};

use std::time::Duration;

const APPLICATION_JSON: &str = "application/json";

/// Resolve `endpoint` against `base_url` the way relative references are resolved in a browser.
fn endpoint_url(base_url: &Url, endpoint: &endpoint::Endpoint) -> Result<Url, Error> {
    base_url
        .join(endpoint)
        .map_err(|e| Error::ConfigError(format!("invalid endpoint {}: {}", endpoint, e)))
}

/// Build the envoy context with a reqwest transport from `config`.
pub fn envoy(config: &EnvoyConfig) -> Result<model::Envoy, Error> {
    let credentials = Credentials::from_serial_number(&config.serial_number);
    let inverters_enabled = credentials.is_some();
    let transport = HttpTransport::new(Duration::from_secs(config.response_timeout), credentials)?;

    envoy_with_transport(config, Box::new(transport), inverters_enabled)
}

/// Build the envoy context around an already constructed `transport`.
pub fn envoy_with_transport(
    config: &EnvoyConfig,
    transport: Box<dyn Transport>,
    inverters_enabled: bool,
) -> Result<model::Envoy, Error> {
    let base_url = Url::parse(&config.base_url)
        .map_err(|e| Error::ConfigError(format!("invalid base_url {}: {}", config.base_url, e)))?;

    Ok(model::Envoy {
        serial_number: config.serial_number.to_owned(),
        production_url: endpoint_url(&base_url, endpoint::PRODUCTION)?,
        inverters_url: endpoint_url(&base_url, endpoint::INVERTERS)?,
        inverters_enabled,
        transport,
    })
}

/// Media type of a `Content-Type` header value, without parameters.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// GET `url` and decode its JSON body into `T`.
async fn get<T: DeserializeOwned>(envoy: &model::Envoy, url: &Url) -> Result<T, Error> {
    let response = envoy.transport.get(url).await?;

    if response.status() != StatusCode::OK {
        return Err(Error::HttpStatus(
            url.to_string(),
            response.status().to_string(),
        ));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(media_type)
        .unwrap_or_default();
    if content_type != APPLICATION_JSON {
        return Err(Error::UnexpectedContentType(url.to_string(), content_type));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::TransportError(e.to_string()))?;

    log::trace!(
        "url: {}, response_text: {}",
        url,
        String::from_utf8_lossy(&body)
    );

    serde_json::from_slice(&body).map_err(|e| Error::DecodeError(e.to_string()))
}

/// Read `production.json`. A `null` document yields `None`.
pub async fn production(envoy: &model::Envoy) -> Result<Option<DeviceData>, Error> {
    get(envoy, &envoy.production_url).await
}

/// Read per-inverter data. Returns `None` without any request when the envoy can't
/// authenticate against the inverters endpoint.
pub async fn inverters(envoy: &model::Envoy) -> Result<Option<InvertersData>, Error> {
    if !envoy.inverters_enabled {
        log::debug!("serial number too short, skipping inverters");
        return Ok(None);
    }

    get(envoy, &envoy.inverters_url).await.map(Some)
}
