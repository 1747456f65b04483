use super::digest::{self, Challenge, Credentials};
use super::Error;
use async_trait::async_trait;
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::StatusCode;
use reqwest::{Response, Url};
use std::time::Duration;

/// Capability to perform a single, possibly authenticated, GET request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Response, Error>;
}

/// reqwest backed transport. Answers digest challenges when `credentials` are known.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    pub fn new(timeout: Duration, credentials: Option<Credentials>) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Ok(HttpTransport {
            client,
            credentials,
        })
    }

    async fn send(&self, url: &Url, authorization: Option<String>) -> Result<Response, Error> {
        let request = match authorization {
            Some(authorization) => self.client.get(url.clone()).header(AUTHORIZATION, authorization),
            None => self.client.get(url.clone()),
        };

        request
            .send()
            .await
            .map_err(|e| Error::TransportError(e.to_string()))
    }
}

/// Path and query of `url`, as used in the digest `uri` parameter.
fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Response, Error> {
        let response = self.send(url, None).await?;

        let credentials = match &self.credentials {
            Some(credentials) if response.status() == StatusCode::UNAUTHORIZED => credentials,
            _ => return Ok(response),
        };

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(Challenge::parse);

        match challenge {
            Some(challenge) => {
                log::trace!("answering digest challenge of {}", url);
                let authorization = challenge.authorization(
                    credentials,
                    "GET",
                    &request_uri(url),
                    &digest::cnonce(&challenge.nonce),
                );
                self.send(url, Some(authorization)).await
            }
            None => Ok(response),
        }
    }
}

#[cfg(test)]
mod test {
    use super::request_uri;
    use reqwest::Url;

    #[test]
    fn request_uri_keeps_query() {
        let url = Url::parse("http://envoy/api/v1/production/inverters?long=1").unwrap();
        assert_eq!("/api/v1/production/inverters?long=1", request_uri(&url));

        let url = Url::parse("http://envoy/production.json").unwrap();
        assert_eq!("/production.json", request_uri(&url));
    }
}
