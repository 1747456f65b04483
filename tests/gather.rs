use envoy_rs::settings::EnvoyConfig;
use envoy_rs::{api, gather, Error, FieldValue, Metric};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const SERIAL_NUMBER: &str = "122112345678";

fn config(server: &ServerGuard, serial_number: &str) -> EnvoyConfig {
    EnvoyConfig {
        base_url: server.url(),
        serial_number: serial_number.to_string(),
        response_timeout: 5,
        ..EnvoyConfig::default()
    }
}

fn production_body() -> String {
    json!({
        "production": [
            {"type": "inverters", "activeCount": 3, "readingTime": 1000, "wNow": 510},
            {"type": "eim", "measurementType": "production", "wNow": 500, "whToday": 1200}
        ],
        "consumption": [
            {"type": "eim", "measurementType": "total-consumption", "wNow": 300, "whToday": 900},
            {"type": "eim", "measurementType": "net-consumption", "wNow": -200, "whToday": -300}
        ],
        "storage": []
    })
    .to_string()
}

fn field(metric: &Metric, name: &str) -> f64 {
    metric.get(name).map(|v| v.as_f64()).unwrap()
}

async fn mock_production(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/production.json")
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(production_body())
        .create_async()
        .await
}

#[tokio::test]
async fn production_only_when_serial_number_is_short() {
    let mut server = Server::new_async().await;
    let production = mock_production(&mut server).await;
    let inverters = server
        .mock("GET", "/api/v1/production/inverters")
        .expect(0)
        .create_async()
        .await;

    let envoy = api::envoy(&config(&server, "123456")).unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    gather(&envoy, &mut acc).await.unwrap();

    assert_eq!(3, acc.len());
    assert_eq!(
        Metric::new("inverter").field("count", 3i64).at(1000),
        acc[0]
    );

    let instant = &acc[1];
    assert_eq!("instant-report", instant.measurement);
    assert_eq!(500.0, field(instant, "production"));
    assert_eq!(300.0, field(instant, "consumption"));
    assert_eq!(200.0, field(instant, "net"));
    assert_eq!(200.0, field(instant, "export"));
    assert_eq!(0.0, field(instant, "import"));
    assert_eq!(Some("123456"), instant.tags.get("envoy").map(String::as_str));

    let today = &acc[2];
    assert_eq!("today-report", today.measurement);
    assert_eq!(1200.0, field(today, "production"));
    assert_eq!(900.0, field(today, "consumption"));
    assert_eq!(300.0, field(today, "export"));

    production.assert_async().await;
    inverters.assert_async().await;
}

#[tokio::test]
async fn inverters_behind_digest_authentication() {
    let mut server = Server::new_async().await;
    let now = chrono::Utc::now().timestamp();
    let _production = mock_production(&mut server).await;
    let challenge = server
        .mock("GET", "/api/v1/production/inverters")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header(
            "www-authenticate",
            r#"Digest realm="enphaseenergy.com", qop="auth", nonce="1656001322""#,
        )
        .create_async()
        .await;
    let authorized = server
        .mock("GET", "/api/v1/production/inverters")
        .match_header(
            "authorization",
            Matcher::Regex(
                r#"^Digest username="envoy", realm="enphaseenergy.com", nonce="1656001322", uri="/api/v1/production/inverters", response="[0-9a-f]{32}", qop=auth, nc=00000001, cnonce="[0-9a-f]{16}"$"#
                    .to_string(),
            ),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"serialNumber": "121935144671", "lastReportDate": now - 600,
                 "devType": 1, "lastReportWatts": 183, "maxReportWatts": 297},
                {"serialNumber": "121935144672", "lastReportDate": now - 2400,
                 "devType": 1, "lastReportWatts": 1.5, "maxReportWatts": 296}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let envoy = api::envoy(&config(&server, SERIAL_NUMBER)).unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    gather(&envoy, &mut acc).await.unwrap();

    challenge.assert_async().await;
    authorized.assert_async().await;

    let inverters: Vec<&Metric> = acc
        .iter()
        .filter(|m| m.tags.contains_key("serialNumber"))
        .collect();
    assert_eq!(2, inverters.len());
    assert_eq!(Some(FieldValue::Float(183.0)), inverters[0].get("instant"));
    assert_eq!(Some(FieldValue::Float(297.0)), inverters[0].get("today"));
    assert_eq!(Some(FieldValue::Int(1)), inverters[0].get("status"));
    assert_eq!(Some(FieldValue::Float(0.0)), inverters[1].get("instant"));
    assert_eq!(Some(FieldValue::Int(0)), inverters[1].get("status"));
    assert_eq!(
        Some(SERIAL_NUMBER),
        inverters[1].tags.get("envoy").map(String::as_str)
    );
}

#[tokio::test]
async fn production_error_status_aborts_pass() {
    let mut server = Server::new_async().await;
    let _production = server
        .mock("GET", "/production.json")
        .with_status(500)
        .create_async()
        .await;

    let envoy = api::envoy(&config(&server, SERIAL_NUMBER)).unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    let error = gather(&envoy, &mut acc).await.unwrap_err();

    let url = format!("{}/production.json", server.url());
    assert_eq!(
        Error::HttpStatus(url.clone(), "500 Internal Server Error".to_string()),
        error
    );
    let message = error.to_string();
    assert!(message.contains(&url));
    assert!(message.contains("500 Internal Server Error"));
    assert!(acc.is_empty());
}

#[tokio::test]
async fn unexpected_content_type() {
    let mut server = Server::new_async().await;
    let _production = server
        .mock("GET", "/production.json")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html></html>")
        .create_async()
        .await;

    let envoy = api::envoy(&config(&server, SERIAL_NUMBER)).unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    let error = gather(&envoy, &mut acc).await.unwrap_err();

    assert_eq!(
        Error::UnexpectedContentType(
            format!("{}/production.json", server.url()),
            "text/html".to_string()
        ),
        error
    );
    assert!(acc.is_empty());
}

#[tokio::test]
async fn malformed_json() {
    let mut server = Server::new_async().await;
    let _production = server
        .mock("GET", "/production.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"production": [{"type": "inverters""#)
        .create_async()
        .await;

    let envoy = api::envoy(&config(&server, SERIAL_NUMBER)).unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    let error = gather(&envoy, &mut acc).await.unwrap_err();

    assert!(matches!(error, Error::DecodeError(_)));
    assert!(error
        .to_string()
        .starts_with("error while decoding JSON response: "));
    assert!(acc.is_empty());
}

#[tokio::test]
async fn null_document_is_no_data() {
    let mut server = Server::new_async().await;
    let _production = server
        .mock("GET", "/production.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("null")
        .create_async()
        .await;

    let envoy = api::envoy(&config(&server, SERIAL_NUMBER)).unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    let error = gather(&envoy, &mut acc).await.unwrap_err();

    assert_eq!(Error::NoData, error);
    assert_eq!("no data gathered", error.to_string());
    assert!(acc.is_empty());
}

#[tokio::test]
async fn inverters_failure_keeps_production_metrics() {
    let mut server = Server::new_async().await;
    let _production = mock_production(&mut server).await;
    let _inverters = server
        .mock("GET", "/api/v1/production/inverters")
        .with_status(503)
        .create_async()
        .await;

    let envoy = api::envoy(&config(&server, SERIAL_NUMBER)).unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    let error = gather(&envoy, &mut acc).await.unwrap_err();

    assert_eq!(
        Error::HttpStatus(
            format!("{}/api/v1/production/inverters", server.url()),
            "503 Service Unavailable".to_string()
        ),
        error
    );
    assert_eq!(3, acc.len());
    assert_eq!("instant-report", acc[1].measurement);
}

#[tokio::test]
async fn unreachable_envoy_is_transport_error() {
    let envoy = api::envoy(&EnvoyConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        response_timeout: 2,
        ..EnvoyConfig::default()
    })
    .unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    let error = gather(&envoy, &mut acc).await.unwrap_err();

    assert!(matches!(error, Error::TransportError(_)));
    assert!(acc.is_empty());
}

#[test]
fn invalid_base_url() {
    let error = api::envoy(&EnvoyConfig {
        base_url: "not a url".to_string(),
        ..EnvoyConfig::default()
    })
    .unwrap_err();

    assert!(matches!(error, Error::ConfigError(_)));
}

struct UnreachableTransport;

#[async_trait::async_trait]
impl api::Transport for UnreachableTransport {
    async fn get(&self, _url: &reqwest::Url) -> Result<reqwest::Response, Error> {
        Err(Error::TransportError("operation timed out".to_string()))
    }
}

#[tokio::test]
async fn transport_errors_are_propagated_unchanged() {
    let envoy = api::envoy_with_transport(
        &EnvoyConfig::default(),
        Box::new(UnreachableTransport),
        true,
    )
    .unwrap();
    let mut acc: Vec<Metric> = Vec::new();
    let error = gather(&envoy, &mut acc).await.unwrap_err();

    assert_eq!(
        Error::TransportError("operation timed out".to_string()),
        error
    );
    assert_eq!("operation timed out", error.to_string());
    assert!(acc.is_empty());
}

#[tokio::test]
async fn empty_documents_yield_zero_reports() {
    for body in &["{}", r#"{"production": [], "consumption": [], "storage": []}"#] {
        let mut server = Server::new_async().await;
        let _production = server
            .mock("GET", "/production.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(*body)
            .create_async()
            .await;

        let envoy = api::envoy(&config(&server, "123456")).unwrap();
        let mut acc: Vec<Metric> = Vec::new();
        gather(&envoy, &mut acc).await.unwrap();

        assert_eq!(2, acc.len(), "{}", body);
        assert_eq!("instant-report", acc[0].measurement);
        assert_eq!("today-report", acc[1].measurement);
        assert!(acc.iter().all(|m| m.measurement != "inverter"));
        for metric in &acc {
            for name in &["production", "consumption", "net", "import", "export"] {
                assert_eq!(0.0, field(metric, name), "{} {}", metric.measurement, name);
            }
        }
    }
}
