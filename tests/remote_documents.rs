//! Fetching and parsing of the remote configuration and server catalogue,
//! against a local mock HTTP server.

use sockspeed::error::AppError;
use sockspeed::fetch::Fetcher;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings>
  <client ip="198.51.100.7" isp="Test ISP" lat="52.52" lon="13.40"/>
  <server-config threadcount="4" ignoreids=""/>
  <socket-download testlength="15" packetlength="750000"/>
  <socket-upload testlength="15" packetlength="750000"/>
  <socket-latency testlength="10"/>
</settings>"#;

const SERVERS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings>
  <servers>
    <server url="http://a.example/upload.php" lat="52.52" lon="13.40" name="Berlin"
      country="Germany" cc="DE" sponsor="Alpha Net" id="101" host="a.example:8080"/>
    <server url="http://b.example/upload.php" lat="48.85" lon="2.35" name="Paris"
      country="France" cc="FR" sponsor="Beta Net" id="202" host="b.example:8080"/>
    <server url="http://c.example/upload.php" lat="40.71" lon="-74.00" name="New York"
      country="United States" cc="US" sponsor="Gamma Net" id="303" host="c.example:8080"/>
  </servers>
</settings>"#;

async fn mock_directory() -> (MockServer, Fetcher) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/speedtest-config.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONFIG_XML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/speedtest-servers.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SERVERS_XML))
        .mount(&server)
        .await;

    let fetcher = Fetcher::with_urls(
        Duration::from_secs(2),
        &format!("{}/speedtest-config.php", server.uri()),
        &format!("{}/speedtest-servers.php", server.uri()),
    )
    .unwrap();

    (server, fetcher)
}

#[tokio::test]
async fn test_configuration_fetch_and_parse() {
    let (_server, fetcher) = mock_directory().await;

    let config = fetcher.configuration().await.unwrap();
    assert_eq!(config.client.isp, "Test ISP");
    assert!((config.client.latitude - 52.52).abs() < f64::EPSILON);
    assert_eq!(config.download_budget(), Duration::from_secs(15));
    assert_eq!(config.upload_budget(), Duration::from_secs(15));
}

#[tokio::test]
async fn test_server_list_fetch_unfiltered() {
    let (_server, fetcher) = mock_directory().await;

    let servers = fetcher.servers(None).await.unwrap();
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[0].id, 101);
    assert_eq!(servers[2].host, "c.example:8080");
}

#[tokio::test]
async fn test_server_list_filter_by_id() {
    let (_server, fetcher) = mock_directory().await;

    let servers = fetcher.servers(Some(202)).await.unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].name, "Paris");
}

#[tokio::test]
async fn test_unknown_server_id_is_an_error() {
    let (_server, fetcher) = mock_directory().await;

    let err = fetcher.servers(Some(999)).await.unwrap_err();
    assert!(matches!(err, AppError::ServerListFetch(_)));
    assert!(err.to_string().contains("999"));
}

#[tokio::test]
async fn test_http_failure_maps_to_typed_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/speedtest-config.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/speedtest-servers.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = Fetcher::with_urls(
        Duration::from_secs(2),
        &format!("{}/speedtest-config.php", server.uri()),
        &format!("{}/speedtest-servers.php", server.uri()),
    )
    .unwrap();

    assert!(matches!(
        fetcher.configuration().await.unwrap_err(),
        AppError::ConfigFetch(_)
    ));
    assert!(matches!(
        fetcher.servers(None).await.unwrap_err(),
        AppError::ServerListFetch(_)
    ));
}

#[tokio::test]
async fn test_malformed_configuration_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/speedtest-config.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<settings><broken"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::with_urls(
        Duration::from_secs(2),
        &format!("{}/speedtest-config.php", server.uri()),
        &format!("{}/speedtest-servers.php", server.uri()),
    )
    .unwrap();

    assert!(matches!(
        fetcher.configuration().await.unwrap_err(),
        AppError::ConfigFetch(_)
    ));
}
