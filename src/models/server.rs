//! Server catalogue entries and the derived ranking/probing values
//!
//! The catalogue `Server` is read-only once parsed. Distance and latency are
//! not stored on it; each ranking stage wraps the entry in a new value that
//! carries the figure it computed. That keeps concurrent probes from ever
//! aliasing a mutable record.

use serde::Deserialize;
use std::time::Duration;

/// One test endpoint from the remote server catalogue
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@sponsor")]
    pub sponsor: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@country")]
    pub country: String,
    #[serde(rename = "@cc")]
    pub cc: String,
    /// `host:port` address of the socket test endpoint
    #[serde(rename = "@host")]
    pub host: String,
    #[serde(rename = "@lat")]
    pub latitude: f64,
    #[serde(rename = "@lon")]
    pub longitude: f64,
    #[serde(rename = "@url", default)]
    pub url: String,
}

/// A catalogue entry tagged with its great-circle distance from the client.
///
/// Produced once per run, before latency probing.
#[derive(Debug, Clone)]
pub struct RankedServer {
    pub server: Server,
    /// Distance from the client in kilometres
    pub distance_km: f64,
}

/// A ranked server after the latency probe stage.
///
/// `latency` is `Duration::ZERO` when the probe never succeeded; that
/// sentinel orders after every measured value (see [`crate::ranking`]).
#[derive(Debug, Clone)]
pub struct ProbedServer {
    pub server: Server,
    pub distance_km: f64,
    pub latency: Duration,
}

impl ProbedServer {
    /// Whether the probe stage produced a real measurement for this server
    pub fn was_measured(&self) -> bool {
        self.latency > Duration::ZERO
    }

    /// Latency in fractional milliseconds, for presentation
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

/// Catalogue entry factory shared by unit tests across modules.
#[cfg(test)]
pub(crate) fn sample_server(id: u32) -> Server {
    Server {
        id,
        sponsor: "Example Sponsor".to_string(),
        name: "Example City".to_string(),
        country: "Germany".to_string(),
        cc: "DE".to_string(),
        host: "speedtest.example.net:8080".to_string(),
        latitude: 52.52,
        longitude: 13.40,
        url: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalogue_entry() {
        let xml = r#"<server url="http://example.net/upload.php" lat="40.71" lon="-74.00"
            name="New York" country="United States" cc="US"
            sponsor="Example" id="1234" host="nyc.example.net:8080"/>"#;
        let server: Server = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(server.id, 1234);
        assert_eq!(server.host, "nyc.example.net:8080");
        assert!((server.longitude + 74.00).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sentinel_latency_is_unmeasured() {
        let probed = ProbedServer {
            server: sample_server(1),
            distance_km: 5.0,
            latency: Duration::ZERO,
        };
        assert!(!probed.was_measured());
        assert_eq!(probed.latency_ms(), 0.0);

        let measured = ProbedServer {
            latency: Duration::from_millis(20),
            ..probed
        };
        assert!(measured.was_measured());
        assert!((measured.latency_ms() - 20.0).abs() < 1e-9);
    }
}
