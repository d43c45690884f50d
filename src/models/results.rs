//! Final test results handed to the presentation layer

use crate::models::ProbedServer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// The selected server as it appears in rendered output
#[derive(Debug, Clone, Serialize)]
pub struct ServerReport {
    pub id: u32,
    pub sponsor: String,
    pub name: String,
    pub country: String,
    pub cc: String,
    pub host: String,
    /// Great-circle distance from the client in kilometres
    pub distance: f64,
    /// Mean probe latency in milliseconds
    pub latency: f64,
}

impl From<&ProbedServer> for ServerReport {
    fn from(probed: &ProbedServer) -> Self {
        Self {
            id: probed.server.id,
            sponsor: probed.server.sponsor.clone(),
            name: probed.server.name.clone(),
            country: probed.server.country.clone(),
            cc: probed.server.cc.clone(),
            host: probed.server.host.clone(),
            distance: probed.distance_km,
            latency: probed.latency_ms(),
        }
    }
}

/// Everything one complete run produces.
///
/// Throughput figures are bits per second; latency is the probe-phase mean
/// in milliseconds. `share` stays empty unless a share upload succeeded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "results")]
pub struct Results {
    pub download: f64,
    pub upload: f64,
    pub latency: f64,
    pub server: ServerReport,
    pub timestamp: DateTime<Utc>,
    pub share: String,
    /// Wall-clock duration of the download phase (pool drain time)
    #[serde(skip)]
    pub download_duration: Duration,
    /// Wall-clock duration of the upload phase (pool drain time)
    #[serde(skip)]
    pub upload_duration: Duration,
}

impl Results {
    pub fn new(server: &ProbedServer) -> Self {
        Self {
            download: 0.0,
            upload: 0.0,
            latency: server.latency_ms(),
            server: ServerReport::from(server),
            timestamp: Utc::now(),
            share: String::new(),
            download_duration: Duration::ZERO,
            upload_duration: Duration::ZERO,
        }
    }
}
