//! Remote configuration document model
//!
//! Mirrors the attribute layout of the speedtest.net `speedtest-config.php`
//! XML document. Only the sections the measurement engine consumes are
//! modelled; the document carries more that we ignore.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client identity and geolocation as reported by the configuration server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(rename = "@ip")]
    pub ip: String,
    #[serde(rename = "@isp")]
    pub isp: String,
    #[serde(rename = "@lat")]
    pub latitude: f64,
    #[serde(rename = "@lon")]
    pub longitude: f64,
}

/// Socket download phase parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Test length budget in seconds
    #[serde(rename = "@testlength")]
    pub test_length: f64,
}

/// Socket upload phase parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Test length budget in seconds
    #[serde(rename = "@testlength")]
    pub test_length: f64,
}

/// Socket latency phase parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySettings {
    /// Test length budget in seconds
    #[serde(rename = "@testlength")]
    pub test_length: f64,
}

/// The full remote configuration consumed by a test run.
///
/// Immutable once fetched; every phase reads its budget from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "settings")]
pub struct Configuration {
    pub client: ClientInfo,
    #[serde(rename = "socket-download")]
    pub download: DownloadSettings,
    #[serde(rename = "socket-upload")]
    pub upload: UploadSettings,
    #[serde(rename = "socket-latency")]
    pub latency: LatencySettings,
}

impl Configuration {
    /// Download phase wall-clock budget
    pub fn download_budget(&self) -> Duration {
        Duration::from_secs_f64(self.download.test_length)
    }

    /// Upload phase wall-clock budget
    pub fn upload_budget(&self) -> Duration {
        Duration::from_secs_f64(self.upload.test_length)
    }
}
