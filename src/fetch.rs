//! Retrieval of the remote configuration and server catalogue documents

use crate::defaults::{CONFIGURATION_URL, SERVER_LIST_URL};
use crate::error::{AppError, Result};
use crate::models::{Configuration, Server};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename = "settings")]
struct ServerListDocument {
    servers: ServerList,
}

#[derive(Debug, Deserialize)]
struct ServerList {
    #[serde(rename = "server", default)]
    entries: Vec<Server>,
}

/// HTTP client for the two remote XML documents
pub struct Fetcher {
    http: reqwest::Client,
    configuration_url: String,
    server_list_url: String,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_urls(timeout, CONFIGURATION_URL, SERVER_LIST_URL)
    }

    /// Construct against explicit endpoints; used by tests with a local mock
    pub fn with_urls(timeout: Duration, configuration_url: &str, server_list_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config_fetch(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            http,
            configuration_url: configuration_url.to_string(),
            server_list_url: server_list_url.to_string(),
        })
    }

    /// Fetch and parse the remote configuration
    pub async fn configuration(&self) -> Result<Configuration> {
        let body = self
            .get(&self.configuration_url)
            .await
            .map_err(AppError::config_fetch)?;
        let config: Configuration = quick_xml::de::from_str(&body)
            .map_err(|e| AppError::config_fetch(format!("malformed configuration document: {}", e)))?;
        debug!(ip = %config.client.ip, isp = %config.client.isp, "configuration retrieved");
        Ok(config)
    }

    /// Fetch and parse the server catalogue, optionally filtered to one ID.
    ///
    /// An empty catalogue after filtering is an error; there is nothing to
    /// test against.
    pub async fn servers(&self, filter_id: Option<u32>) -> Result<Vec<Server>> {
        let body = self
            .get(&self.server_list_url)
            .await
            .map_err(AppError::server_list_fetch)?;
        let document: ServerListDocument = quick_xml::de::from_str(&body)
            .map_err(|e| AppError::server_list_fetch(format!("malformed server list: {}", e)))?;

        let servers: Vec<Server> = document
            .servers
            .entries
            .into_iter()
            .filter(|server| filter_id.map_or(true, |id| server.id == id))
            .collect();

        if servers.is_empty() {
            return Err(AppError::server_list_fetch(match filter_id {
                Some(id) => format!("no server with ID {}", id),
                None => "server list is empty".to_string(),
            }));
        }

        debug!(count = servers.len(), "server catalogue retrieved");
        Ok(servers)
    }

    async fn get(&self, url: &str) -> std::result::Result<String, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("GET {} failed: {}", url, e))?;
        let response = response
            .error_for_status()
            .map_err(|e| format!("GET {} failed: {}", url, e))?;
        response
            .text()
            .await
            .map_err(|e| format!("reading {} failed: {}", url, e))
    }
}
