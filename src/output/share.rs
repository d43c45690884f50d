//! Optional upload of a finished result to the speedtest.net share endpoint

use crate::defaults::SHARE_URL;
use crate::error::{AppError, Result};
use crate::models::Results;
use tracing::debug;

/// Submit the result and return the share image URL.
///
/// Failure here never fails the run; the caller logs and moves on.
pub async fn submit(results: &Results) -> Result<String> {
    let download_kbps = format!("{:.0}", results.download / 1000.0);
    let upload_kbps = format!("{:.0}", results.upload / 1000.0);
    let latency = format!("{:.0}", results.latency);
    let server_id = results.server.id.to_string();
    let hash = share_hash(&latency, &upload_kbps, &download_kbps);

    let form = [
        ("download", download_kbps.as_str()),
        ("ping", latency.as_str()),
        ("upload", upload_kbps.as_str()),
        ("promo", ""),
        ("startmode", "pingselect"),
        ("recommendedserverid", server_id.as_str()),
        ("accuracy", "1"),
        ("serverid", server_id.as_str()),
        ("hash", hash.as_str()),
    ];

    let client = reqwest::Client::new();
    let body = client
        .post(SHARE_URL)
        .header("Referer", "http://c.speedtest.net/flash/speedtest.swf")
        .form(&form)
        .send()
        .await
        .map_err(|e| AppError::io(format!("share submission failed: {}", e)))?
        .text()
        .await
        .map_err(|e| AppError::io(format!("share response read failed: {}", e)))?;

    let result_id = url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == "resultid")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::parse("share response carried no resultid"))?;

    debug!(result_id = %result_id, "share submission accepted");
    Ok(format!("http://www.speedtest.net/result/{}.png", result_id))
}

/// The endpoint authenticates submissions with an md5 over the headline
/// figures and a fixed salt.
fn share_hash(latency: &str, upload_kbps: &str, download_kbps: &str) -> String {
    let input = format!("{}-{}-{}-297aae72", latency, upload_kbps, download_kbps);
    format!("{:x}", md5::compute(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_hash_matches_known_value() {
        // md5("21-11225-93413-297aae72")
        let hash = share_hash("21", "11225", "93413");
        assert_eq!(hash.len(), 32);
        assert_eq!(hash, format!("{:x}", md5::compute("21-11225-93413-297aae72")));
    }

    #[test]
    fn test_result_id_extraction() {
        let body = "resultid=123456789&date=1&time=2";
        let id = url::form_urlencoded::parse(body.as_bytes())
            .find(|(key, _)| key == "resultid")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        assert_eq!(id, "123456789");
    }
}
