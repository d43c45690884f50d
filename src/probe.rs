//! Latency probing and best-server selection
//!
//! Probes the closest few candidates sequentially; probing is cheap, so no
//! concurrency is needed here. A candidate that fails to connect keeps the
//! zero-latency sentinel and drops to the bottom of the latency ordering.

use crate::defaults::{PINGS_PER_PROBE, PROBE_CANDIDATES};
use crate::error::{AppError, Result};
use crate::models::{ProbedServer, RankedServer};
use crate::protocol::{DialOptions, ProtocolClient};
use crate::ranking;
use std::time::Duration;
use tracing::{debug, warn};

/// Selects the lowest-latency server among the closest probe candidates
pub struct LatencyProber {
    dial: DialOptions,
}

/// Outcome of the probe phase: the chosen server plus the full probe set in
/// latency order, for listing and diagnostics.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub selected: ProbedServer,
    pub probe_set: Vec<ProbedServer>,
}

impl LatencyProber {
    pub fn new(dial: DialOptions) -> Self {
        Self { dial }
    }

    /// Probe the closest candidates and return the best server.
    ///
    /// Connection failures on individual candidates are recoverable and only
    /// logged; the phase fails with [`AppError::AllProbesFailed`] when no
    /// candidate produced a measurement.
    pub async fn select_best(&self, mut candidates: Vec<RankedServer>) -> Result<ProbeOutcome> {
        if candidates.is_empty() {
            return Err(AppError::validation("no servers to probe"));
        }

        ranking::sort_by_distance(&mut candidates);
        candidates.truncate(PROBE_CANDIDATES);

        let mut probe_set = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let latency = self.probe_one(&candidate).await;
            probe_set.push(ProbedServer {
                server: candidate.server,
                distance_km: candidate.distance_km,
                latency,
            });
        }

        ranking::sort_by_latency(&mut probe_set);

        let selected = probe_set[0].clone();
        if !selected.was_measured() {
            return Err(AppError::all_probes_failed(format!(
                "all {} probe candidates failed to connect",
                probe_set.len()
            )));
        }

        Ok(ProbeOutcome {
            selected,
            probe_set,
        })
    }

    /// Measure one candidate: handshake, then the mean of three pings.
    ///
    /// Returns the zero sentinel on any failure.
    async fn probe_one(&self, candidate: &RankedServer) -> Duration {
        let mut client = match ProtocolClient::connect(&candidate.server.host, &self.dial).await {
            Ok(client) => client,
            Err(e) => {
                warn!(host = %candidate.server.host, error = %e, "probe connect failed, skipping");
                return Duration::ZERO;
            }
        };

        let mut sum = Duration::ZERO;
        for _ in 0..PINGS_PER_PROBE {
            match client.ping().await {
                Ok(rtt) => sum += rtt,
                Err(e) => {
                    warn!(host = %candidate.server.host, error = %e, "ping failed, skipping server");
                    return Duration::ZERO;
                }
            }
        }

        let mean = sum / PINGS_PER_PROBE;
        debug!(host = %candidate.server.host, latency_ms = mean.as_secs_f64() * 1000.0, "probe complete");
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::sample_server;

    #[tokio::test]
    async fn test_empty_candidate_set_is_rejected() {
        let prober = LatencyProber::new(DialOptions::default());
        let err = prober.select_best(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unreachable_candidates_fail_the_phase() {
        // TEST-NET-1 addresses with a short timeout never complete a
        // handshake, so every probe keeps the sentinel.
        let mut server = sample_server(1);
        server.host = "192.0.2.1:1".to_string();
        let candidates = vec![RankedServer {
            server,
            distance_km: 1.0,
        }];

        let dial = DialOptions::new(Duration::from_millis(50), None);
        let err = LatencyProber::new(dial)
            .select_best(candidates)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AllProbesFailed(_)));
    }
}
