//! Server ordering: by distance before probing, by measured latency after
//!
//! Both sorts are stable, so equal keys keep their input order. The latency
//! sort treats `Duration::ZERO` as "never measured": it orders after every
//! nonzero latency no matter how large, because an unprobed or unreachable
//! server is worse than any server we actually heard back from.

use crate::models::{ProbedServer, RankedServer};
use std::cmp::Ordering;
use std::time::Duration;

/// Sort candidates by ascending great-circle distance from the client.
pub fn sort_by_distance(servers: &mut [RankedServer]) {
    servers.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
}

/// Sort the probe set by ascending latency, zero sentinel last.
pub fn sort_by_latency(servers: &mut [ProbedServer]) {
    servers.sort_by(|a, b| compare_latency(a.latency, b.latency));
}

fn compare_latency(a: Duration, b: Duration) -> Ordering {
    match (a == Duration::ZERO, b == Duration::ZERO) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::sample_server;

    fn ranked(id: u32, distance_km: f64) -> RankedServer {
        RankedServer {
            server: sample_server(id),
            distance_km,
        }
    }

    fn probed(id: u32, latency_ms: u64) -> ProbedServer {
        ProbedServer {
            server: sample_server(id),
            distance_km: 0.0,
            latency: Duration::from_millis(latency_ms),
        }
    }

    #[test]
    fn test_distance_sort_ascending() {
        let mut servers = vec![ranked(1, 10.0), ranked(2, 50.0), ranked(3, 2.0)];
        sort_by_distance(&mut servers);
        let ids: Vec<u32> = servers.iter().map(|s| s.server.id).collect();
        assert_eq!(ids, [3, 1, 2]);
    }

    #[test]
    fn test_distance_sort_ties_keep_input_order() {
        let mut servers = vec![ranked(1, 5.0), ranked(2, 5.0), ranked(3, 1.0), ranked(4, 5.0)];
        sort_by_distance(&mut servers);
        let ids: Vec<u32> = servers.iter().map(|s| s.server.id).collect();
        assert_eq!(ids, [3, 1, 2, 4]);
    }

    #[test]
    fn test_latency_sort_ascending_among_measured() {
        let mut servers = vec![probed(1, 35), probed(2, 20), probed(3, 90)];
        sort_by_latency(&mut servers);
        let ids: Vec<u32> = servers.iter().map(|s| s.server.id).collect();
        assert_eq!(ids, [2, 1, 3]);
    }

    #[test]
    fn test_zero_sentinel_sorts_after_any_measurement() {
        let mut servers = vec![probed(1, 0), probed(2, 900), probed(3, 1)];
        sort_by_latency(&mut servers);
        let ids: Vec<u32> = servers.iter().map(|s| s.server.id).collect();
        assert_eq!(ids, [3, 2, 1]);
    }

    #[test]
    fn test_all_sentinels_keep_input_order() {
        let mut servers = vec![probed(5, 0), probed(6, 0), probed(7, 0)];
        sort_by_latency(&mut servers);
        let ids: Vec<u32> = servers.iter().map(|s| s.server.id).collect();
        assert_eq!(ids, [5, 6, 7]);
    }
}
