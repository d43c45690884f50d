//! Great-circle distance between client and server coordinates

use crate::models::{RankedServer, Server};

/// Mean Earth radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two latitude/longitude points
pub fn great_circle_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Tag every catalogue entry with its distance from the client position.
///
/// Computed exactly once per run, before distance ranking.
pub fn tag_distances(servers: Vec<Server>, client_lat: f64, client_lon: f64) -> Vec<RankedServer> {
    servers
        .into_iter()
        .map(|server| {
            let distance_km =
                great_circle_km(client_lat, client_lon, server.latitude, server.longitude);
            RankedServer {
                server,
                distance_km,
            }
        })
        .collect()
}
