//! Socket Speedtest
//!
//! A command line bandwidth tester that speaks the speedtest.net socket
//! protocol: a line-oriented TCP handshake plus PING, DOWNLOAD and UPLOAD
//! commands, driven by a fixed pool of parallel connections.

pub mod app;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod geo;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod protocol;
pub mod ranking;
pub mod throughput;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Configuration, ProbedServer, RankedServer, Results, Server};
pub use protocol::{DialOptions, ProtocolClient};
pub use throughput::{PhaseReport, ThroughputWorkerPool};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Connect + handshake timeout when none is given on the command line.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Number of closest servers probed for latency.
    pub const PROBE_CANDIDATES: usize = 5;

    /// Pings issued per probed server; latency is their arithmetic mean.
    pub const PINGS_PER_PROBE: u32 = 3;

    /// Fixed number of parallel connections per throughput phase.
    pub const WORKER_COUNT: usize = 8;

    pub const CONFIGURATION_URL: &str = "https://www.speedtest.net/speedtest-config.php";
    pub const SERVER_LIST_URL: &str = "https://www.speedtest.net/speedtest-servers.php";
    pub const SHARE_URL: &str = "https://www.speedtest.net/api/api.php";
}
