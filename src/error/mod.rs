//! Error handling for the socket speedtest

use thiserror::Error;

/// Custom error types for the socket speedtest
#[derive(Error, Debug)]
pub enum AppError {
    /// Failure retrieving or parsing the remote configuration document
    #[error("Configuration fetch error: {0}")]
    ConfigFetch(String),

    /// Failure retrieving or parsing the server list document
    #[error("Server list fetch error: {0}")]
    ServerListFetch(String),

    /// TCP connect or protocol handshake failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Every latency probe candidate failed to produce a measurement
    #[error("Unable to determine a usable server: {0}")]
    AllProbesFailed(String),

    /// A throughput worker's connection failed after the phase started
    #[error("Worker connection failed during throughput test: {0}")]
    WorkerFatal(String),

    /// Parsing errors (XML documents, addresses, response bodies)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Caller contract or input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors outside the connection lifecycle
    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Create a new configuration fetch error
    pub fn config_fetch<S: Into<String>>(message: S) -> Self {
        Self::ConfigFetch(message.into())
    }

    /// Create a new server list fetch error
    pub fn server_list_fetch<S: Into<String>>(message: S) -> Self {
        Self::ServerListFetch(message.into())
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    /// Create a new all-probes-failed error
    pub fn all_probes_failed<S: Into<String>>(message: S) -> Self {
        Self::AllProbesFailed(message.into())
    }

    /// Create a new worker fatal error
    pub fn worker_fatal<S: Into<String>>(message: S) -> Self {
        Self::WorkerFatal(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigFetch(_) => "CONFIG",
            Self::ServerListFetch(_) => "SERVERS",
            Self::Connection(_) => "CONNECT",
            Self::AllProbesFailed(_) => "PROBE",
            Self::WorkerFatal(_) => "WORKER",
            Self::Parse(_) => "PARSE",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Parse(_) => 1,
            Self::ConfigFetch(_) | Self::ServerListFetch(_) => 2,
            Self::Connection(_) | Self::AllProbesFailed(_) | Self::WorkerFatal(_) => 3,
            Self::Io(_) => 4,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias using our custom error
pub type Result<T> = std::result::Result<T, AppError>;
