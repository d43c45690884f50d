//! Command-line interface

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Command line interface for testing internet bandwidth using speedtest.net
#[derive(Parser, Debug, Clone)]
#[command(name = "sockspeed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Display a list of speedtest.net servers sorted by distance
    #[arg(long)]
    pub list: bool,

    /// Specify a server ID to test against
    #[arg(long)]
    pub server: Option<u32>,

    /// Suppress verbose output, only show basic information
    #[arg(long)]
    pub simple: bool,

    /// Suppress verbose output, only show basic information in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress verbose output, only show basic information in XML format
    #[arg(long)]
    pub xml: bool,

    /// Suppress verbose output, only show basic information in CSV format
    #[arg(long)]
    pub csv: bool,

    /// Source IP address to bind to
    #[arg(long)]
    pub source: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Generate and provide a URL to the speedtest.net share results image
    #[arg(long)]
    pub share: bool,
}

impl Cli {
    /// Validate flag combinations and value formats
    pub fn validate(&self) -> Result<(), String> {
        let formats = [self.simple, self.json, self.xml, self.csv]
            .iter()
            .filter(|&&flag| flag)
            .count();
        if formats > 1 {
            return Err("Only one of --simple, --json, --xml, --csv may be given".to_string());
        }

        if self.timeout == 0 {
            return Err("--timeout must be at least 1 second".to_string());
        }

        if let Some(source) = &self.source {
            if IpAddr::from_str(source).is_err() {
                return Err(format!("Could not parse source IP address {}", source));
            }
        }

        Ok(())
    }

    /// Interactive mode means no machine-readable format was selected;
    /// progress narration is only printed then.
    pub fn interactive(&self) -> bool {
        !(self.simple || self.json || self.xml || self.csv)
    }

    /// Connect timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Source address with an ephemeral port, if one was given.
    ///
    /// Call only after `validate()` has accepted the flags.
    pub fn source_addr(&self) -> Option<SocketAddr> {
        self.source
            .as_deref()
            .and_then(|s| IpAddr::from_str(s).ok())
            .map(|ip| SocketAddr::new(ip, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sockspeed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(cli.validate().is_ok());
        assert!(cli.interactive());
        assert_eq!(cli.timeout(), Duration::from_secs(10));
        assert!(cli.source_addr().is_none());
    }

    #[test]
    fn test_conflicting_formats_rejected() {
        let cli = parse(&["--json", "--csv"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_machine_readable_disables_interactive() {
        for flag in ["--simple", "--json", "--xml", "--csv"] {
            assert!(!parse(&[flag]).interactive());
        }
    }

    #[test]
    fn test_source_address_parsing() {
        let cli = parse(&["--source", "192.0.2.10"]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.source_addr().unwrap().to_string(), "192.0.2.10:0");

        let bad = parse(&["--source", "not-an-ip"]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = parse(&["--timeout", "0"]);
        assert!(cli.validate().is_err());
    }
}
