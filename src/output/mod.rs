//! Result rendering and interactive progress narration

pub mod share;

use crate::error::{AppError, Result};
use crate::models::{RankedServer, Results};
use crate::throughput::ProgressSink;
use std::io::{self, Write};
use std::sync::Mutex;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Progress narrative plus human-readable figures
    Interactive,
    /// Three-line summary
    Simple,
    Json,
    Xml,
    Csv,
}

/// Interactive progress printer.
///
/// Silent unless the run is interactive, mirroring how machine-readable
/// formats must keep stdout clean for the final document.
pub struct Reporter {
    interactive: bool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
    pub fn new(interactive: bool) -> Self {
        Self::with_writer(interactive, Box::new(io::stdout()))
    }

    /// Construct over an explicit sink; tests capture narrative this way
    pub fn with_writer(interactive: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            interactive,
            out: Mutex::new(out),
        }
    }

    /// Print one line of progress narrative
    pub fn status(&self, message: &str) {
        if self.interactive {
            if let Ok(mut out) = self.out.lock() {
                let _ = writeln!(out, "{}", message);
            }
        }
    }

    /// Print without a trailing newline (phase banners that dots follow)
    pub fn status_inline(&self, message: &str) {
        if self.interactive {
            if let Ok(mut out) = self.out.lock() {
                let _ = write!(out, "{}", message);
                let _ = out.flush();
            }
        }
    }

    /// Terminate a dotted progress line
    pub fn finish_line(&self) {
        if self.interactive {
            if let Ok(mut out) = self.out.lock() {
                let _ = writeln!(out);
            }
        }
    }
}

impl ProgressSink for Reporter {
    fn tick(&self) {
        if self.interactive {
            if let Ok(mut out) = self.out.lock() {
                let _ = write!(out, ".");
                let _ = out.flush();
            }
        }
    }
}

/// Render the final results in the selected format
pub fn render(results: &Results, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Interactive => Ok(String::new()),
        OutputFormat::Simple => Ok(to_simple(results)),
        OutputFormat::Json => serde_json::to_string_pretty(results)
            .map_err(|e| AppError::io(format!("JSON encoding failed: {}", e))),
        OutputFormat::Xml => to_xml(results),
        OutputFormat::Csv => Ok(to_csv(results)),
    }
}

fn to_simple(results: &Results) -> String {
    format!(
        "Latency: {:.2} ms\nDownload: {:.2} Mbit/s\nUpload: {:.2} Mbit/s",
        results.latency,
        results.download / 1_000_000.0,
        results.upload / 1_000_000.0
    )
}

fn to_xml(results: &Results) -> Result<String> {
    let body = quick_xml::se::to_string(results)
        .map_err(|e| AppError::io(format!("XML encoding failed: {}", e)))?;
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", body))
}

/// One CSV record:
/// `ID,Sponsor,Name,Timestamp,Distance (km),Latency (ms),Download (bits/s),Upload (bits/s)`
fn to_csv(results: &Results) -> String {
    [
        results.server.id.to_string(),
        csv_field(&results.server.sponsor),
        csv_field(&results.server.name),
        results.timestamp.to_rfc3339(),
        format!("{}", results.server.distance),
        format!("{}", results.latency),
        format!("{}", results.download),
        format!("{}", results.upload),
    ]
    .join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One line of the `--list` output: server identity plus distance
pub fn list_line(ranked: &RankedServer) -> String {
    format!(
        "{:5}) {} ({}, {}) [{:.2} km]",
        ranked.server.id,
        ranked.server.sponsor,
        ranked.server.name,
        ranked.server.country,
        ranked.distance_km
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::sample_server;
    use crate::models::ProbedServer;
    use std::time::Duration;

    fn sample_results() -> Results {
        let probed = ProbedServer {
            server: sample_server(42),
            distance_km: 3.25,
            latency: Duration::from_millis(21),
        };
        let mut results = Results::new(&probed);
        results.download = 80_000_000.0;
        results.upload = 20_000_000.0;
        results
    }

    #[test]
    fn test_simple_format() {
        let text = to_simple(&sample_results());
        assert_eq!(
            text,
            "Latency: 21.00 ms\nDownload: 80.00 Mbit/s\nUpload: 20.00 Mbit/s"
        );
    }

    #[test]
    fn test_csv_field_order() {
        let results = sample_results();
        let record = to_csv(&results);
        let fields: Vec<&str> = record.split(',').collect();
        assert_eq!(fields[0], "42");
        assert_eq!(fields[1], "Example Sponsor");
        assert_eq!(fields[2], "Example City");
        assert_eq!(fields[4], "3.25");
        assert_eq!(fields[5], "21");
        assert_eq!(fields[6], "80000000");
        assert_eq!(fields[7], "20000000");
    }

    #[test]
    fn test_csv_quotes_embedded_commas() {
        assert_eq!(csv_field("Acme, Inc."), "\"Acme, Inc.\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn test_json_render_parses_back() {
        let rendered = render(&sample_results(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["server"]["id"], 42);
    }

    #[test]
    fn test_xml_render_has_header() {
        let rendered = render(&sample_results(), OutputFormat::Xml).unwrap();
        assert!(rendered.starts_with("<?xml version=\"1.0\""));
        assert!(rendered.contains("<results>"));
    }

    /// Write sink whose contents remain inspectable after the reporter
    /// takes ownership of a clone.
    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reporter_prints_when_interactive() {
        let buf = SharedBuf::default();
        let reporter = Reporter::with_writer(true, Box::new(buf.clone()));
        reporter.status("Selecting best server based on latency...");
        reporter.status_inline("Testing download speed");
        reporter.tick();
        reporter.finish_line();

        let text = buf.contents();
        assert!(text.contains("Selecting best server based on latency...\n"));
        assert!(text.contains("Testing download speed."));
    }

    #[test]
    fn test_reporter_silent_when_machine_readable() {
        let buf = SharedBuf::default();
        let reporter = Reporter::with_writer(false, Box::new(buf.clone()));
        reporter.status("narrative line");
        reporter.status(&list_line(&RankedServer {
            server: sample_server(9),
            distance_km: 1.0,
        }));
        reporter.status_inline("banner");
        reporter.tick();
        reporter.finish_line();

        assert!(buf.contents().is_empty());
    }

    #[test]
    fn test_list_line_shape() {
        let ranked = RankedServer {
            server: sample_server(7),
            distance_km: 12.345,
        };
        let line = list_line(&ranked);
        assert!(line.contains("Example Sponsor"));
        assert!(line.contains("[12.35 km]"));
    }
}
