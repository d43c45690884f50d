//! Main application orchestration
//!
//! Wires the pipeline together: fetch configuration and catalogue, tag
//! distances, probe for the best server, run the download then upload
//! phases, then render and optionally share the results.

use crate::{
    cli::Cli,
    error::Result,
    fetch::Fetcher,
    geo,
    models::Results,
    output::{self, share, OutputFormat, Reporter},
    probe::LatencyProber,
    protocol::DialOptions,
    ranking,
    throughput::{Direction, ThroughputWorkerPool},
};
use colored::Colorize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Coordinates one complete test run
pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> Result<()> {
        let reporter = Arc::new(Reporter::new(self.cli.interactive()));
        let fetcher = Fetcher::new(self.cli.timeout())?;

        reporter.status("Retrieving speedtest.net configuration...");
        let config = fetcher.configuration().await?;
        reporter.status(&format!(
            "Testing from {} ({})...",
            config.client.isp, config.client.ip
        ));

        reporter.status("Retrieving speedtest.net server list...");
        let servers = fetcher.servers(self.cli.server).await?;

        let mut ranked = geo::tag_distances(
            servers,
            config.client.latitude,
            config.client.longitude,
        );

        if self.cli.list {
            // List lines are narrative: machine-readable modes keep stdout
            // reserved for the final document, so they print nothing here.
            ranking::sort_by_distance(&mut ranked);
            for server in &ranked {
                reporter.status(&output::list_line(server));
            }
            return Ok(());
        }

        let dial = DialOptions::new(self.cli.timeout(), self.cli.source_addr());

        reporter.status("Selecting best server based on latency...");
        let outcome = LatencyProber::new(dial.clone()).select_best(ranked).await?;
        let selected = &outcome.selected;
        reporter.status(&format!(
            "Hosted by {} ({}) [{:.2} km]: {}",
            selected.server.sponsor,
            selected.server.name,
            selected.distance_km,
            format!("{:.2} ms", selected.latency_ms()).bold()
        ));

        let mut results = Results::new(selected);
        let host = selected.server.host.clone();
        let pool = ThroughputWorkerPool::new(dial).with_progress(reporter.clone());

        reporter.status_inline("Testing download speed");
        let download = pool
            .run(&host, Direction::Download, config.download_budget())
            .await?;
        reporter.finish_line();
        debug!(
            bytes = download.bytes_total,
            duration_ms = download.duration.as_millis() as u64,
            "download phase complete"
        );
        results.download = download.bits_per_second;
        results.download_duration = download.duration;
        reporter.status(&format!(
            "Download: {}",
            format!("{:.2} Mbit/s", results.download / 1_000_000.0).bold()
        ));

        reporter.status_inline("Testing upload speed");
        let upload = pool
            .run(&host, Direction::Upload, config.upload_budget())
            .await?;
        reporter.finish_line();
        debug!(
            bytes = upload.bytes_total,
            duration_ms = upload.duration.as_millis() as u64,
            "upload phase complete"
        );
        results.upload = upload.bits_per_second;
        results.upload_duration = upload.duration;
        reporter.status(&format!(
            "Upload: {}",
            format!("{:.2} Mbit/s", results.upload / 1_000_000.0).bold()
        ));

        if self.cli.share {
            match share::submit(&results).await {
                Ok(url) => {
                    reporter.status(&format!("Share results: {}", url));
                    results.share = url;
                }
                Err(e) => warn!(error = %e, "share submission failed"),
            }
        }

        let format = self.output_format();
        if format != OutputFormat::Interactive {
            println!("{}", output::render(&results, format)?);
        }

        Ok(())
    }

    fn output_format(&self) -> OutputFormat {
        if self.cli.json {
            OutputFormat::Json
        } else if self.cli.xml {
            OutputFormat::Xml
        } else if self.cli.csv {
            OutputFormat::Csv
        } else if self.cli.simple {
            OutputFormat::Simple
        } else {
            OutputFormat::Interactive
        }
    }
}
