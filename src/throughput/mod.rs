//! Time-boxed concurrent throughput measurement
//!
//! One phase drives a fixed pool of workers against a single server, each
//! worker owning one exclusive connection for the whole phase. Work arrives
//! through a bounded hand-off queue fed from a fixed ascending size ladder;
//! ramping sizes approximate TCP slow start so a fast link is not starved by
//! undersized transfers and a slow link is not handed transfers that can
//! never finish.
//!
//! The duration bound is cooperative: a worker checks the elapsed time
//! before each chunk, never mid-read, so a single in-flight chunk may overrun
//! the budget by its own transfer time. A worker whose connection fails at
//! startup cancels a shared token; siblings stop at their next checkpoint and
//! the phase surfaces one `WorkerFatal` error with the partial byte count.

use crate::defaults::WORKER_COUNT;
use crate::error::{AppError, Result};
use crate::protocol::{DialOptions, ProtocolClient};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Download task sizes in bytes, each enqueued [`TASK_REPEAT`] times
const DOWNLOAD_LADDER: &[u64] = &[
    245_388, 505_544, 1_118_012, 1_986_284, 4_468_241, 7_907_740, 12_407_926, 17_816_816,
    24_262_167, 31_625_365,
];

/// Upload task sizes in bytes, each enqueued [`TASK_REPEAT`] times
const UPLOAD_LADDER: &[u64] = &[
    32_768, 65_536, 131_072, 262_144, 524_288, 1_048_576, 7_340_032,
];

/// How many times each ladder size is enqueued
const TASK_REPEAT: usize = 4;

/// Largest single DOWNLOAD request a worker will issue
const DOWNLOAD_CHUNK_CAP: u64 = 1_000_000;

/// Largest single UPLOAD request a worker will issue
const UPLOAD_CHUNK_CAP: u64 = 100_000;

/// Transfer direction of one throughput phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    fn ladder(self) -> &'static [u64] {
        match self {
            Self::Download => DOWNLOAD_LADDER,
            Self::Upload => UPLOAD_LADDER,
        }
    }

    fn chunk_cap(self) -> u64 {
        match self {
            Self::Download => DOWNLOAD_CHUNK_CAP,
            Self::Upload => UPLOAD_CHUNK_CAP,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Upload => "upload",
        }
    }
}

/// Sink for coarse progress signals; one tick per task boundary
pub trait ProgressSink: Send + Sync {
    fn tick(&self);
}

/// Byte counts one worker actually transferred, in the order it moved them
type WorkerOutcome = Vec<u64>;

/// Aggregated figures for one completed phase
#[derive(Debug, Clone)]
pub struct PhaseReport {
    /// Sum of every transfer across all workers
    pub bytes_total: u64,
    /// Wall-clock time from first enqueue to last worker joined
    pub duration: Duration,
    /// `bytes_total * 8 / duration`
    pub bits_per_second: f64,
}

/// Fixed-size pool of connection-owning transfer workers
pub struct ThroughputWorkerPool {
    dial: DialOptions,
    workers: usize,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl ThroughputWorkerPool {
    pub fn new(dial: DialOptions) -> Self {
        Self {
            dial,
            workers: WORKER_COUNT,
            progress: None,
        }
    }

    /// Attach a progress sink for interactive output
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run one phase against `host`, bounded by `budget`.
    ///
    /// The call returns only after every worker has exited; stragglers extend
    /// the reported duration. On a worker connection failure the remaining
    /// workers are cancelled cooperatively and the error carries whatever
    /// partial outcome was collected.
    pub async fn run(&self, host: &str, direction: Direction, budget: Duration) -> Result<PhaseReport> {
        let start = Instant::now();
        let (task_tx, task_rx) = async_channel::bounded::<u64>(1);
        let cancel = CancellationToken::new();

        let mut handles = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let ctx = WorkerContext {
                host: host.to_string(),
                dial: self.dial.clone(),
                direction,
                budget,
                start,
                tasks: task_rx.clone(),
                cancel: cancel.clone(),
                progress: self.progress.clone(),
            };
            handles.push(tokio::spawn(ctx.run()));
        }
        drop(task_rx);

        for &size in direction.ladder() {
            for _ in 0..TASK_REPEAT {
                // Send fails only when every worker has exited, which already
                // implies cancellation or a fully drained pool.
                if task_tx.send(size).await.is_err() {
                    break;
                }
            }
        }
        drop(task_tx);

        // Hard join barrier: the phase cannot report until every worker has
        // exited, stragglers included.
        let joined = futures::future::join_all(handles).await;
        let mut outcomes: Vec<WorkerOutcome> = Vec::with_capacity(self.workers);
        let mut fatal: Option<AppError> = None;
        for joined_worker in joined {
            match joined_worker {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(e)) => fatal = Some(fatal.take().unwrap_or(e)),
                Err(e) => {
                    fatal = Some(
                        fatal
                            .take()
                            .unwrap_or_else(|| AppError::worker_fatal(format!("worker panicked: {}", e))),
                    )
                }
            }
        }
        let duration = start.elapsed();

        if let Some(e) = fatal {
            let partial: u64 = outcomes.iter().flatten().sum();
            return Err(AppError::worker_fatal(format!(
                "{} phase against {}: {} ({} workers finished, {} bytes moved)",
                direction.label(),
                host,
                e,
                outcomes.len(),
                partial
            )));
        }

        Ok(aggregate(&outcomes, duration))
    }
}

/// Reduce per-worker outcomes to one throughput figure.
///
/// The sum is commutative, so the figure is independent of which worker
/// claimed which task.
pub fn aggregate(outcomes: &[WorkerOutcome], duration: Duration) -> PhaseReport {
    let bytes_total: u64 = outcomes.iter().flatten().sum();
    let secs = duration.as_secs_f64();
    let bits_per_second = if secs > 0.0 {
        bytes_total as f64 * 8.0 / secs
    } else {
        0.0
    };
    PhaseReport {
        bytes_total,
        duration,
        bits_per_second,
    }
}

/// Everything one worker needs, passed explicitly instead of reaching back
/// into the pool
struct WorkerContext {
    host: String,
    dial: DialOptions,
    direction: Direction,
    budget: Duration,
    start: Instant,
    tasks: async_channel::Receiver<u64>,
    cancel: CancellationToken,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl WorkerContext {
    async fn run(self) -> Result<WorkerOutcome> {
        // One connection per worker for the whole phase, handshaken before
        // any task is consumed. Failure here is fatal to the phase.
        let mut client = match ProtocolClient::connect(&self.host, &self.dial).await {
            Ok(client) => client,
            Err(e) => {
                self.cancel.cancel();
                return Err(e);
            }
        };

        let mut out: WorkerOutcome = Vec::new();
        loop {
            let size = tokio::select! {
                _ = self.cancel.cancelled() => break,
                task = self.tasks.recv() => match task {
                    Ok(size) => size,
                    Err(_) => break, // queue closed, no more work
                },
            };

            self.tick();
            let mut remaining = size;
            while remaining > 0
                && self.start.elapsed() < self.budget
                && !self.cancel.is_cancelled()
            {
                let chunk = u64::min(remaining, self.direction.chunk_cap());
                let moved = match self.transfer(&mut client, chunk).await {
                    Ok(moved) => moved,
                    Err(e) => {
                        warn!(host = %self.host, error = %e, "transfer error, abandoning task");
                        break;
                    }
                };
                out.push(moved);
                remaining = remaining.saturating_sub(moved);
                if moved == 0 {
                    // Dead stream; the next task will fare no better, but the
                    // queue still has to drain, so give up on this one only.
                    break;
                }
            }
            self.tick();
        }

        Ok(out)
    }

    async fn transfer(&self, client: &mut ProtocolClient, chunk: u64) -> Result<u64> {
        match self.direction {
            Direction::Download => client.download(chunk).await,
            Direction::Upload => client.upload(chunk).await,
        }
    }

    fn tick(&self) {
        if let Some(progress) = &self.progress {
            progress.tick();
        }
    }
}
