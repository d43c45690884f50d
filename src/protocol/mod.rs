//! Wire protocol client for speedtest.net socket servers
//!
//! The protocol is deliberately primitive: newline-delimited ASCII command
//! lines followed by raw binary payloads. One `ProtocolClient` owns one TCP
//! connection; the handshake happens once at connect time and every later
//! command reuses the same stream. Payload bytes are never interpreted, only
//! counted.

use crate::error::{AppError, Result};
use chrono::Utc;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tracing::warn;

/// Size of the reusable read buffer, and the cap on a single response read
const READ_BUFFER_SIZE: usize = 1024;

/// Length of the acknowledgment a server sends after an upload
const UPLOAD_ACK_LEN: usize = 24;

/// Connection parameters passed explicitly to everything that dials out
#[derive(Debug, Clone)]
pub struct DialOptions {
    /// Connect + handshake timeout
    pub timeout: Duration,
    /// Optional local address to bind before connecting
    pub source: Option<SocketAddr>,
}

impl DialOptions {
    pub fn new(timeout: Duration, source: Option<SocketAddr>) -> Self {
        Self { timeout, source }
    }
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            timeout: crate::defaults::DEFAULT_TIMEOUT,
            source: None,
        }
    }
}

/// One handshaken connection to a socket test server
#[derive(Debug)]
pub struct ProtocolClient {
    stream: TcpStream,
    buf: [u8; READ_BUFFER_SIZE],
    peer: String,
}

impl ProtocolClient {
    /// Dial `host` (a `host:port` string), bind the optional source address,
    /// and perform the `HI` handshake.
    ///
    /// Any failure here is a [`AppError::Connection`]; the acknowledgment
    /// contents are not validated beyond the read succeeding.
    pub async fn connect(host: &str, opts: &DialOptions) -> Result<Self> {
        let addr = resolve(host).await?;
        let stream = tokio::time::timeout(opts.timeout, dial(addr, opts.source))
            .await
            .map_err(|_| {
                AppError::connection(format!("connect to {} timed out", host))
            })??;

        let mut client = Self {
            stream,
            buf: [0u8; READ_BUFFER_SIZE],
            peer: host.to_string(),
        };

        tokio::time::timeout(opts.timeout, client.handshake())
            .await
            .map_err(|_| {
                AppError::connection(format!("handshake with {} timed out", host))
            })??;

        Ok(client)
    }

    /// Address of the peer this client is connected to
    pub fn peer(&self) -> &str {
        &self.peer
    }

    async fn handshake(&mut self) -> Result<()> {
        self.stream.write_all(b"HI\n").await.map_err(|e| {
            AppError::connection(format!("handshake write to {} failed: {}", self.peer, e))
        })?;
        let n = self.stream.read(&mut self.buf).await.map_err(|e| {
            AppError::connection(format!("handshake read from {} failed: {}", self.peer, e))
        })?;
        // A peer that closes before sending any acknowledgment has rejected
        // the connection; an empty read here is a failed handshake, not a
        // normal end-of-stream.
        if n == 0 {
            return Err(AppError::connection(format!(
                "{} closed the connection during handshake",
                self.peer
            )));
        }
        Ok(())
    }

    /// Issue one `PING` and return the round-trip time.
    ///
    /// The response body carries no information we use; only the elapsed
    /// wall-clock time is meaningful.
    pub async fn ping(&mut self) -> Result<Duration> {
        let start = Instant::now();
        let line = format!("PING {}\n", Utc::now().timestamp_millis());
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.read(&mut self.buf).await?;
        Ok(start.elapsed())
    }

    /// Request `n` bytes from the server and count what actually arrives.
    ///
    /// The peer closing the stream early is a normal terminator; any other
    /// read error ends the transfer with the bytes counted so far. The
    /// return value never exceeds `n`.
    pub async fn download(&mut self, n: u64) -> Result<u64> {
        let line = format!("DOWNLOAD {}\n", n);
        self.stream.write_all(line.as_bytes()).await?;

        let mut received: u64 = 0;
        while received < n {
            let want = usize::min(READ_BUFFER_SIZE, (n - received) as usize);
            match self.stream.read(&mut self.buf[..want]).await {
                Ok(0) => break,
                Ok(count) => received += count as u64,
                Err(e) => {
                    warn!(peer = %self.peer, error = %e, "download read error");
                    break;
                }
            }
        }
        Ok(received)
    }

    /// Send `n` bytes to the server: an `UPLOAD` header line plus a
    /// zero-filled payload sized so the total on the wire equals `n`.
    ///
    /// Returns `n` once the fixed-length acknowledgment arrives. `n` must
    /// exceed the header length; smaller values are a caller contract error.
    pub async fn upload(&mut self, n: u64) -> Result<u64> {
        let header = format!("UPLOAD {} 0\n", n);
        if n <= header.len() as u64 {
            return Err(AppError::validation(format!(
                "upload size {} does not exceed header length {}",
                n,
                header.len()
            )));
        }

        let payload = vec![0u8; n as usize - header.len()];
        self.stream.write_all(header.as_bytes()).await?;
        self.stream.write_all(&payload).await?;

        let mut ack = [0u8; UPLOAD_ACK_LEN];
        self.stream.read_exact(&mut ack).await?;
        Ok(n)
    }
}

async fn resolve(host: &str) -> Result<SocketAddr> {
    lookup_host(host)
        .await
        .map_err(|e| AppError::connection(format!("cannot resolve {}: {}", host, e)))?
        .next()
        .ok_or_else(|| AppError::connection(format!("no addresses for {}", host)))
}

async fn dial(addr: SocketAddr, source: Option<SocketAddr>) -> Result<TcpStream> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(|e| AppError::connection(format!("socket setup failed: {}", e)))?;

    if let Some(local) = source {
        socket
            .bind(local)
            .map_err(|e| AppError::connection(format!("cannot bind source {}: {}", local, e)))?;
    }

    socket
        .connect(addr)
        .await
        .map_err(|e| AppError::connection(format!("connect to {} failed: {}", addr, e)))
}
