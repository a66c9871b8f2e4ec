//! Retrying HTTP downloads with ETag short-circuiting.
//!
//! A [`Fetcher`] performs a GET, streams the body into a [`Sink`] and hands
//! back the response's ETag. If the caller already holds the same ETag the
//! body is never read. Transient faults are retried with exponential backoff;
//! a 404 is final.

use crate::core::config::FetchConfig;
use crate::utils::progress::DotProgress;
use reqwest::header::{CONTENT_LENGTH, ETAG};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid download URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP Error 404: Not Found ({url})")]
    NotFound { url: String },

    #[error("HTTP Error {status} ({url})")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Response from {url} has no Content-Length")]
    MissingContentLength { url: String },

    #[error("only got {received} of {expected} bytes ({url})")]
    Incomplete {
        url: String,
        received: u64,
        expected: u64,
    },

    #[error("Failed to write download of {url}: {source}")]
    Sink {
        url: String,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            FetchError::Status { .. }
                | FetchError::Transport { .. }
                | FetchError::MissingContentLength { .. }
                | FetchError::Incomplete { .. }
        )
    }
}

/// Result of a successful [`Fetcher::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server's ETag equals the one the caller passed in. The sink was not
    /// written to.
    Unchanged,
    Downloaded { etag: Option<String>, bytes: u64 },
}

impl FetchOutcome {
    pub fn etag(&self) -> Option<&str> {
        match self {
            FetchOutcome::Unchanged => None,
            FetchOutcome::Downloaded { etag, .. } => etag.as_deref(),
        }
    }
}

/// A response whose status line and headers have been received.
pub struct RemoteResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    pub body: Box<dyn Read>,
}

pub trait Transport {
    fn get(&self, url: &Url) -> Result<RemoteResponse, FetchError>;
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Download destination. A retried attempt starts from an empty sink.
pub trait Sink: Write + Seek {
    fn reset(&mut self) -> io::Result<()>;
}

impl Sink for File {
    fn reset(&mut self) -> io::Result<()> {
        self.seek(SeekFrom::Start(0))?;
        self.set_len(0)
    }
}

impl Sink for Cursor<Vec<u8>> {
    fn reset(&mut self) -> io::Result<()> {
        self.set_position(0);
        self.get_mut().clear();
        Ok(())
    }
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| FetchError::Transport {
            url: String::new(),
            message: format!("failed to create HTTP client: {e}"),
        })?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<RemoteResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let headers = response.headers();
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let etag = headers
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(RemoteResponse {
            status: response.status().as_u16(),
            content_length,
            etag,
            body: Box::new(response),
        })
    }
}

/// Per-call download state: what we expect, what we got, and how much retry
/// budget is left.
#[derive(Debug)]
pub struct DownloadSession {
    url: String,
    total_size: u64,
    bytes_received: u64,
    retries_left: u32,
    backoff: Duration,
}

impl DownloadSession {
    pub fn new(url: &str, config: &FetchConfig) -> Self {
        Self {
            url: url.to_string(),
            total_size: 0,
            bytes_received: 0,
            retries_left: config.retries,
            backoff: config.initial_backoff,
        }
    }

    fn begin_attempt(&mut self, total_size: u64) {
        self.total_size = total_size;
        self.bytes_received = 0;
    }

    fn record(&mut self, bytes: usize) {
        self.bytes_received += bytes as u64;
    }

    /// Checks the received byte count against the declared size.
    pub fn validate_length(&self) -> Result<u64, FetchError> {
        if self.bytes_received != self.total_size {
            return Err(FetchError::Incomplete {
                url: self.url.clone(),
                received: self.bytes_received,
                expected: self.total_size,
            });
        }
        Ok(self.bytes_received)
    }

    /// Decides what to do after a failed attempt: the delay to wait before
    /// the next one, or `None` when the fault should be surfaced.
    pub fn on_fault(&mut self, error: &FetchError) -> Option<Duration> {
        if !error.is_retriable() || self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;
        let delay = self.backoff;
        self.backoff = self.backoff.saturating_mul(2);
        Some(delay)
    }

    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }
}

pub struct Fetcher<T = HttpTransport, S = ThreadSleeper> {
    config: FetchConfig,
    transport: T,
    sleeper: S,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_parts(config, transport, ThreadSleeper))
    }
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn with_parts(config: FetchConfig, transport: T, sleeper: S) -> Self {
        Self {
            config,
            transport,
            sleeper,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Downloads `url` into `sink`.
    ///
    /// When `previous_etag` is non-empty and matches the server's ETag the
    /// body is skipped and [`FetchOutcome::Unchanged`] is returned.
    pub fn fetch<W: Sink>(
        &self,
        url: &str,
        sink: &mut W,
        previous_etag: Option<&str>,
    ) -> Result<FetchOutcome, FetchError> {
        let parsed = parse_url(url)?;
        let previous_etag = previous_etag.filter(|etag| !etag.is_empty());
        let mut session = DownloadSession::new(url, &self.config);

        loop {
            print!("Downloading {url} ");
            let _ = io::stdout().flush();

            match self.attempt(&parsed, &mut session, sink, previous_etag) {
                Ok(outcome) => return Ok(outcome),
                Err(error) => {
                    println!();
                    println!("{error}");
                    let Some(delay) = session.on_fault(&error) else {
                        tracing::debug!(url, "giving up: {error}");
                        return Err(error);
                    };
                    println!("{}", retry_message(delay));
                    tracing::debug!(
                        url,
                        retries_left = session.retries_left(),
                        "retrying after {delay:?}"
                    );
                    self.sleeper.sleep(delay);
                    sink.reset().map_err(|source| FetchError::Sink {
                        url: url.to_string(),
                        source,
                    })?;
                }
            }
        }
    }

    /// One pass of request, stream and length check.
    fn attempt<W: Sink>(
        &self,
        url: &Url,
        session: &mut DownloadSession,
        sink: &mut W,
        previous_etag: Option<&str>,
    ) -> Result<FetchOutcome, FetchError> {
        let response = self.transport.get(url)?;
        check_status(url, response.status)?;

        let total_size = response
            .content_length
            .ok_or_else(|| FetchError::MissingContentLength {
                url: url.to_string(),
            })?;

        if previous_etag.is_some() && previous_etag == response.etag.as_deref() {
            println!(" ETag is the same, skipping download.");
            return Ok(FetchOutcome::Unchanged);
        }

        session.begin_attempt(total_size);
        self.stream(url, session, response.body, sink)?;
        let bytes = session.validate_length()?;

        println!(" Done.");
        Ok(FetchOutcome::Downloaded {
            etag: response.etag,
            bytes,
        })
    }

    fn stream<W: Sink>(
        &self,
        url: &Url,
        session: &mut DownloadSession,
        mut body: Box<dyn Read>,
        sink: &mut W,
    ) -> Result<(), FetchError> {
        let mut progress =
            DotProgress::new(io::stdout(), session.total_size, self.config.progress_ticks);
        let mut chunk = vec![0u8; self.config.chunk_size.max(1)];

        loop {
            let read = match body.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
                }
            };
            sink.write_all(&chunk[..read])
                .map_err(|source| FetchError::Sink {
                    url: url.to_string(),
                    source,
                })?;
            session.record(read);
            progress.advance(session.bytes_received);
        }

        sink.flush().map_err(|source| FetchError::Sink {
            url: url.to_string(),
            source,
        })
    }
}

fn retry_message(delay: Duration) -> String {
    format!("Retrying in {} s ...", delay.as_secs())
}

pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

fn check_status(url: &Url, status: u16) -> Result<(), FetchError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(FetchError::NotFound {
            url: url.to_string(),
        }),
        status => Err(FetchError::Status {
            url: url.to_string(),
            status,
        }),
    }
}
