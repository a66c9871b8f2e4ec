use std::time::Duration;

/// Tunables for a single download. The defaults are what the build pipeline
/// has always used; callers only override them from command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before the first retry, doubled before each following one.
    pub initial_backoff: Duration,
    pub chunk_size: usize,
    /// Number of progress dots printed over a complete download.
    pub progress_ticks: u64,
    pub user_agent: String,
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_SECS: u64 = 5;
pub const DEFAULT_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_PROGRESS_TICKS: u64 = 10;

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            retries: DEFAULT_RETRIES,
            initial_backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_ticks: DEFAULT_PROGRESS_TICKS,
            user_agent: format!("build-deps/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }
}

impl FetchConfig {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
