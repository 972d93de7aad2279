use serde::Deserialize;

use crate::Error;
use crate::response::DispositionType;

/// Default upper bound on upstream receive throughput, in bytes per second.
pub const DEFAULT_RATE_LIMIT: u64 = 2000 * 1024;

/// Process-wide serving configuration.
///
/// Built once at startup (typically deserialized from the application's
/// config file) and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Maximum bytes per second pulled from the backing store per transfer.
    pub rate_limit: u64,
    /// Hash the full file content into an `ETag`.
    pub auto_etag: bool,
    /// Set `Last-Modified` from the file's modification time.
    pub auto_last_modified: bool,
    /// Mark responses `Cache-Control: public`.
    pub public: bool,
    /// Honour the `X-Sendfile-Type` request header and delegate the transfer
    /// to the fronting server. Only enable behind a proxy that sets it.
    pub trust_x_sendfile: bool,
    pub disposition: Option<DispositionType>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        ServeConfig {
            rate_limit: DEFAULT_RATE_LIMIT,
            auto_etag: false,
            auto_last_modified: true,
            public: true,
            trust_x_sendfile: false,
            disposition: None,
        }
    }
}

impl ServeConfig {
    /// Rejects configurations that cannot be served with.
    pub fn validate(self) -> Result<Self, Error> {
        if self.rate_limit == 0 {
            return Err(Error::InvalidRateLimit);
        }
        tracing::info!(
            rate_limit = self.rate_limit,
            trust_x_sendfile = self.trust_x_sendfile,
            "file serving configured"
        );
        Ok(self)
    }
}
