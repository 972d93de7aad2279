use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::http::header::RANGE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use http_body::{Body, Frame, SizeHint};
use once_cell::sync::Lazy;
use pin_project::pin_project;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{ServeConfig, DEFAULT_RATE_LIMIT};
use crate::range::ResolvedWindow;
use crate::{Error, TransferError};

/// The rate limiter releases bytes in this many slices per second, which is
/// also the worst case latency for noticing an abort while throttled.
const TICKS_PER_SECOND: u64 = 10;

/// How a transfer ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Cancelled, or the receiving side went away.
    Aborted,
    Failed(String),
}

/// Handed to the post-transfer callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub bytes_sent: u64,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

type Callback = Box<dyn FnOnce(&TransferReport) + Send>;

/// State of a single outgoing body transfer.
pub struct TransferSession {
    rate_limit: u64,
    abort: CancellationToken,
    on_complete: Option<Callback>,
}

impl fmt::Debug for TransferSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferSession")
            .field("rate_limit", &self.rate_limit)
            .field("aborted", &self.abort.is_cancelled())
            .finish()
    }
}

impl Default for TransferSession {
    fn default() -> Self {
        TransferSession {
            rate_limit: DEFAULT_RATE_LIMIT,
            abort: CancellationToken::new(),
            on_complete: None,
        }
    }
}

impl TransferSession {
    /// `rate_limit` is in bytes per second and must not be zero.
    pub fn new(rate_limit: u64) -> Result<Self, Error> {
        if rate_limit == 0 {
            return Err(Error::InvalidRateLimit);
        }
        Ok(TransferSession { rate_limit, ..TransferSession::default() })
    }

    pub fn from_config(config: &ServeConfig) -> Result<Self, Error> {
        TransferSession::new(config.rate_limit)
    }

    /// Runs `callback` once the transfer has finished, however it finished.
    pub fn on_complete(mut self, callback: impl FnOnce(&TransferReport) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// A token that aborts the transfer when cancelled, e.g. from a
    /// connection close notification.
    pub fn abort_handle(&self) -> CancellationToken {
        self.abort.clone()
    }

    pub fn rate_limit(&self) -> u64 {
        self.rate_limit
    }

    pub(crate) fn with_rate_limit(mut self, rate_limit: u64) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// Time still to wait before sending more, once `sent` bytes went out
/// `elapsed` after the transfer started.
fn throttle_delay(sent: u64, rate: u64, elapsed: Duration) -> Duration {
    let due = Duration::from_secs_f64(sent as f64 / rate as f64);
    due.saturating_sub(elapsed)
}

fn tick_bytes(rate: u64) -> usize {
    usize::try_from((rate / TICKS_PER_SECOND).max(1)).unwrap_or(usize::MAX)
}

/// Tracks progress and fires the session callback exactly once, on drop.
struct Reporter {
    started: Instant,
    bytes_sent: u64,
    outcome: Option<Outcome>,
    on_complete: Option<Callback>,
}

impl Reporter {
    fn check<T>(&mut self, result: Result<T, TransferError>) -> Result<T, TransferError> {
        if let Err(err) = &result {
            self.outcome = Some(match err {
                TransferError::Aborted => Outcome::Aborted,
                err => Outcome::Failed(err.to_string()),
            });
        }
        result
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        // dropped without an outcome means the body was dropped mid-stream
        let outcome = self.outcome.take().unwrap_or(Outcome::Aborted);
        let report = TransferReport {
            bytes_sent: self.bytes_sent,
            elapsed: self.started.elapsed(),
            outcome,
        };
        match &report.outcome {
            Outcome::Completed => {
                tracing::debug!(bytes_sent = report.bytes_sent, "transfer complete");
            }
            Outcome::Aborted => {
                tracing::warn!(bytes_sent = report.bytes_sent, "transfer aborted");
            }
            Outcome::Failed(message) => {
                tracing::warn!(bytes_sent = report.bytes_sent, error = %message, "transfer failed");
            }
        }
        if let Some(callback) = self.on_complete.take() {
            callback(&report);
        }
    }
}

static SHARED_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Pulls file bytes from the backing store for a [`ResolvedWindow`].
///
/// The default streamer shares one process-wide client, and with it one
/// connection pool.
#[derive(Debug, Clone)]
pub struct ContentStreamer {
    client: reqwest::Client,
}

impl Default for ContentStreamer {
    fn default() -> Self {
        ContentStreamer { client: SHARED_CLIENT.clone() }
    }
}

impl ContentStreamer {
    pub fn new(client: reqwest::Client) -> Self {
        ContentStreamer { client }
    }

    /// Opens the upstream fetch for `window` and returns the body.
    ///
    /// Resolves once the backing store has answered with headers, so that
    /// its failures can still be turned into an error response. Windows that
    /// carry no body produce an empty stream without any request.
    pub async fn open(
        &self,
        window: &ResolvedWindow,
        source_url: &str,
        session: TransferSession,
    ) -> Result<RemoteStream, TransferError> {
        let TransferSession { rate_limit, abort, on_complete } = session;
        let mut reporter = Reporter {
            started: Instant::now(),
            bytes_sent: 0,
            outcome: None,
            on_complete,
        };

        if !window.send_body || window.length == Some(0) {
            let stream = transfer(None, Some(0), rate_limit, abort, reporter);
            return Ok(RemoteStream::new(Some(0), stream));
        }

        let ranged = window.is_partial() || window.offset > 0;
        let mut request = self.client.get(source_url);
        if ranged {
            let range = match window.end() {
                Some(end) => format!("bytes={}-{}", window.offset, end),
                None => format!("bytes={}-", window.offset),
            };
            tracing::debug!(%range, source_url, "requesting range from backing store");
            request = request.header(RANGE, range);
        }

        let sent = tokio::select! {
            biased;
            _ = abort.cancelled() => Err(TransferError::Aborted),
            response = request.send() => response.map_err(TransferError::from),
        };
        let upstream = reporter.check(sent)?;
        let status = upstream.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("upstream error").to_string();
            return reporter.check(Err(TransferError::Upstream { status, message }));
        }
        if ranged && status != StatusCode::PARTIAL_CONTENT {
            return reporter.check(Err(TransferError::RangeIgnored(status)));
        }

        let stream = transfer(Some(upstream), window.length, rate_limit, abort, reporter);
        Ok(RemoteStream::new(window.length, stream))
    }

    /// Like [`ContentStreamer::open`], but the upstream request is only made
    /// once the body is first polled. Upstream failures then surface as a
    /// body error, after headers went out.
    pub fn open_lazy(
        &self,
        window: &ResolvedWindow,
        source_url: &str,
        session: TransferSession,
    ) -> RemoteStream {
        let length = if window.send_body { window.length } else { Some(0) };
        let streamer = self.clone();
        let window = window.clone();
        let source_url = source_url.to_string();
        let stream = async_stream::try_stream! {
            let mut body = streamer.open(&window, &source_url, session).await?;
            while let Some(chunk) = body.next().await {
                yield chunk?;
            }
        };
        RemoteStream::new(length, stream)
    }

    /// Copies `window` from the backing store into `out`, returning the
    /// number of bytes written.
    ///
    /// A failing write is taken as the receiving side having gone away: the
    /// upstream fetch is dropped and [`TransferError::Aborted`] returned.
    pub async fn stream<W>(
        &self,
        window: &ResolvedWindow,
        source_url: &str,
        session: TransferSession,
        out: &mut W,
    ) -> Result<u64, TransferError>
    where
        W: AsyncWrite + Unpin,
    {
        let abort = session.abort_handle();
        let mut body = self.open(window, source_url, session).await?;
        let mut written = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if let Err(err) = out.write_all(&chunk).await {
                tracing::debug!(error = %err, "write to client failed");
                abort.cancel();
                return Err(TransferError::Aborted);
            }
            written += chunk.len() as u64;
        }
        out.flush().await?;
        Ok(written)
    }

    /// SHA-256 of the full object behind `source_url`.
    pub async fn digest(&self, source_url: &str) -> Result<Vec<u8>, TransferError> {
        let mut upstream = self.client.get(source_url).send().await?;
        let status = upstream.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("upstream error").to_string();
            return Err(TransferError::Upstream { status, message });
        }

        let mut context = ring::digest::Context::new(&ring::digest::SHA256);
        while let Some(chunk) = upstream.chunk().await? {
            context.update(&chunk);
        }
        Ok(context.finish().as_ref().to_vec())
    }
}

fn transfer(
    upstream: Option<reqwest::Response>,
    expected: Option<u64>,
    rate: u64,
    abort: CancellationToken,
    mut reporter: Reporter,
) -> impl Stream<Item = Result<Bytes, TransferError>> + Send + 'static {
    async_stream::try_stream! {
        if let Some(mut upstream) = upstream {
            let tick = tick_bytes(rate);
            loop {
                if expected == Some(reporter.bytes_sent) {
                    break;
                }

                let next = tokio::select! {
                    biased;
                    _ = abort.cancelled() => Err(TransferError::Aborted),
                    chunk = upstream.chunk() => chunk.map_err(TransferError::from),
                };
                let Some(mut chunk) = reporter.check(next)? else {
                    break;
                };

                if let Some(expected) = expected {
                    let room = expected - reporter.bytes_sent;
                    if chunk.len() as u64 > room {
                        chunk.truncate(usize::try_from(room).unwrap_or(usize::MAX));
                    }
                }

                while !chunk.is_empty() {
                    let piece = chunk.split_to(chunk.len().min(tick));
                    let wait = throttle_delay(reporter.bytes_sent, rate, reporter.started.elapsed());
                    if !wait.is_zero() {
                        let waited = tokio::select! {
                            biased;
                            _ = abort.cancelled() => Err(TransferError::Aborted),
                            _ = tokio::time::sleep(wait) => Ok(()),
                        };
                        reporter.check(waited)?;
                    }
                    reporter.bytes_sent += piece.len() as u64;
                    yield piece;
                }
            }

            if let Some(expected) = expected {
                if reporter.bytes_sent < expected {
                    let received = reporter.bytes_sent;
                    reporter.check(Err(TransferError::Truncated { expected, received }))?;
                }
            }
        }
        reporter.outcome = Some(Outcome::Completed);
    }
}

/// Response body streamed from the backing store. Implements [`Stream`],
/// [`Body`], and [`IntoResponse`].
///
/// Dropping it before the end (which is what hyper does when the client
/// disconnects) drops the upstream fetch and reports the transfer aborted.
#[pin_project]
pub struct RemoteStream {
    length: Option<u64>,
    #[pin]
    inner: BoxStream<'static, Result<Bytes, TransferError>>,
}

impl fmt::Debug for RemoteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStream")
            .field("length", &self.length)
            .finish()
    }
}

impl RemoteStream {
    fn new(
        length: Option<u64>,
        stream: impl Stream<Item = Result<Bytes, TransferError>> + Send + 'static,
    ) -> Self {
        RemoteStream { length, inner: stream.boxed() }
    }

    /// Exact number of bytes this body will yield, if known.
    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

impl IntoResponse for RemoteStream {
    fn into_response(self) -> Response {
        Response::new(axum::body::Body::new(self))
    }
}

impl Body for RemoteStream {
    type Data = Bytes;
    type Error = TransferError;

    fn size_hint(&self) -> SizeHint {
        match self.length {
            Some(length) => SizeHint::with_exact(length),
            None => SizeHint::default(),
        }
    }

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>)
        -> Poll<Option<Result<Frame<Bytes>, TransferError>>>
    {
        self.poll_next(cx).map(|item| item.map(|result| result.map(Frame::data)))
    }
}

impl Stream for RemoteStream {
    type Item = Result<Bytes, TransferError>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>
    ) -> Poll<Option<Result<Bytes, TransferError>>> {
        self.project().inner.poll_next(cx)
    }
}
