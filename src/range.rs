//! Byte range resolution.
//!
//! Everything here is pure: the request's `Range`/`If-Range` headers and the
//! file's validators go in, a [`ResolvedWindow`] comes out. Only a single
//! range is ever honoured. Anything this parser cannot read as exactly one
//! `bytes=` range (other units, garbage, or a comma separated multi-range
//! set) is ignored and the full entity is served.

use std::convert::Infallible;
use std::time::SystemTime;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::http::header::{IF_RANGE, RANGE};
use axum_extra::headers::ContentRange;

/// Request-side inputs to range resolution. Also an axum extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
    pub method: Method,
    pub range: Option<String>,
    pub if_range: Option<String>,
    /// Value of `X-Sendfile-Type`, only acted upon when trusted.
    pub sendfile_type: Option<String>,
}

pub(crate) const X_SENDFILE_TYPE: &str = "x-sendfile-type";

impl RangeRequest {
    pub fn new(method: Method) -> Self {
        RangeRequest { method, range: None, if_range: None, sendfile_type: None }
    }

    pub fn from_headers(method: Method, headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers.get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        RangeRequest {
            range: text(RANGE.as_str()),
            if_range: text(IF_RANGE.as_str()),
            sendfile_type: text(X_SENDFILE_TYPE),
            method,
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_if_range(mut self, if_range: impl Into<String>) -> Self {
        self.if_range = Some(if_range.into());
        self
    }

    pub fn with_sendfile_type(mut self, sendfile_type: impl Into<String>) -> Self {
        self.sendfile_type = Some(sendfile_type.into());
        self
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RangeRequest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RangeRequest::from_headers(parts.method.clone(), &parts.headers))
    }
}

/// The current validators of the entity, compared against `If-Range`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    /// Full `ETag` header value, quotes included.
    pub etag: Option<String>,
    pub last_modified: Option<SystemTime>,
}

/// Whether an `If-Range` value still matches the entity, i.e. whether the
/// `Range` header may be honoured.
///
/// Compares against the entity tag first and then against the
/// `Last-Modified` date in IMF-fixdate form. Both comparisons are exact.
pub fn if_range_matches(value: &str, validators: &Validators) -> bool {
    if validators.etag.as_deref() == Some(value) {
        return true;
    }

    match validators.last_modified {
        Some(last_modified) => httpdate::fmt_http_date(last_modified) == value,
        None => false,
    }
}

/// A single parsed `bytes=` range. Inclusive, zero indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    /// `None` for a suffix range (`bytes=-N`), in which case `end` is `N`.
    pub start: Option<u64>,
    /// `None` for an open range (`bytes=N-`).
    pub end: Option<u64>,
}

impl RangeSpec {
    /// Parses a `Range` header value. Returns `None` when the header should
    /// be ignored.
    pub fn parse(header: &str) -> Option<RangeSpec> {
        let spec = header.trim().strip_prefix("bytes=")?;
        if spec.contains(',') {
            return None;
        }

        let (start, end) = spec.split_once('-')?;
        let bound = |text: &str| -> Option<Option<u64>> {
            match text.trim() {
                "" => Some(None),
                text if text.bytes().all(|b| b.is_ascii_digit()) => text.parse().ok().map(Some),
                _ => None,
            }
        };

        match (bound(start)?, bound(end)?) {
            (None, None) => None,
            (start, end) => Some(RangeSpec { start, end }),
        }
    }

    /// Applies this range to an entity of `size` bytes.
    pub fn apply(&self, size: u64) -> Satisfiable {
        let size = i128::from(size);
        let (start, end) = match (self.start, self.end) {
            // a zero length suffix selects nothing
            (None, Some(0)) => return Satisfiable::No,
            (None, Some(suffix)) => (size - i128::from(suffix), size - 1),
            // an open range starting past the end is unsatisfiable, not reversed
            (Some(start), None) => (i128::from(start), (size - 1).max(i128::from(start))),
            (Some(start), Some(end)) => (i128::from(start), i128::from(end)),
            (None, None) => return Satisfiable::Ignored,
        };

        if start > end {
            return Satisfiable::Ignored;
        }

        let end = end.min(size - 1);
        if start < 0 || start > end {
            Satisfiable::No
        } else if end - start < size - 1 {
            // both bounds are within 0..size here
            Satisfiable::Partial { start: start as u64, end: end as u64 }
        } else {
            Satisfiable::Whole
        }
    }
}

/// Outcome of applying a [`RangeSpec`] to a known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfiable {
    /// The range is not meaningful; serve the whole entity.
    Ignored,
    /// The range covers the whole entity.
    Whole,
    /// Inclusive byte window strictly smaller than the entity.
    Partial { start: u64, end: u64 },
    No,
}

/// Status, byte window and range related headers for one response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    pub status: StatusCode,
    /// First byte to send.
    pub offset: u64,
    /// Number of bytes to send, `None` meaning up to the end of the entity.
    pub length: Option<u64>,
    pub content_length: Option<u64>,
    /// Set for 206 and 416 only.
    pub content_range: Option<ContentRange>,
    pub accept_ranges: Option<&'static str>,
    pub send_body: bool,
}

impl ResolvedWindow {
    fn whole(status: StatusCode, size: Option<u64>) -> Self {
        ResolvedWindow {
            status,
            offset: 0,
            length: size,
            content_length: size,
            content_range: None,
            accept_ranges: None,
            send_body: true,
        }
    }

    /// True when only part of the entity is sent.
    pub fn is_partial(&self) -> bool {
        self.status == StatusCode::PARTIAL_CONTENT
    }

    /// Inclusive last byte of a partial window.
    pub fn end(&self) -> Option<u64> {
        match self.length {
            Some(0) | None => None,
            Some(length) => Some(self.offset + length - 1),
        }
    }
}

pub(crate) fn is_empty_status(status: StatusCode) -> bool {
    status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// Decides between a full (200), partial (206) and unsatisfiable (416)
/// response for an entity of `size` bytes.
///
/// `status` is the status the caller would respond with absent any range
/// handling. Informational, empty and other non-2xx statuses pass through
/// untouched and carry no file bytes.
pub fn resolve(
    request: &RangeRequest,
    status: StatusCode,
    size: Option<u64>,
    validators: &Validators,
) -> ResolvedWindow {
    if is_empty_status(status) || !status.is_success() {
        let mut window = ResolvedWindow::whole(status, None);
        window.length = Some(0);
        window.send_body = false;
        return window;
    }

    let Some(size) = size else {
        let mut window = ResolvedWindow::whole(status, None);
        window.send_body = request.method != Method::HEAD;
        return window;
    };

    let mut window = ResolvedWindow::whole(status, Some(size));
    window.accept_ranges = Some(if request.method.is_safe() { "bytes" } else { "none" });

    if request.method == Method::GET {
        if let Some(range) = request.range.as_deref() {
            let honoured = match request.if_range.as_deref() {
                Some(if_range) => if_range_matches(if_range, validators),
                None => true,
            };
            if honoured {
                apply_range(&mut window, range, size);
            } else {
                tracing::debug!(range, "If-Range precondition failed, serving full body");
            }
        }
    }

    if request.method == Method::HEAD {
        window.send_body = false;
    }

    window
}

fn apply_range(window: &mut ResolvedWindow, range: &str, size: u64) {
    let Some(spec) = RangeSpec::parse(range) else {
        tracing::debug!(range, "ignoring unparseable range");
        return;
    };

    match spec.apply(size) {
        Satisfiable::Ignored | Satisfiable::Whole => {}
        Satisfiable::No => {
            tracing::debug!(range, size, "range not satisfiable");
            window.status = StatusCode::RANGE_NOT_SATISFIABLE;
            window.content_range = Some(ContentRange::unsatisfied_bytes(size));
            window.length = Some(0);
            window.content_length = Some(0);
            window.send_body = false;
        }
        Satisfiable::Partial { start, end } => {
            let Ok(content_range) = ContentRange::bytes(start..=end, size) else {
                return;
            };
            let length = end - start + 1;
            window.status = StatusCode::PARTIAL_CONTENT;
            window.offset = start;
            window.length = Some(length);
            window.content_length = Some(length);
            window.content_range = Some(content_range);
        }
    }
}
