use std::fmt;

use axum::http::header::{
    HeaderName, ACCEPT_RANGES, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH,
    CONTENT_TYPE, ETAG, LAST_MODIFIED, TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::HeaderMapExt;
use base64::{prelude::BASE64_STANDARD, Engine};
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::config::ServeConfig;
use crate::file::FileDescriptor;
use crate::range::{is_empty_status, resolve, RangeRequest, ResolvedWindow, Validators};
use crate::stream::{ContentStreamer, TransferSession};
use crate::{Error, TransferError};

/// Characters left alone by `filename*` encoding, as in RFC 3986 unreserved.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispositionType {
    Inline,
    Attachment,
}

impl fmt::Display for DispositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispositionType::Inline => f.write_str("inline"),
            DispositionType::Attachment => f.write_str("attachment"),
        }
    }
}

fn is_printable_ascii(c: char) -> bool {
    (' '..='~').contains(&c)
}

/// Replaces `%` and everything outside printable ASCII with `_`, one
/// underscore per code point.
pub fn ascii_fallback(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c == '%' || !is_printable_ascii(c) { '_' } else { c })
        .collect()
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Builds a `Content-Disposition` value for `filename`.
///
/// Without an explicit `fallback`, one is derived with [`ascii_fallback`]
/// when `filename` is not plain printable ASCII or contains `%`. The UTF-8
/// `filename*` parameter is added whenever the two names differ.
pub fn content_disposition(
    disposition: DispositionType,
    filename: &str,
    fallback: Option<&str>,
) -> Result<HeaderValue, Error> {
    let needs_fallback = filename.contains('%') || !filename.chars().all(is_printable_ascii);
    let fallback = match fallback {
        Some(fallback) => fallback.to_string(),
        None if needs_fallback => ascii_fallback(filename),
        None => filename.to_string(),
    };

    if fallback.contains('%') || !fallback.chars().all(is_printable_ascii) {
        return Err(Error::InvalidFilename(fallback));
    }
    for name in [filename, fallback.as_str()] {
        if name.contains('/') || name.contains('\\') {
            return Err(Error::InvalidFilename(name.to_string()));
        }
    }

    let mut value = format!("{}; filename={}", disposition, quote(&fallback));
    if filename != fallback {
        value.push_str("; filename*=UTF-8''");
        value.extend(utf8_percent_encode(filename, FILENAME_ENCODE_SET));
    }
    Ok(HeaderValue::from_str(&value)?)
}

/// Builder for a file response; call [`FileResponse::prepare`] with the
/// request to get the headers and the window to stream.
#[derive(Debug, Clone)]
pub struct FileResponse<F: FileDescriptor> {
    file: F,
    status: StatusCode,
    headers: HeaderMap,
    config: ServeConfig,
    digest: Option<Vec<u8>>,
    streamer: ContentStreamer,
}

impl<F: FileDescriptor> FileResponse<F> {
    pub fn new(file: F) -> Self {
        FileResponse::with_config(file, &ServeConfig::default())
    }

    pub fn with_config(file: F, config: &ServeConfig) -> Self {
        FileResponse {
            file,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            config: config.clone(),
            digest: None,
            streamer: ContentStreamer::default(),
        }
    }

    /// Fetches through `streamer` instead of the shared default client.
    pub fn with_streamer(mut self, streamer: ContentStreamer) -> Self {
        self.streamer = streamer;
        self
    }

    /// Status to answer with when no range handling applies.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds a header. A caller supplied `Content-Type` or `Accept-Ranges`
    /// takes precedence over the computed one.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn rate_limit(mut self, rate_limit: u64) -> Result<Self, Error> {
        if rate_limit == 0 {
            return Err(Error::InvalidRateLimit);
        }
        self.config.rate_limit = rate_limit;
        Ok(self)
    }

    pub fn auto_etag(mut self, enabled: bool) -> Self {
        self.config.auto_etag = enabled;
        self
    }

    pub fn auto_last_modified(mut self, enabled: bool) -> Self {
        self.config.auto_last_modified = enabled;
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.config.public = public;
        self
    }

    /// Sets an explicit entity tag, quoting it when it is not already.
    pub fn etag(self, etag: &str) -> Result<Self, Error> {
        let value = if etag.starts_with('"') || etag.starts_with("W/") {
            etag.to_string()
        } else {
            format!("\"{etag}\"")
        };
        Ok(self.header(ETAG, HeaderValue::from_str(&value)?))
    }

    /// Sets `Content-Disposition` using the file's own name.
    pub fn content_disposition(self, disposition: DispositionType) -> Result<Self, Error> {
        let value = content_disposition(disposition, self.file.filename(), None)?;
        Ok(self.header(CONTENT_DISPOSITION, value))
    }

    /// Sets `Content-Disposition` with a display name and, optionally, an
    /// explicit ASCII fallback.
    pub fn content_disposition_named(
        self,
        disposition: DispositionType,
        filename: &str,
        fallback: Option<&str>,
    ) -> Result<Self, Error> {
        let value = content_disposition(disposition, filename, fallback)?;
        Ok(self.header(CONTENT_DISPOSITION, value))
    }

    /// Fetches and hashes the whole file when an automatic `ETag` is wanted
    /// but the store keeps no checksum. Reads the entire object.
    pub async fn resolve_etag(mut self) -> Result<Self, TransferError> {
        if self.config.auto_etag && self.file.checksum().is_none() && self.digest.is_none() {
            self.digest = Some(self.streamer.digest(self.file.source_url()).await?);
        }
        Ok(self)
    }

    pub fn file(&self) -> &F {
        &self.file
    }

    /// Computes status and headers for `request`.
    ///
    /// With `auto_etag` on, the file must carry a checksum or
    /// [`FileResponse::resolve_etag`] must have run first.
    pub fn prepare(self, request: &RangeRequest) -> Result<PreparedResponse, Error> {
        let FileResponse { file, status, mut headers, config, digest, streamer } = self;
        if config.rate_limit == 0 {
            return Err(Error::InvalidRateLimit);
        }

        if config.auto_etag && !headers.contains_key(ETAG) {
            let Some(checksum) = file.checksum().or(digest.as_deref()) else {
                return Err(Error::MissingDigest(file.filename().to_string()));
            };
            let etag = format!("\"{}\"", BASE64_STANDARD.encode(checksum));
            headers.insert(ETAG, HeaderValue::from_str(&etag)?);
        }

        let last_modified = if config.auto_last_modified { file.last_modified() } else { None };
        if let Some(last_modified) = last_modified {
            let value = HeaderValue::from_str(&httpdate::fmt_http_date(last_modified))?;
            headers.insert(LAST_MODIFIED, value);
        }

        if config.public {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("public"));
        }

        if let Some(disposition) = config.disposition {
            if !headers.contains_key(CONTENT_DISPOSITION) {
                let value = content_disposition(disposition, file.filename(), None)?;
                headers.insert(CONTENT_DISPOSITION, value);
            }
        }

        let validators = Validators {
            etag: headers.get(ETAG).and_then(|v| v.to_str().ok()).map(str::to_string),
            last_modified,
        };

        if is_empty_status(status) {
            let window = resolve(request, status, None, &validators);
            return Ok(PreparedResponse::new(window, headers, &file, config.rate_limit, streamer));
        }

        if !headers.contains_key(CONTENT_TYPE) {
            let mime = file.mime_type().unwrap_or("application/octet-stream");
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(mime)?);
        }

        let sendfile = match request.sendfile_type.as_deref() {
            Some(kind) if config.trust_x_sendfile => HeaderName::from_bytes(kind.as_bytes()).ok(),
            _ => None,
        };

        let window = match sendfile {
            Some(name) => {
                let whole = RangeRequest::new(request.method.clone());
                let mut window = resolve(&whole, status, file.size(), &validators);
                tracing::debug!(header = %name, "delegating transfer to X-Sendfile");
                headers.insert(name, HeaderValue::from_str(file.source_url())?);
                window.content_length = None;
                window.send_body = false;
                window
            }
            None => resolve(request, status, file.size(), &validators),
        };

        if let Some(content_length) = window.content_length {
            headers.remove(TRANSFER_ENCODING);
            headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        }
        if let Some(accept_ranges) = window.accept_ranges {
            if !headers.contains_key(ACCEPT_RANGES) {
                headers.insert(ACCEPT_RANGES, HeaderValue::from_static(accept_ranges));
            }
        }
        if let Some(content_range) = &window.content_range {
            headers.typed_insert(content_range.clone());
        }

        Ok(PreparedResponse::new(window, headers, &file, config.rate_limit, streamer))
    }
}

/// Status, headers and byte window of a file response, ready to be sent.
///
/// The body is always streamed from the backing store; literal content
/// cannot be attached.
#[derive(Debug, Clone)]
pub struct PreparedResponse {
    window: ResolvedWindow,
    headers: HeaderMap,
    source_url: String,
    rate_limit: u64,
    streamer: ContentStreamer,
}

impl PreparedResponse {
    fn new<F: FileDescriptor>(
        window: ResolvedWindow,
        headers: HeaderMap,
        file: &F,
        rate_limit: u64,
        streamer: ContentStreamer,
    ) -> Self {
        PreparedResponse {
            window,
            headers,
            source_url: file.source_url().to_string(),
            rate_limit,
            streamer,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.window.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn window(&self) -> &ResolvedWindow {
        &self.window
    }

    pub fn sends_body(&self) -> bool {
        self.window.send_body
    }

    /// Always fails for `Some`: the content of a file response is streamed.
    pub fn set_content(&mut self, content: Option<Bytes>) -> Result<(), Error> {
        match content {
            Some(_) => Err(Error::LiteralContent),
            None => Ok(()),
        }
    }

    /// There is never literal content to return.
    pub fn content(&self) -> Option<Bytes> {
        None
    }

    /// A session using this response's rate limit.
    pub fn session(&self) -> TransferSession {
        TransferSession::new(self.rate_limit).unwrap_or_default()
    }

    /// Opens the upstream fetch, then returns the response.
    ///
    /// The transfer runs at this response's rate limit whatever `session`
    /// was created with; the session contributes its abort handle and
    /// callback. Upstream failures that happen before any header was
    /// committed become an error response with the mapped status. Later
    /// failures cut the body short and are only reported through the
    /// session callback.
    pub async fn send(self, session: TransferSession) -> Response {
        let session = session.with_rate_limit(self.rate_limit);
        match self.streamer.open(&self.window, &self.source_url, session).await {
            Ok(body) => (self.window.status, self.headers, body).into_response(),
            Err(err) => err.into_response(),
        }
    }
}

/// Responds without waiting for the backing store: the upstream fetch only
/// starts once the body is polled, so its failures cut the body short.
/// Prefer [`PreparedResponse::send`] where an error status is wanted instead.
impl IntoResponse for PreparedResponse {
    fn into_response(self) -> Response {
        let session = self.session();
        let body = self.streamer.open_lazy(&self.window, &self.source_url, session);
        (self.window.status, self.headers, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use assert_matches::assert_matches;
    use axum::http::Method;

    use super::*;
    use crate::file::StoredFile;

    fn stored() -> StoredFile {
        StoredFile::new("docs/report.pdf", "http://store/docs/report.pdf")
            .with_size(1000)
            .with_mime_type("application/pdf")
            // Sun, 06 Nov 1994 08:49:37 GMT
            .with_last_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(784111777))
            .with_checksum(vec![0xde, 0xad, 0xbe, 0xef])
    }

    fn get(range: &str) -> RangeRequest {
        RangeRequest::new(Method::GET).with_range(range)
    }

    fn header<'a>(prepared: &'a PreparedResponse, name: &str) -> Option<&'a str> {
        prepared.headers().get(name).map(|v| v.to_str().unwrap())
    }

    #[test]
    fn test_full_response_headers() {
        let prepared = FileResponse::new(stored())
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        assert_eq!(StatusCode::OK, prepared.status());
        assert_eq!(Some("1000"), header(&prepared, "content-length"));
        assert_eq!(Some("bytes"), header(&prepared, "accept-ranges"));
        assert_eq!(Some("application/pdf"), header(&prepared, "content-type"));
        assert_eq!(Some("Sun, 06 Nov 1994 08:49:37 GMT"), header(&prepared, "last-modified"));
        assert_eq!(Some("public"), header(&prepared, "cache-control"));
        assert_eq!(None, header(&prepared, "etag"));
        assert_eq!(None, header(&prepared, "content-range"));
        assert!(prepared.sends_body());
    }

    #[test]
    fn test_partial_response_headers() {
        let prepared = FileResponse::new(stored()).prepare(&get("bytes=200-499")).unwrap();
        assert_eq!(StatusCode::PARTIAL_CONTENT, prepared.status());
        assert_eq!(Some("300"), header(&prepared, "content-length"));
        assert_eq!(Some("bytes 200-499/1000"), header(&prepared, "content-range"));
        assert_eq!((200, Some(300)), (prepared.window().offset, prepared.window().length));
    }

    #[test]
    fn test_unsatisfiable_response_headers() {
        let prepared = FileResponse::new(stored()).prepare(&get("bytes=1000-1001")).unwrap();
        assert_eq!(StatusCode::RANGE_NOT_SATISFIABLE, prepared.status());
        assert_eq!(Some("bytes */1000"), header(&prepared, "content-range"));
        assert_eq!(Some("0"), header(&prepared, "content-length"));
        assert!(!prepared.sends_body());
    }

    #[test]
    fn test_content_length_replaces_transfer_encoding() {
        let prepared = FileResponse::new(stored())
            .header(TRANSFER_ENCODING, HeaderValue::from_static("chunked"))
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        assert_eq!(None, header(&prepared, "transfer-encoding"));
        assert_eq!(Some("1000"), header(&prepared, "content-length"));
    }

    #[test]
    fn test_caller_headers_win() {
        let prepared = FileResponse::new(stored())
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .header(ACCEPT_RANGES, HeaderValue::from_static("none"))
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        assert_eq!(Some("text/plain"), header(&prepared, "content-type"));
        assert_eq!(Some("none"), header(&prepared, "accept-ranges"));
    }

    #[test]
    fn test_default_content_type() {
        let file = StoredFile::new("blob", "http://store/blob").with_size(3);
        let prepared = FileResponse::new(file).prepare(&RangeRequest::new(Method::GET)).unwrap();
        assert_eq!(Some("application/octet-stream"), header(&prepared, "content-type"));
    }

    #[test]
    fn test_auto_etag_from_checksum() {
        let prepared = FileResponse::new(stored())
            .auto_etag(true)
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        assert_eq!(Some("\"3q2+7w==\""), header(&prepared, "etag"));
    }

    #[test]
    fn test_auto_etag_without_digest_fails() {
        let file = StoredFile::new("a.txt", "http://store/a.txt").with_size(10);
        assert_matches!(
            FileResponse::new(file.clone()).auto_etag(true).prepare(&RangeRequest::new(Method::GET)),
            Err(Error::MissingDigest(name)) if name == "a.txt"
        );

        // an explicit ETag needs no digest
        let prepared = FileResponse::new(file)
            .auto_etag(true)
            .etag("v1")
            .unwrap()
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        assert_eq!(Some("\"v1\""), header(&prepared, "etag"));
    }

    #[test]
    fn test_error_status_sends_no_file_bytes() {
        let prepared = FileResponse::new(stored())
            .status(StatusCode::NOT_FOUND)
            .prepare(&get("bytes=0-9"))
            .unwrap();
        assert_eq!(StatusCode::NOT_FOUND, prepared.status());
        assert_eq!(None, header(&prepared, "content-range"));
        assert_eq!(None, header(&prepared, "content-length"));
        assert!(!prepared.sends_body());
    }

    #[test]
    fn test_if_range_etag() {
        let matching = get("bytes=0-9").with_if_range("\"3q2+7w==\"");
        let prepared = FileResponse::new(stored()).auto_etag(true).prepare(&matching).unwrap();
        assert_eq!(StatusCode::PARTIAL_CONTENT, prepared.status());

        let stale = get("bytes=0-9").with_if_range("\"other\"");
        let prepared = FileResponse::new(stored()).auto_etag(true).prepare(&stale).unwrap();
        assert_eq!(StatusCode::OK, prepared.status());
        assert_eq!(Some("1000"), header(&prepared, "content-length"));
    }

    #[test]
    fn test_if_range_last_modified() {
        let matching = get("bytes=0-9").with_if_range("Sun, 06 Nov 1994 08:49:37 GMT");
        let prepared = FileResponse::new(stored()).prepare(&matching).unwrap();
        assert_eq!(StatusCode::PARTIAL_CONTENT, prepared.status());

        // without Last-Modified there is nothing to compare against
        let prepared = FileResponse::new(stored())
            .auto_last_modified(false)
            .prepare(&matching)
            .unwrap();
        assert_eq!(StatusCode::OK, prepared.status());
        assert_eq!(None, header(&prepared, "last-modified"));
    }

    #[test]
    fn test_explicit_etag_is_quoted() {
        let prepared = FileResponse::new(stored())
            .etag("v1")
            .unwrap()
            .prepare(&get("bytes=0-9").with_if_range("\"v1\""))
            .unwrap();
        assert_eq!(Some("\"v1\""), header(&prepared, "etag"));
        assert_eq!(StatusCode::PARTIAL_CONTENT, prepared.status());
    }

    #[test]
    fn test_head_has_headers_but_no_body() {
        let prepared = FileResponse::new(stored())
            .prepare(&RangeRequest::new(Method::HEAD).with_range("bytes=0-9"))
            .unwrap();
        assert_eq!(StatusCode::OK, prepared.status());
        assert_eq!(Some("1000"), header(&prepared, "content-length"));
        assert!(!prepared.sends_body());
    }

    #[test]
    fn test_not_modified_passes_through() {
        let prepared = FileResponse::new(stored())
            .status(StatusCode::NOT_MODIFIED)
            .prepare(&get("bytes=0-9"))
            .unwrap();
        assert_eq!(StatusCode::NOT_MODIFIED, prepared.status());
        assert_eq!(None, header(&prepared, "content-type"));
        assert_eq!(None, header(&prepared, "content-length"));
        assert!(!prepared.sends_body());
    }

    #[test]
    fn test_x_sendfile_only_when_trusted() {
        let request = get("bytes=0-9").with_sendfile_type("X-Accel-Redirect");

        let prepared = FileResponse::new(stored()).prepare(&request).unwrap();
        assert_eq!(StatusCode::PARTIAL_CONTENT, prepared.status());
        assert_eq!(None, header(&prepared, "x-accel-redirect"));

        let config = ServeConfig { trust_x_sendfile: true, ..ServeConfig::default() };
        let prepared = FileResponse::with_config(stored(), &config).prepare(&request).unwrap();
        assert_eq!(StatusCode::OK, prepared.status());
        assert_eq!(Some("http://store/docs/report.pdf"), header(&prepared, "x-accel-redirect"));
        assert_eq!(None, header(&prepared, "content-length"));
        assert!(!prepared.sends_body());
    }

    #[test]
    fn test_set_content_always_fails() {
        let mut prepared = FileResponse::new(stored())
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        for content in ["", "x", "hello world", "\u{1F600}"] {
            assert_matches!(
                prepared.set_content(Some(Bytes::from(content))),
                Err(Error::LiteralContent)
            );
        }
        assert_matches!(prepared.set_content(Some(Bytes::from(vec![0u8; 4096]))), Err(Error::LiteralContent));
        assert_matches!(prepared.set_content(None), Ok(()));
        assert_eq!(None, prepared.content());
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        assert_matches!(FileResponse::new(stored()).rate_limit(0), Err(Error::InvalidRateLimit));
        let config = ServeConfig { rate_limit: 0, ..ServeConfig::default() };
        assert_matches!(
            FileResponse::with_config(stored(), &config).prepare(&RangeRequest::new(Method::GET)),
            Err(Error::InvalidRateLimit)
        );
    }

    #[test]
    fn test_ascii_fallback() {
        assert_eq!("report.pdf", ascii_fallback("report.pdf"));
        assert_eq!("100_.txt", ascii_fallback("100%.txt"));
        assert_eq!("r_sum_.pdf", ascii_fallback("résumé.pdf"));
        assert_eq!("__.txt", ascii_fallback("日本.txt"));
        assert_eq!("a_b", ascii_fallback("a\tb"));
    }

    #[test]
    fn test_content_disposition_ascii() {
        let value = content_disposition(DispositionType::Attachment, "report.pdf", None).unwrap();
        assert_eq!("attachment; filename=\"report.pdf\"", value.to_str().unwrap());

        let value = content_disposition(DispositionType::Inline, "say \"hi\".txt", None).unwrap();
        assert_eq!("inline; filename=\"say \\\"hi\\\".txt\"", value.to_str().unwrap());
    }

    #[test]
    fn test_content_disposition_utf8() {
        let value = content_disposition(DispositionType::Attachment, "résumé.pdf", None).unwrap();
        assert_eq!(
            "attachment; filename=\"r_sum_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf",
            value.to_str().unwrap()
        );

        let value = content_disposition(DispositionType::Inline, "100%.txt", None).unwrap();
        assert_eq!("inline; filename=\"100_.txt\"; filename*=UTF-8''100%25.txt", value.to_str().unwrap());

        let value = content_disposition(DispositionType::Inline, "résumé.pdf", Some("resume.pdf")).unwrap();
        assert_eq!(
            "inline; filename=\"resume.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf",
            value.to_str().unwrap()
        );
    }

    #[test]
    fn test_content_disposition_rejects_bad_names() {
        assert_matches!(
            content_disposition(DispositionType::Inline, "a/b.txt", None),
            Err(Error::InvalidFilename(_))
        );
        assert_matches!(
            content_disposition(DispositionType::Inline, "a\\b.txt", None),
            Err(Error::InvalidFilename(_))
        );
        assert_matches!(
            content_disposition(DispositionType::Inline, "résumé.pdf", Some("résumé.pdf")),
            Err(Error::InvalidFilename(_))
        );
        assert_matches!(
            content_disposition(DispositionType::Inline, "a.pdf", Some("100%.pdf")),
            Err(Error::InvalidFilename(_))
        );
    }

    #[test]
    fn test_disposition_from_config() {
        let config = ServeConfig {
            disposition: Some(DispositionType::Attachment),
            ..ServeConfig::default()
        };
        let prepared = FileResponse::with_config(stored(), &config)
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        assert_eq!(Some("attachment; filename=\"report.pdf\""), header(&prepared, "content-disposition"));

        let prepared = FileResponse::new(stored())
            .content_disposition(DispositionType::Inline)
            .unwrap()
            .prepare(&RangeRequest::new(Method::GET))
            .unwrap();
        assert_eq!(Some("inline; filename=\"report.pdf\""), header(&prepared, "content-disposition"));
    }
}
