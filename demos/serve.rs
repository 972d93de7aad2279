//! Serves files from a remote HTTP store with range support.
//!
//! ```sh
//! STORE_URL=https://bucket.example.com \
//! SERVE_CONFIG='{"rate_limit": 65536, "disposition": "attachment"}' \
//!     cargo run --example serve
//! curl -r 0-99 localhost:3000/files/some/object.bin
//! ```

use std::io;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header::{HeaderName, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use axum_remote_file::{
    file, ContentStreamer, Disk, FileResponse, RangeRequest, ServeConfig, StoredFile,
};

#[derive(Clone)]
struct HttpStore {
    base_url: String,
    client: reqwest::Client,
}

impl Disk for HttpStore {
    async fn stat(&self, path: &str) -> io::Result<Option<StoredFile>> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.head(&url).send().await.map_err(io::Error::other)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status().map_err(io::Error::other)?;

        let headers = response.headers();
        let mut stored = StoredFile::new(path, url.clone());
        if let Some(size) = header_text(headers, CONTENT_LENGTH).and_then(|value| value.parse().ok()) {
            stored = stored.with_size(size);
        }
        if let Some(mime_type) = header_text(headers, CONTENT_TYPE) {
            stored = stored.with_mime_type(mime_type);
        }
        let modified = header_text(headers, LAST_MODIFIED)
            .and_then(|value| httpdate::parse_http_date(value).ok());
        if let Some(modified) = modified {
            stored = stored.with_last_modified(modified);
        }
        Ok(Some(stored))
    }
}

fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[derive(Clone)]
struct AppState {
    store: HttpStore,
    config: ServeConfig,
    streamer: ContentStreamer,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config: ServeConfig = match std::env::var("SERVE_CONFIG") {
        Ok(json) => serde_json::from_str(&json)?,
        Err(_) => ServeConfig::default(),
    };
    let base_url = std::env::var("STORE_URL").unwrap_or_else(|_| "http://127.0.0.1:9000".to_string());

    let client = reqwest::Client::new();
    let state = AppState {
        store: HttpStore { base_url, client: client.clone() },
        config: config.validate()?,
        streamer: ContentStreamer::new(client),
    };

    let router = Router::new()
        .route("/", get(|| async { "Hello, World!" }))
        .route("/files/{*path}", get(get_file))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    axum::serve(listener, router).await?;
    Ok(())
}

async fn get_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: RangeRequest,
) -> Response {
    let stored = match file(&state.store, &path).await {
        Ok(stored) => stored,
        Err(err) => return err.into_response(),
    };
    let response = match FileResponse::with_config(stored, &state.config)
        .with_streamer(state.streamer.clone())
        .resolve_etag()
        .await
    {
        Ok(response) => response,
        Err(err) => return err.into_response(),
    };
    let prepared = match response.prepare(&request) {
        Ok(prepared) => prepared,
        Err(err) => return err.into_response(),
    };

    let session = prepared.session().on_complete(move |report| {
        tracing::info!(
            %path,
            bytes_sent = report.bytes_sent,
            elapsed_ms = report.elapsed.as_millis() as u64,
            outcome = ?report.outcome,
            "download finished"
        );
    });
    prepared.send(session).await
}
