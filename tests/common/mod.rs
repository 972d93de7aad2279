#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::{Duration, SystemTime};

use axum::Router;
use axum::extract::State;
use axum::http::header::{CONTENT_RANGE, RANGE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bytes::Bytes;

use axum_remote_file::{RangeSpec, Satisfiable, StoredFile};

pub const FIXTURE: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Sun, 06 Nov 1994 08:49:37 GMT
pub fn fixture_mtime() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(784111777)
}

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn object(State(content): State<Bytes>, headers: HeaderMap) -> Response {
    let size = content.len() as u64;
    let Some(range) = headers.get(RANGE).and_then(|v| v.to_str().ok()) else {
        return (StatusCode::OK, content).into_response();
    };

    match RangeSpec::parse(range).map(|spec| spec.apply(size)) {
        Some(Satisfiable::Partial { start, end }) => {
            let body = content.slice(start as usize..=end as usize);
            let content_range = format!("bytes {start}-{end}/{size}");
            (StatusCode::PARTIAL_CONTENT, [(CONTENT_RANGE, content_range)], body).into_response()
        }
        Some(Satisfiable::No) => StatusCode::RANGE_NOT_SATISFIABLE.into_response(),
        _ => (StatusCode::OK, content).into_response(),
    }
}

async fn range_blind(State(content): State<Bytes>) -> Response {
    (StatusCode::OK, content).into_response()
}

async fn short(State(content): State<Bytes>) -> Response {
    let half = content.len() / 2;
    (StatusCode::OK, content.slice(..half)).into_response()
}

/// A backing store serving `content` at `/object` with range support, at
/// `/range-blind` without, and only its first half at `/short`. Anything
/// else is a 404.
pub async fn spawn_store(content: impl Into<Bytes>) -> SocketAddr {
    let app = Router::new()
        .route("/object", get(object))
        .route("/range-blind", get(range_blind))
        .route("/short", get(short))
        .with_state(content.into());
    spawn(app).await
}

pub fn stored(store: SocketAddr, path: &str, size: usize) -> StoredFile {
    StoredFile::new("fixture.txt", format!("http://{store}{path}"))
        .with_size(size as u64)
        .with_last_modified(fixture_mtime())
        .guess_mime_type()
}
