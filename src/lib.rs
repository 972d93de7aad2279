//! # axum-remote-file
//!
//! HTTP range responses for [`axum`][1], with the bytes fetched from a
//! remote backing store instead of a local file.
//!
//! A file is described by anything implementing [`FileDescriptor`]: its size,
//! MIME type, modification time, checksum and a URL the store serves it at.
//! [`FileResponse`] resolves the request's `Range` and `If-Range` headers
//! into a [`ResolvedWindow`] (200, 206 or 416) and the matching headers, and
//! [`ContentStreamer`] satisfies that window with a ranged GET against the
//! source URL. Transfers are rate limited and stop as soon as the client goes
//! away.
//!
//! Only single ranges are supported. A multi-range request is served as a
//! full 200 response.
//!
//! ```no_run
//! use axum::Router;
//! use axum::extract::{Path, State};
//! use axum::response::{IntoResponse, Response};
//! use axum::routing::get;
//!
//! use axum_remote_file::{file, Disk, FileResponse, RangeRequest, StoredFile, TransferSession};
//!
//! #[derive(Clone)]
//! struct Bucket {
//!     base_url: String,
//! }
//!
//! impl Disk for Bucket {
//!     async fn stat(&self, path: &str) -> std::io::Result<Option<StoredFile>> {
//!         // look the object up in the store's metadata API here
//!         let url = format!("{}/{}", self.base_url, path);
//!         Ok(Some(StoredFile::new(path, url).with_size(1024)))
//!     }
//! }
//!
//! async fn download(
//!     State(bucket): State<Bucket>,
//!     Path(path): Path<String>,
//!     request: RangeRequest,
//! ) -> Response {
//!     let stored = match file(&bucket, &path).await {
//!         Ok(stored) => stored,
//!         Err(err) => return err.into_response(),
//!     };
//!     match FileResponse::new(stored).prepare(&request) {
//!         // runs at the response's rate limit, over the shared client
//!         Ok(prepared) => prepared.send(TransferSession::default()).await,
//!         Err(err) => err.into_response(),
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let bucket = Bucket { base_url: "https://bucket.example.com".to_string() };
//!     let app = Router::new()
//!         .route("/files/{*path}", get(download))
//!         .with_state(bucket);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! [1]: https://docs.rs/axum

mod config;
mod error;
mod file;
mod range;
mod response;
mod stream;

pub use config::{ServeConfig, DEFAULT_RATE_LIMIT};
pub use error::{Error, TransferError};
pub use file::{file, Disk, FileDescriptor, StoredFile};
pub use range::{if_range_matches, resolve, RangeRequest, RangeSpec, ResolvedWindow, Satisfiable, Validators};
pub use response::{ascii_fallback, content_disposition, DispositionType, FileResponse, PreparedResponse};
pub use stream::{ContentStreamer, Outcome, RemoteStream, TransferReport, TransferSession};
