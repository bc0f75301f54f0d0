//! Docker Engine API client over the local unix socket.
//!
//! Only the three endpoints the reloader needs are implemented: inspect,
//! list (with a label filter) and kill. Each request opens its own HTTP/1.1
//! connection to the socket.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ecs_reload_core::runtime::{ContainerHandle, ContainerRuntime, DockerRuntime};
//!
//! #[tokio::main]
//! async fn main() -> ecs_reload_core::Result<()> {
//!     let docker = DockerRuntime::connect("/var/run/docker.sock")?;
//!     if let Some(container) = docker.container("a786fa987ds6").await? {
//!         container.signal("SIGHUP").await?;
//!     }
//!     Ok(())
//! }
//! ```

use super::{ContainerDetails, ContainerHandle, ContainerRuntime, ContainerSummary, LabelFilter};
use crate::error::{Error, Result};
use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::{header, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::UnixStream;
use tracing::debug;

/// Docker runtime reached through a unix socket.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    socket_path: Arc<PathBuf>,
}

impl DockerRuntime {
    /// Create a client for the engine listening on `socket_path`.
    ///
    /// Fails with [`Error::RuntimeUnavailable`] unless the path exists and is
    /// a unix socket. No request is made until the client is used.
    pub fn connect(socket_path: impl Into<PathBuf>) -> Result<Self> {
        let socket_path = socket_path.into();
        let is_socket = std::fs::metadata(&socket_path)
            .map(|meta| meta.file_type().is_socket())
            .unwrap_or(false);
        if !is_socket {
            return Err(Error::RuntimeUnavailable(socket_path));
        }

        Ok(Self {
            socket_path: Arc::new(socket_path),
        })
    }

    /// Path of the engine socket
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP Helpers (Unix Socket)
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let (status, body) = self.request(Method::GET, path).await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn request(&self, method: Method, path: &str) -> Result<(StatusCode, Bytes)> {
        debug!("Docker request: {} {}", method, path);

        let stream = UnixStream::connect(self.socket_path.as_path()).await?;
        let (mut sender, conn) = http1::handshake::<_, Empty<Bytes>>(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!("Docker connection closed with error: {}", e);
            }
        });

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, "docker")
            .body(Empty::<Bytes>::new())?;

        let resp = sender.send_request(req).await?;
        let status = resp.status();
        let body = resp.into_body().collect().await?.to_bytes();
        debug!("Docker response: {} ({} bytes)", status, body.len());

        Ok((status, body))
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    type Handle = DockerContainer;

    async fn container(&self, id: &str) -> Result<Option<DockerContainer>> {
        if id.is_empty() {
            return Ok(None);
        }

        let (status, body) = self
            .request(Method::GET, &format!("/containers/{}/json", encode(id)))
            .await?;
        match status {
            s if s.is_success() => Ok(Some(DockerContainer {
                id: id.to_string(),
                runtime: self.clone(),
            })),
            StatusCode::NOT_FOUND => Ok(None),
            s => Err(api_error(s, &body)),
        }
    }

    async fn list_containers(&self, filter: &LabelFilter) -> Result<Vec<ContainerSummary>> {
        self.get_json(&format!("/containers/json?filters={}", encode(&label_filters(filter))))
            .await
    }
}

/// Handle to a single Docker container.
#[derive(Debug, Clone)]
pub struct DockerContainer {
    id: String,
    runtime: DockerRuntime,
}

#[async_trait]
impl ContainerHandle for DockerContainer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn inspect(&self) -> Result<ContainerDetails> {
        match self
            .runtime
            .get_json(&format!("/containers/{}/json", encode(&self.id)))
            .await
        {
            Err(Error::Runtime { status: 404, .. }) => Err(Error::ContainerNotFound(self.id.clone())),
            other => other,
        }
    }

    async fn signal(&self, signal: &str) -> Result<()> {
        let path = format!(
            "/containers/{}/kill?signal={}",
            encode(&self.id),
            encode(signal)
        );
        let (status, body) = self.runtime.request(Method::POST, &path).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, &body))
        }
    }
}

/// Error payload returned by the engine for non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn api_error(status: StatusCode, body: &[u8]) -> Error {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string());
    Error::runtime(status.as_u16(), message)
}

/// JSON-encoded `filters` value for a label filter.
fn label_filters(filter: &LabelFilter) -> String {
    serde_json::json!({ "label": [filter.to_string()] }).to_string()
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
