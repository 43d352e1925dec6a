//! Shared fixtures: a minimal HTTP file host and config helpers.

use docket::config::{ConfigLoader, DocketConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub const LAST_MODIFIED: &str = "Wed, 01 Jan 2025 00:00:00 GMT";

/// Canned response for one request path.
#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Advertised length for HEAD; defaults to the body length.
    pub content_length: Option<u64>,
    pub last_modified: Option<String>,
}

impl Route {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.as_bytes().to_vec(),
            content_length: None,
            last_modified: None,
        }
    }

    pub fn document(size: u64) -> Self {
        Self {
            status: 200,
            body: Vec::new(),
            content_length: Some(size),
            last_modified: Some(LAST_MODIFIED.to_string()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            content_length: None,
            last_modified: None,
        }
    }
}

/// HTTP/1.1 responder on a background thread. Unknown paths return 404.
pub struct TestServer {
    pub base: String,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn start() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<Mutex<HashMap<String, Route>>> = Arc::default();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let served_routes = Arc::clone(&routes);
        let served_requests = Arc::clone(&requests);
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                loop {
                    let Ok((socket, _)) = listener.accept().await else {
                        continue;
                    };
                    let routes = Arc::clone(&served_routes);
                    let requests = Arc::clone(&served_requests);
                    tokio::spawn(respond(socket, routes, requests));
                }
            });
        });

        Self {
            base: format!("http://{}", addr),
            routes,
            requests,
        }
    }

    /// Register `route` for an already percent-encoded request path.
    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().insert(path.to_string(), route);
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// `METHOD path` lines received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

async fn respond(
    mut socket: TcpStream,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf).to_string();
    let mut parts = head.lines().next().unwrap_or_default().split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    requests.lock().push(format!("{} {}", method, path));

    let route = routes
        .lock()
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Route::status(404));
    let reason = match route.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let length = route.content_length.unwrap_or(route.body.len() as u64);

    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        route.status, reason, length
    );
    if let Some(ref modified) = route.last_modified {
        response.push_str(&format!("Last-Modified: {}\r\n", modified));
    }
    response.push_str("\r\n");

    let mut bytes = response.into_bytes();
    if method != "HEAD" {
        bytes.extend_from_slice(&route.body);
    }
    let _ = socket.write_all(&bytes).await;
    let _ = socket.shutdown().await;
}

/// Defaults rooted at `root`, scanning `server` under `/docs`.
pub fn config_for(root: &Path, server: &TestServer) -> DocketConfig {
    let mut config = ConfigLoader::default_for(root);
    config.scanner.watch_url = server.url("/docs");
    config.scanner.manifest_location = server.url("/manifest.json");
    config.scanner.probe_timeout_ms = 2000;
    config
}

pub fn manifest_json(filenames: &[&str]) -> String {
    let entries: Vec<serde_json::Value> = filenames
        .iter()
        .map(|name| {
            serde_json::json!({
                "filename": name,
                "title": docket::naming::derive_title(name),
                "path": format!("/docs/{}", name),
            })
        })
        .collect();
    serde_json::to_string(&entries).unwrap()
}
