//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed bodies by path and counts requests per path. Unknown paths
//! get 404. Query strings are ignored for routing but kept in the request log.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct Log {
    hits: HashMap<String, usize>,
    targets: Vec<String>,
}

/// Handle to a running server. The server thread lives until the process exits.
#[derive(Debug, Clone)]
pub struct StaticServer {
    base_url: String,
    log: Arc<Mutex<Log>>,
}

impl StaticServer {
    /// URL for `path` (no leading slash), e.g. `url("data.csv")`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Requests received for `path`, regardless of query string.
    pub fn hits(&self, path: &str) -> usize {
        let log = self.log.lock().unwrap();
        log.hits.get(&format!("/{}", path)).copied().unwrap_or(0)
    }

    /// Total requests received.
    pub fn total_hits(&self) -> usize {
        self.log.lock().unwrap().targets.len()
    }

    /// Request targets (path plus query) in arrival order.
    pub fn targets(&self) -> Vec<String> {
        self.log.lock().unwrap().targets.clone()
    }
}

#[derive(Debug, Default)]
pub struct Builder {
    routes: HashMap<String, Route>,
}

impl Builder {
    /// Serves `body` with 200 at `/path`.
    pub fn file(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            format!("/{}", path),
            Route {
                status: 200,
                body: body.into(),
            },
        );
        self
    }

    /// Answers `/path` with `status` and an empty body.
    pub fn status(mut self, path: &str, status: u16) -> Self {
        self.routes.insert(
            format!("/{}", path),
            Route {
                status,
                body: Vec::new(),
            },
        );
        self
    }

    pub fn start(self) -> StaticServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(self.routes);
        let log = Arc::new(Mutex::new(Log::default()));
        let server_log = Arc::clone(&log);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&server_log);
                thread::spawn(move || handle(stream, &routes, &log));
            }
        });
        StaticServer {
            base_url: format!("http://127.0.0.1:{}/", port),
            log,
        }
    }
}

pub fn builder() -> Builder {
    Builder::default()
}

/// Returns a URL on a port nothing listens on.
pub fn refused_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/{}", port, path)
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Route>, log: &Mutex<Log>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let path = target.split('?').next().unwrap_or("/").to_string();
    {
        let mut log = log.lock().unwrap();
        *log.hits.entry(path.clone()).or_insert(0) += 1;
        log.targets.push(target);
    }

    let (status, reason, body): (u16, &str, &[u8]) = match routes.get(&path) {
        Some(route) => (route.status, reason(route.status), route.body.as_slice()),
        None => (404, "Not Found", &b"not found"[..]),
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
