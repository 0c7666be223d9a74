//! Minimal HTTP/1.1 server returning canned JSON responses for integration tests.
//!
//! Each route matches a method and path prefix and plays back its responses in
//! order, repeating the last one. Status 0 closes the connection without
//! answering (an empty reply to the client). Every request is recorded.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct Route {
    method: &'static str,
    path_prefix: &'static str,
    responses: VecDeque<(u16, String)>,
}

impl Route {
    pub fn new(method: &'static str, path_prefix: &'static str) -> Self {
        Self {
            method,
            path_prefix,
            responses: VecDeque::new(),
        }
    }

    pub fn respond(mut self, status: u16, body: impl Into<String>) -> Self {
        self.responses.push_back((status, body.into()));
        self
    }

    /// Close the connection without sending anything.
    pub fn drop_connection(self) -> Self {
        self.respond(0, "")
    }

    fn next(&mut self) -> (u16, String) {
        if self.responses.len() > 1 {
            self.responses.pop_front().unwrap_or((500, String::new()))
        } else {
            self.responses
                .front()
                .cloned()
                .unwrap_or((500, String::new()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct JsonServer {
    pub base_url: String,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl JsonServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.target.starts_with(path_prefix))
            .count()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(routes: Vec<Route>) -> JsonServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(Mutex::new(routes));
    let log = Arc::new(Mutex::new(Vec::new()));
    let server_log = Arc::clone(&log);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&server_log);
            thread::spawn(move || handle(stream, &routes, &log));
        }
    });
    JsonServer {
        base_url: format!("http://127.0.0.1:{}", port),
        log,
    }
}

fn handle(mut stream: TcpStream, routes: &Mutex<Vec<Route>>, log: &Mutex<Vec<RecordedRequest>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let (status, body) = {
        let mut routes = routes.lock().unwrap();
        routes
            .iter_mut()
            .find(|r| {
                r.method.eq_ignore_ascii_case(&request.method)
                    && request.target.starts_with(r.path_prefix)
            })
            .map(Route::next)
            .unwrap_or((404, r#"{"detail":"no route"}"#.to_string()))
    };
    log.lock().unwrap().push(request);

    if status == 0 {
        return;
    }
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).into_owned();

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Status",
    }
}
