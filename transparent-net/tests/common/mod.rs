#![allow(dead_code)]
//! Test harness utilities for transparent-net integration tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use transparent_net::{
    DispatchError, DispatchEvent, OutgoingRequest, RequestDispatcher, Response, Transport,
};

/// Transport that records every request and answers with a fixed status.
pub struct RecordingTransport {
    status: AtomicU16,
    fail: bool,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl RecordingTransport {
    pub fn with_status(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status: AtomicU16::new(status),
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// A transport whose every send fails before reaching a server.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            status: AtomicU16::new(0),
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &OutgoingRequest) -> Result<Response, DispatchError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(DispatchError::Transport("connection refused".to_string()));
        }
        Ok(Response {
            status: self.status.load(Ordering::SeqCst),
        })
    }
}

/// Wait for all in-flight requests, then return every event reported.
pub fn settle(dispatcher: &mut RequestDispatcher, timeout: Duration) -> Vec<DispatchEvent> {
    assert!(
        dispatcher.wait_idle(timeout),
        "Timed out with {} requests in flight",
        dispatcher.pending()
    );
    dispatcher.poll_events()
}

/// A request as seen by the test server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal HTTP/1.1 server: one request per connection, fixed status, empty body.
pub struct TestServer {
    addr: String,
    captured_rx: Receiver<CapturedRequest>,
}

impl TestServer {
    pub fn start(status: u16) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (captured_tx, captured_rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        if handle_connection(stream, status, &captured_tx).is_err() {
                            continue;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, captured_rx }
    }

    /// Base URL of the server, with a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Wait for the next captured request.
    pub fn next_request(&self, timeout: Duration) -> CapturedRequest {
        self.captured_rx
            .recv_timeout(timeout)
            .expect("Timed out waiting for request")
    }

    /// Collect whatever arrives within `window`.
    pub fn drain(&self, window: Duration) -> Vec<CapturedRequest> {
        let start = Instant::now();
        let mut all = Vec::new();
        while start.elapsed() < window {
            if let Ok(req) = self.captured_rx.recv_timeout(Duration::from_millis(10)) {
                all.push(req);
            }
        }
        all
    }
}

fn handle_connection(
    stream: TcpStream,
    status: u16,
    captured_tx: &Sender<CapturedRequest>,
) -> std::io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    let _ = captured_tx.send(CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let mut writer = stream;
    write!(
        writer,
        "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status
    )?;
    writer.flush()
}
