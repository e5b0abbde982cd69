//! In-process HTTP mock for integration tests.
//!
//! Blocking HTTP/1.1 over `TcpListener`, parsed with httparse. One thread per
//! connection and one request per connection (`Connection: close`). Every
//! request is recorded; responses come from routes registered up front.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lepton::config::EnvConfig;
use lepton::resolver::WorkspaceFlavor;
use lepton::Client;
use parking_lot::Mutex;
use serde_json::Value;

/// Maximum header section size (32 KiB)
const MAX_HEADER_SIZE: usize = 32 * 1024;

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path including the query string
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> Vec<(String, String)> {
        let Some((_, query)) = self.target.split_once('?') else {
            return Vec::new();
        };
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (k.to_string(), v.to_string())
            })
            .collect()
    }

    pub fn query_value(&self, key: &str) -> Option<String> {
        self.query().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// A scripted response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            delay: None,
        }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::status(status)
            .header("Content-Type", "application/json")
            .body(body.to_string())
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::status(status)
            .header("Content-Type", "text/plain")
            .body(body)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Hold the response back for `delay` before writing it.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = Box<dyn Fn(&Recorded) -> Reply + Send + Sync>;

enum Responder {
    /// Replies in order; the last one repeats.
    Sequence(Mutex<VecDeque<Reply>>),
    Handler(Handler),
}

struct Route {
    method: String,
    path: String,
    responder: Responder,
}

#[derive(Default)]
struct State {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<Recorded>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub struct MockServer {
    addr: SocketAddr,
    state: Arc<State>,
}

impl MockServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let state = Arc::new(State::default());

        let accept_state = state.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let state = accept_state.clone();
                thread::spawn(move || handle_connection(stream, &state));
            }
        });

        Self { addr, state }
    }

    /// `http://127.0.0.1:<port>`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `method path` (query ignored) with `reply`, every time.
    pub fn route(&self, method: &str, path: &str, reply: Reply) -> &Self {
        self.route_seq(method, path, vec![reply])
    }

    /// Answer `method path` with each reply in turn, repeating the last.
    pub fn route_seq(&self, method: &str, path: &str, replies: Vec<Reply>) -> &Self {
        self.push(method, path, Responder::Sequence(Mutex::new(replies.into())));
        self
    }

    /// Answer `method path` by calling `handler` with the recorded request.
    pub fn route_fn<F>(&self, method: &str, path: &str, handler: F) -> &Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        self.push(method, path, Responder::Handler(Box::new(handler)));
        self
    }

    fn push(&self, method: &str, path: &str, responder: Responder) {
        self.state.routes.lock().push(Route {
            method: method.to_string(),
            path: path.to_string(),
            responder,
        });
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path() == path)
            .collect()
    }

    /// Highest number of requests that were being served at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    /// A client bound to this server, isolated from the process env and
    /// the on-disk workspace record.
    pub fn client(&self) -> Client {
        Client::builder()
            .workspace_id("test-ws")
            .token("test-token-1234")
            .url(self.url())
            .flavor(WorkspaceFlavor::Unified)
            .env(EnvConfig::default())
            .without_record()
            .build()
            .expect("build test client")
    }
}

fn handle_connection(mut stream: TcpStream, state: &State) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    state.requests.lock().push(request.clone());

    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(now, Ordering::SeqCst);

    let reply = respond(state, &request);
    if let Some(delay) = reply.delay {
        thread::sleep(delay);
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    let _ = write_reply(&mut stream, &request, &reply);
}

fn respond(state: &State, request: &Recorded) -> Reply {
    let routes = state.routes.lock();
    let route = routes
        .iter()
        .find(|r| r.method == request.method && r.path == request.path());
    match route {
        Some(Route {
            responder: Responder::Sequence(replies),
            ..
        }) => {
            let mut replies = replies.lock();
            if replies.len() > 1 {
                replies.pop_front().unwrap_or_else(|| Reply::status(500))
            } else {
                replies.front().cloned().unwrap_or_else(|| Reply::status(500))
            }
        }
        Some(Route {
            responder: Responder::Handler(handler),
            ..
        }) => handler(request),
        None => Reply::text(404, &format!("no route for {} {}", request.method, request.target)),
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut header_buf = Vec::with_capacity(4096);
    loop {
        let mut line = Vec::new();
        let n = reader.read_until(b'\n', &mut line).ok()?;
        if n == 0 {
            return None;
        }
        header_buf.extend_from_slice(&line);
        if header_buf.len() > MAX_HEADER_SIZE {
            return None;
        }
        if header_buf.ends_with(b"\r\n\r\n") {
            break;
        }
    }

    let mut parsed_headers = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut parsed_headers);
    match req.parse(&header_buf) {
        Ok(httparse::Status::Complete(_)) => {}
        _ => return None,
    }

    let method = req.method.unwrap_or("").to_string();
    let target = req.path.unwrap_or("/").to_string();
    let mut headers = Vec::new();
    let mut content_length = None;
    let mut chunked = false;
    for h in req.headers.iter() {
        let value = String::from_utf8_lossy(h.value).to_string();
        if h.name.eq_ignore_ascii_case("Content-Length") {
            content_length = value.trim().parse::<usize>().ok();
        }
        if h.name.eq_ignore_ascii_case("Transfer-Encoding")
            && value.to_ascii_lowercase().contains("chunked")
        {
            chunked = true;
        }
        headers.push((h.name.to_string(), value));
    }

    let body = if chunked {
        read_chunked(&mut reader)?
    } else {
        let mut body = vec![0u8; content_length.unwrap_or(0)];
        reader.read_exact(&mut body).ok()?;
        body
    };

    Some(Recorded {
        method,
        target,
        headers,
        body,
    })
}

fn read_chunked(reader: &mut impl BufRead) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).ok()?;
        let size_hex = size_line.trim().split(';').next().unwrap_or("");
        let size = usize::from_str_radix(size_hex, 16).ok()?;
        if size == 0 {
            let mut trailer = String::new();
            reader.read_line(&mut trailer).ok()?;
            return Some(body);
        }
        let mut chunk = vec![0u8; size + 2];
        reader.read_exact(&mut chunk).ok()?;
        chunk.truncate(size);
        body.extend_from_slice(&chunk);
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        302 => "Found",
        307 => "Temporary Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn write_reply(stream: &mut TcpStream, request: &Recorded, reply: &Reply) -> std::io::Result<()> {
    let mut head = format!("HTTP/1.1 {} {}\r\n", reply.status, reason(reply.status));
    for (name, value) in &reply.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str(&format!("Content-Length: {}\r\n", reply.body.len()));
    head.push_str("Connection: close\r\n\r\n");
    stream.write_all(head.as_bytes())?;
    if request.method != "HEAD" {
        stream.write_all(&reply.body)?;
    }
    stream.flush()
}

/// Read a whole stream into a string; test helper for streamed bodies.
pub fn read_all(mut reader: impl Read) -> String {
    let mut out = String::new();
    reader.read_to_string(&mut out).expect("read stream");
    out
}
