//! Minimal HTTP responder for client and controller tests

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned response
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    status: u16,
    chunks: Vec<Vec<u8>>,
    delay: Duration,
    hold_open: bool,
    silent: bool,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            chunks: vec![body.as_bytes().to_vec()],
            delay: Duration::ZERO,
            hold_open: false,
            silent: false,
        }
    }

    /// Body written chunk by chunk
    pub fn chunked(chunks: &[&str]) -> Self {
        Self {
            status: 200,
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            delay: Duration::from_millis(10),
            hold_open: false,
            silent: false,
        }
    }

    /// Keep the connection open after the last chunk until the client hangs up
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Read the request, then never answer
    pub fn silent() -> Self {
        Self {
            status: 200,
            chunks: Vec::new(),
            delay: Duration::ZERO,
            hold_open: true,
            silent: true,
        }
    }
}

/// Serves canned replies and records request bodies
pub(crate) struct TestServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn start(reply: Reply) -> Self {
        Self::start_sequence(vec![reply]).await
    }

    /// Connection `n` gets `replies[n]`; the last reply repeats
    pub async fn start_sequence(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let accepted = AtomicUsize::new(0);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let n = accepted.fetch_add(1, Ordering::Relaxed);
                let Some(reply) = replies.get(n).or(replies.last()).cloned() else {
                    continue;
                };
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    handle(socket, reply, recorded).await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

async fn handle(mut socket: TcpStream, reply: Reply, recorded: Arc<Mutex<Vec<String>>>) {
    let Some(body) = read_request(&mut socket).await else {
        return;
    };
    recorded.lock().push(body);

    if !reply.silent {
        write_reply(&mut socket, &reply).await;
    }
    if reply.hold_open {
        let mut buf = [0u8; 64];
        // Returns once the client drops the connection
        let _ = socket.read(&mut buf).await;
    }
    let _ = socket.shutdown().await;
}

async fn write_reply(socket: &mut TcpStream, reply: &Reply) {
    let head = format!(
        "HTTP/1.1 {} Test\r\nContent-Type: application/x-ndjson\r\nConnection: close\r\n\r\n",
        reply.status
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    for chunk in &reply.chunks {
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        if socket.write_all(chunk).await.is_err() || socket.flush().await.is_err() {
            return;
        }
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }

    Some(String::from_utf8_lossy(&data[header_end..]).into_owned())
}
