//! Loopback HTTP/1.1 server serving canned replies to download tests.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// One canned response.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Vec<u8>),
    Status(u16),
    /// Declares `declared` bytes in Content-Length but sends only `body`.
    Truncated { declared: usize, body: Vec<u8> },
}

/// Replies are served in order per path; the last one repeats.
pub struct TestServer {
    base: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn start(routes: Vec<(&str, Vec<Reply>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let mut routes: HashMap<String, Vec<Reply>> = routes
            .into_iter()
            .map(|(path, replies)| (path.to_string(), replies))
            .collect();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&hits);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let Some(path) = read_request_path(&stream) else {
                    continue;
                };
                log.lock().unwrap().push(path.clone());

                let reply = match routes.get_mut(&path) {
                    Some(queue) if queue.len() > 1 => queue.remove(0),
                    Some(queue) => queue.first().cloned().unwrap_or(Reply::Status(404)),
                    None => Reply::Status(404),
                };
                let _ = respond(stream, reply);
            }
        });

        Self { base, hits }
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

fn read_request_path(stream: &TcpStream) -> Option<String> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;

    // Drain headers up to the blank line.
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).ok()?;
        if read == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    request_line.split_whitespace().nth(1).map(str::to_string)
}

fn respond(mut stream: TcpStream, reply: Reply) -> std::io::Result<()> {
    let (status, declared, body) = match reply {
        Reply::Ok(body) => (200, body.len(), body),
        Reply::Status(code) => (code, 0, Vec::new()),
        Reply::Truncated { declared, body } => (200, declared, body),
    };
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Status",
    };

    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, reason, declared
    )?;
    stream.write_all(&body)?;
    stream.flush()?;
    stream.shutdown(Shutdown::Write)
}
