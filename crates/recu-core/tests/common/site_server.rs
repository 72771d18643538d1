//! Minimal HTTP/1.1 server standing in for the video site and its CDN.
//!
//! Serves fixed responses by request path (query included). Routes can be
//! changed while the server runs, and every hit is counted.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Route {
    status: u32,
    body: Vec<u8>,
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Route>,
    hits: HashMap<String, usize>,
    last_headers: HashMap<String, Vec<String>>,
}

/// Handle to a running server. The server lives until the process exits.
#[derive(Clone)]
pub struct SiteServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl SiteServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// `http://127.0.0.1:<port>` (no trailing slash).
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, status: u32, body: impl Into<Vec<u8>>) -> &Self {
        self.state.lock().unwrap().routes.insert(
            path.to_string(),
            Route {
                status,
                body: body.into(),
            },
        );
        self
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    /// Header lines (`name: value`) of the most recent request to `path`.
    pub fn last_headers(&self, path: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .last_headers
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    /// Scripts a video page, its API answer and a media manifest with
    /// `segments` segments; segment `i` has body `<id:i>`.
    pub fn video(&self, id: u32, user: &str, segments: usize) -> &Self {
        let dir = format!("/hl/{}/2024-01-02_03-04/", user);
        self.route(
            &format!("/video/{}/play", id),
            200,
            format!(
                r#"<html><div id="player" data-token="tok{0}" data-video-id="{0}"></div></html>"#,
                id
            ),
        );
        self.route(
            &format!("/api/video/{0}?token=tok{0}", id),
            200,
            format!(
                r#"<video><source src="{}{}index.m3u8" type="application/x-mpegURL"></video>"#,
                self.base, dir
            ),
        );
        let manifest: String = std::iter::once("#EXTM3U\n#EXT-X-TARGETDURATION:2\n".to_string())
            .chain((0..segments).map(|i| format!("#EXTINF:2.000,\nseg{}.ts\n", i)))
            .chain(std::iter::once("#EXT-X-ENDLIST\n".to_string()))
            .collect();
        self.route(&format!("{}index.m3u8", dir), 200, manifest);
        for i in 0..segments {
            self.route(&format!("{}seg{}.ts", dir, i), 200, format!("<{}:{}>", id, i));
        }
        self
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let mut lines = request.lines();
    let target = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let headers: Vec<String> = lines
        .take_while(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect();

    let route = {
        let mut s = state.lock().unwrap();
        *s.hits.entry(target.clone()).or_default() += 1;
        s.last_headers.insert(target.clone(), headers);
        s.routes.get(&target).cloned()
    };
    let Route { status, body } = route.unwrap_or(Route {
        status: 404,
        body: b"not found".to_vec(),
    });
    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&body);
}
