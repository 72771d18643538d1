//! Scripted in-memory client for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::{Headers, HttpClient, HttpResponse, Method, TransportError};

enum Scripted {
    Status(u32, Vec<u8>),
    Transport(String),
}

/// One recorded request.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub url: String,
    pub headers: Headers,
    pub timeout: Duration,
}

/// Replays queued responses per URL. The last queued response for a URL is
/// sticky (repeated forever); unknown URLs get a 404.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, status: u32, body: impl Into<Vec<u8>>) -> Self {
        self.push(url, Scripted::Status(status, body.into()));
        self
    }

    pub fn fail(self, url: &str, message: &str) -> Self {
        self.push(url, Scripted::Transport(message.to_string()));
        self
    }

    fn push(&self, url: &str, s: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(s);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }

    pub fn count(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.url == url).count()
    }
}

impl HttpClient for ScriptedClient {
    fn request(
        &self,
        _method: Method,
        url: &str,
        headers: &Headers,
        _body: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            headers: headers.clone(),
            timeout,
        });
        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(url) else {
            return Ok(HttpResponse {
                status: 404,
                body: b"not found".to_vec(),
            });
        };
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            None
        };
        let current = match next.as_ref() {
            Some(s) => s,
            None => match queue.front() {
                Some(s) => s,
                None => {
                    return Ok(HttpResponse {
                        status: 404,
                        body: Vec::new(),
                    })
                }
            },
        };
        match current {
            Scripted::Status(status, body) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Scripted::Transport(msg) => Err(TransportError::Message(msg.clone())),
        }
    }
}
