//! libcurl-backed [`HttpClient`]: one Easy handle per request.

use std::time::Duration;

use super::{Headers, HttpClient, HttpResponse, Method, TransportError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTS: u32 = 10;

/// Stateless curl client. Safe to share between job tasks.
#[derive(Debug, Clone, Default)]
pub struct CurlClient {
    _private: (),
}

impl CurlClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpClient for CurlClient {
    fn request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.connect_timeout(CONNECT_TIMEOUT.min(timeout))?;
        easy.timeout(timeout)?;
        // Let curl negotiate and decode gzip/deflate/br.
        easy.accept_encoding("")?;

        match method {
            Method::Get => easy.get(true)?,
            Method::Post => {
                easy.post(true)?;
                easy.post_fields_copy(body.unwrap_or_default())?;
            }
        }

        let mut list = curl::easy::List::new();
        for (k, v) in headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !headers.is_empty() {
            easy.http_headers(list)?;
        }

        let mut data = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|chunk| {
                data.extend_from_slice(chunk);
                Ok(chunk.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::trace!(url, status, bytes = data.len(), "http request done");
        Ok(HttpResponse { status, body: data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Answers one request with `<method> <body>` as the response body.
    fn echo_once() -> (String, std::thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let head_end = loop {
                let n = stream.read(&mut chunk).unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(p) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break p + 4;
                }
                assert!(n > 0, "connection closed before headers");
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let length = head
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("content-length")
                        .then(|| v.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while buf.len() < head_end + length {
                let n = stream.read(&mut chunk).unwrap();
                assert!(n > 0, "connection closed before body");
                buf.extend_from_slice(&chunk[..n]);
            }
            let method = head.split_whitespace().next().unwrap_or("").to_string();
            let mut reply = method.into_bytes();
            reply.push(b' ');
            reply.extend_from_slice(&buf[head_end..head_end + length]);
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reply.len()
            )
            .unwrap();
            stream.write_all(&reply).unwrap();
        });
        (base, handle)
    }

    #[test]
    fn post_sends_body() {
        let (base, server) = echo_once();
        let resp = CurlClient::new()
            .request(
                Method::Post,
                &format!("{}/form", base),
                &Headers::new(),
                Some(&b"a=1"[..]),
                Duration::from_secs(5),
            )
            .unwrap();
        server.join().unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"POST a=1");
    }

    #[test]
    fn get_sends_headers_and_no_body() {
        let (base, server) = echo_once();
        let mut headers = Headers::new();
        headers.insert("X-Test".to_string(), "1".to_string());
        let resp = CurlClient::new()
            .get(&format!("{}/page", base), &headers, Duration::from_secs(5))
            .unwrap();
        server.join().unwrap();
        assert_eq!(resp.body, b"GET ");
    }
}
