//! Minimal HTTP/1.1 GET client and the default [`Fetcher`].
//!
//! Plain HTTP runs over `std::net::TcpStream`; HTTPS needs a
//! [`TlsProvider`]. `file://` URLs are read from disk. Requests block the
//! caller until the response is complete or a timeout fires.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ReexConfig;
use crate::error::{ReexError, Result};

use super::tls::TlsProvider;
use super::{FetchResponse, Fetcher, Url};

/// Maximum response body size (8 MB).
pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP read timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// The network fetcher used by the browser.
pub struct HttpFetcher {
    user_agent: String,
    max_redirects: u8,
    tls: Option<Arc<dyn TlsProvider>>,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>, max_redirects: u8) -> Self {
        Self {
            user_agent: user_agent.into(),
            max_redirects,
            tls: None,
        }
    }

    pub fn from_config(config: &ReexConfig) -> Self {
        Self::new(config.user_agent.clone(), config.max_redirects)
    }

    /// Enable HTTPS through `provider`.
    pub fn with_tls(mut self, provider: Arc<dyn TlsProvider>) -> Self {
        self.tls = Some(provider);
        self
    }

    /// GET `url`, following redirects.
    fn http_get(&self, url: &Url) -> Result<FetchResponse> {
        let mut current = url.clone();
        for _ in 0..=self.max_redirects {
            self.check_scheme(&current)?;
            let resp = self.do_request(&current)?;

            if is_redirect(resp.status_code)
                && let Some(location) = find_header(&resp.headers, "location")
            {
                let next = current.resolve(location).ok_or_else(|| {
                    ReexError::Network(format!("bad redirect Location: {location}"))
                })?;
                log::debug!("{} redirected to {next}", resp.status_code);
                current = next;
                continue;
            }

            return Ok(FetchResponse {
                url: current.to_string(),
                status: resp.status_code,
                body: resp.body,
            });
        }

        Err(ReexError::Network(format!(
            "too many redirects (limit {})",
            self.max_redirects
        )))
    }

    fn check_scheme(&self, url: &Url) -> Result<()> {
        match url.scheme.as_str() {
            "http" => Ok(()),
            "https" if self.tls.is_some() => Ok(()),
            "https" => Err(ReexError::Network(format!(
                "HTTPS not supported without TLS: {url}"
            ))),
            scheme => Err(ReexError::Network(format!(
                "unsupported scheme for HTTP client: {scheme}"
            ))),
        }
    }

    /// Connect, optionally upgrade to TLS, send GET, read and parse.
    fn do_request(&self, url: &Url) -> Result<HttpResponse> {
        let stream = tcp_connect(&url.host, url.port_or_default())?;

        let raw = match (url.scheme.as_str(), &self.tls) {
            ("https", Some(tls)) => {
                let mut conn = tls.connect_tls(stream, &url.host)?;
                send_request(&mut conn, url, &self.user_agent)?;
                read_response(&mut conn)?
            },
            _ => {
                let mut stream = stream;
                send_request(&mut stream, url, &self.user_agent)?;
                read_response(&mut stream)?
            },
        };
        parse_response(&raw)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let parsed =
            Url::parse(url).ok_or_else(|| ReexError::Network(format!("invalid URL: {url}")))?;
        if parsed.scheme == "file" {
            return read_file(&parsed);
        }
        self.http_get(&parsed)
    }
}

/// Read a `file://` URL from the local filesystem.
fn read_file(url: &Url) -> Result<FetchResponse> {
    let body = std::fs::read(&url.path)?;
    if body.len() > MAX_BODY_SIZE {
        return Err(ReexError::Network(
            "response body exceeds 8 MB limit".to_string(),
        ));
    }
    Ok(FetchResponse {
        url: url.to_string(),
        status: 200,
        body,
    })
}

// -------------------------------------------------------------------
// Wire format
// -------------------------------------------------------------------

/// A raw parsed HTTP response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    /// Lowercased header names with trimmed values.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Open a TCP connection with connect and read timeouts.
fn tcp_connect(host: &str, port: u16) -> Result<TcpStream> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| ReexError::Network(format!("DNS resolution failed for {host}: {e}")))?
        .next()
        .ok_or_else(|| ReexError::Network(format!("no addresses for {host}:{port}")))?;

    let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
        .map_err(|e| ReexError::Network(format!("TCP connect to {host}:{port} failed: {e}")))?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    Ok(stream)
}

/// Send an HTTP/1.1 GET request.
fn send_request(stream: &mut impl Write, url: &Url, user_agent: &str) -> Result<()> {
    let host_header = match url.port {
        Some(p) if p != url.default_port() => format!("{}:{p}", url.host),
        _ => url.host.clone(),
    };
    let target = url.request_target();

    let request = format!(
        "GET {target} HTTP/1.1\r\n\
         Host: {host_header}\r\n\
         User-Agent: {user_agent}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\
         \r\n"
    );

    stream
        .write_all(request.as_bytes())
        .map_err(|e| ReexError::Network(format!("send request: {e}")))
}

/// Read until EOF or until the read timeout fires. A TLS peer that closes
/// without `close_notify` reports `UnexpectedEof`, which also ends the
/// response; [`parse_response`] rejects a body cut short.
fn read_response(stream: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > MAX_BODY_SIZE + 4096 {
                    return Err(ReexError::Network("response too large".to_string()));
                }
                buf.extend_from_slice(&chunk[..n]);
            },
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock
                        | io::ErrorKind::TimedOut
                        | io::ErrorKind::UnexpectedEof
                ) =>
            {
                break;
            },
            Err(e) => return Err(ReexError::Network(format!("read response: {e}"))),
        }
    }
    Ok(buf)
}

/// Parse raw bytes into status, headers and body.
pub fn parse_response(data: &[u8]) -> Result<HttpResponse> {
    let header_end = find_subsequence(data, b"\r\n\r\n").ok_or_else(|| {
        ReexError::Network("malformed HTTP response: no header terminator".to_string())
    })?;

    let header_str = std::str::from_utf8(&data[..header_end])
        .map_err(|_| ReexError::Network("non-UTF-8 headers".to_string()))?;
    let mut lines = header_str.split("\r\n");

    let status_line = lines
        .next()
        .ok_or_else(|| ReexError::Network("empty response".to_string()))?;
    let status_code = parse_status_line(status_line)?;

    let headers: Vec<(String, String)> = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let raw_body = &data[header_end + 4..];
    let body = if find_header(&headers, "transfer-encoding").is_some_and(|v| v.contains("chunked"))
    {
        decode_chunked(raw_body)?
    } else if let Some(cl) = find_header(&headers, "content-length") {
        let len: usize = cl
            .parse()
            .map_err(|_| ReexError::Network(format!("bad Content-Length: {cl}")))?;
        if len > MAX_BODY_SIZE {
            return Err(ReexError::Network(
                "response body exceeds 8 MB limit".to_string(),
            ));
        }
        if raw_body.len() < len {
            return Err(ReexError::Network(format!(
                "truncated body: got {} of {len} bytes",
                raw_body.len()
            )));
        }
        raw_body[..len].to_vec()
    } else {
        raw_body.to_vec()
    };

    if body.len() > MAX_BODY_SIZE {
        return Err(ReexError::Network(
            "response body exceeds 8 MB limit".to_string(),
        ));
    }

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

/// `HTTP/1.x NNN reason` -> `NNN`.
fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| ReexError::Network(format!("bad status code in: {line}"))),
        _ => Err(ReexError::Network(format!("bad status line: {line}"))),
    }
}

/// Case-insensitive header lookup.
fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let name = name.to_lowercase();
    headers
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.as_str())
}

/// Decode a chunked transfer-encoded body. A chunk cut off before its
/// declared size is an error.
fn decode_chunked(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut pos = 0;

    while let Some(i) = find_subsequence(&data[pos..], b"\r\n") {
        let line_end = pos + i;
        let size_line = std::str::from_utf8(&data[pos..line_end])
            .map_err(|_| ReexError::Network("bad chunk size".to_string()))?;
        let size_str = size_line.split(';').next().unwrap_or("").trim();
        let chunk_size = usize::from_str_radix(size_str, 16)
            .map_err(|_| ReexError::Network(format!("bad chunk size: {size_str:?}")))?;

        if chunk_size == 0 {
            break;
        }
        if result.len() + chunk_size > MAX_BODY_SIZE {
            return Err(ReexError::Network(
                "chunked body exceeds 8 MB limit".to_string(),
            ));
        }

        let start = line_end + 2;
        let end = start + chunk_size;
        if end > data.len() {
            return Err(ReexError::Network(format!(
                "truncated chunk: got {} of {chunk_size} bytes",
                data.len() - start
            )));
        }
        result.extend_from_slice(&data[start..end]);
        pos = (end + 2).min(data.len());
    }

    Ok(result)
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
