//! Resource loading: URL parsing and the fetcher abstraction.
//!
//! The page loader only sees the [`Fetcher`] trait. [`http::HttpFetcher`]
//! is the real implementation (HTTP/1.1, optional TLS, `file://`); tests
//! substitute in-memory fetchers.

pub mod http;
pub mod tls;
#[cfg(feature = "tls-rustls")]
pub mod tls_rustls;

use std::fmt;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// A fetched resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status code; `200` for local files.
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// A 2xx status with a non-empty body.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && !self.body.is_empty()
    }
}

/// Turns a URL into bytes.
pub trait Fetcher {
    /// Fetch `url`. Transport failures are errors; HTTP error statuses
    /// are returned as responses.
    fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

// ---------------------------------------------------------------------------
// URL parsing and resolution (simplified RFC 3986)
// ---------------------------------------------------------------------------

/// A parsed absolute URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Url {
    /// Lowercased scheme (`"http"`, `"https"`, `"file"`).
    pub scheme: String,
    /// Host; empty for `file:///path`.
    pub host: String,
    pub port: Option<u16>,
    /// Path starting with `/`.
    pub path: String,
    /// Query without the leading `?`.
    pub query: Option<String>,
    /// Fragment without the leading `#`.
    pub fragment: Option<String>,
}

impl Url {
    /// Parse an absolute URL (`scheme://host[:port]/path?query#fragment`).
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        let idx = url.find("://")?;
        let scheme = &url[..idx];
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return None;
        }
        let url = Self::parse_authority_and_path(scheme, &url[idx + 3..]);
        if url.host.is_empty() && url.scheme != "file" {
            return None;
        }
        Some(url)
    }

    fn parse_authority_and_path(scheme: &str, rest: &str) -> Url {
        let (rest, query, fragment) = split_path_query_fragment(rest);

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest.as_str(), "/"),
        };

        let (host, port) = match authority.rfind(':') {
            Some(i) => match authority[i + 1..].parse::<u16>() {
                Ok(p) => (&authority[..i], Some(p)),
                Err(_) => (authority, None),
            },
            None => (authority, None),
        };

        Url {
            scheme: scheme.to_lowercase(),
            host: host.to_string(),
            port,
            path: path.to_string(),
            query,
            fragment,
        }
    }

    /// Resolve a reference found in a page against this URL.
    ///
    /// Handles absolute URLs, scheme-relative (`//host/x`), root-relative
    /// (`/x`), query-only (`?q`), fragment-only (`#f`) and relative paths
    /// with `.` and `..` segments.
    pub fn resolve(&self, reference: &str) -> Option<Url> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Some(self.clone());
        }

        if reference.contains("://") {
            return Url::parse(reference);
        }

        if reference.starts_with("//") {
            return Url::parse(&format!("{}:{}", self.scheme, reference));
        }

        if let Some(frag) = reference.strip_prefix('#') {
            let mut resolved = self.clone();
            resolved.fragment = Some(frag.to_string());
            return Some(resolved);
        }

        if let Some(query) = reference.strip_prefix('?') {
            let mut resolved = self.clone();
            resolved.query = Some(query.to_string());
            resolved.fragment = None;
            return Some(resolved);
        }

        let (rel_path, query, fragment) = split_path_query_fragment(reference);
        let path = if rel_path.starts_with('/') {
            resolve_path("/", &rel_path)
        } else {
            resolve_path(self.directory(), &rel_path)
        };
        Some(Url {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            path,
            query,
            fragment,
        })
    }

    /// Everything in the path up to and including the last `/`.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..=i],
            None => "/",
        }
    }

    /// Well-known port for the scheme.
    pub fn default_port(&self) -> u16 {
        if self.scheme == "https" { 443 } else { 80 }
    }

    /// Explicit port, or the scheme's well-known one.
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or_else(|| self.default_port())
    }

    /// Path plus query, as sent in a request line.
    pub fn request_target(&self) -> String {
        match self.query {
            Some(ref q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.path)?;
        if let Some(ref q) = self.query {
            write!(f, "?{q}")?;
        }
        if let Some(ref frag) = self.fragment {
            write!(f, "#{frag}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Split `path?query#fragment`.
fn split_path_query_fragment(s: &str) -> (String, Option<String>, Option<String>) {
    let (s, fragment) = match s.split_once('#') {
        Some((s, f)) => (s, Some(f.to_string())),
        None => (s, None),
    };
    let (path, query) = match s.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (s.to_string(), None),
    };
    (path, query, fragment)
}

/// Join `relative` onto `base_dir`, collapsing `.` and `..`. A trailing
/// slash on the reference is kept.
fn resolve_path(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for seg in relative.split('/') {
        match seg {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            s => segments.push(s),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    if relative.ends_with('/') && !path.ends_with('/') {
        path.push('/');
    }
    path
}
