//! TLS provider abstraction.
//!
//! The HTTP client hands a connected [`TcpStream`] to a [`TlsProvider`]
//! and gets back an encrypted byte stream. The client never depends on a
//! concrete TLS library.

use std::io::{Read, Write};
use std::net::TcpStream;

use crate::error::Result;

/// A bidirectional byte stream.
pub trait Connection: Read + Write + Send {}

impl<T: Read + Write + Send> Connection for T {}

/// Provides TLS client connections.
pub trait TlsProvider: Send + Sync {
    /// Wrap `stream` in a TLS client session for `server_name` (used for
    /// SNI and certificate verification).
    fn connect_tls(&self, stream: TcpStream, server_name: &str) -> Result<Box<dyn Connection>>;
}
