//! [`TlsProvider`] backed by rustls.
//!
//! Enabled by the `tls-rustls` feature. Trusts the Mozilla root set from
//! `webpki-roots` unless built with [`RustlsTlsProvider::with_roots`].

use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::error::{ReexError, Result};

use super::tls::{Connection, TlsProvider};

/// Shared TLS client configuration (one per process).
pub struct RustlsTlsProvider {
    config: Arc<ClientConfig>,
}

impl RustlsTlsProvider {
    /// Trust the bundled Mozilla roots.
    pub fn new() -> Self {
        Self::with_roots(RootCertStore::from_iter(
            webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
        ))
    }

    /// Trust exactly `root_store`, e.g. a private CA.
    pub fn with_roots(root_store: RootCertStore) -> Self {
        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for RustlsTlsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsProvider for RustlsTlsProvider {
    fn connect_tls(&self, stream: TcpStream, server_name: &str) -> Result<Box<dyn Connection>> {
        let sni = ServerName::try_from(server_name.to_owned())
            .map_err(|e| ReexError::Network(format!("invalid server name: {e}")))?;

        let conn = ClientConnection::new(Arc::clone(&self.config), sni)
            .map_err(|e| ReexError::Network(format!("TLS init: {e}")))?;

        // The handshake runs on the first read or write.
        Ok(Box::new(StreamOwned::new(conn, stream)))
    }
}
