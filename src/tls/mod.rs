//! TLS certificate validity checks.
//!
//! Connects to `domain:443`, completes a verified TLS handshake and reads the
//! leaf certificate's `notAfter` date.
//!
//! Uses `tokio-rustls` for async TLS connections and `x509-parser` for certificate parsing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::ServerName;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};

/// Returns `true` if the certificate served on `domain:443` has not expired.
///
/// Any failure (bad name, refused connection, timeout, handshake rejection,
/// missing certificate) counts as invalid.
pub async fn check_certificate_validity(domain: &str) -> bool {
    match fetch_certificate_expiry(domain).await {
        Ok(valid_to) => is_certificate_current(valid_to, Utc::now()),
        Err(e) => {
            debug!("Certificate check failed for {domain}: {e:#}");
            false
        }
    }
}

/// A certificate is current while `now` is strictly before its `notAfter`.
pub fn is_certificate_current(valid_to: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    valid_to > now
}

/// Retrieves the `notAfter` date of the certificate served on `domain:443`.
///
/// The stream is shut down once the certificate has been read.
///
/// # Errors
///
/// Returns an error if:
/// - The domain name is invalid
/// - TCP connection fails or times out
/// - TLS handshake fails or times out (expired certificates fail here)
/// - No certificate is presented or it cannot be parsed
pub async fn fetch_certificate_expiry(domain: &str) -> Result<DateTime<Utc>> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .context("TLS protocol configuration failed")?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let server_name = ServerName::try_from(domain.to_string())
        .with_context(|| format!("Invalid domain name: {domain}"))?;

    let sock = tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((domain, 443)),
    )
    .await
    .with_context(|| {
        format!("TCP connection timeout for {domain}:443 ({TCP_CONNECT_TIMEOUT_SECS}s)")
    })?
    .with_context(|| format!("Failed to connect to {domain}:443"))?;

    let connector = TlsConnector::from(Arc::new(config));
    let mut tls_stream = tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    .with_context(|| format!("TLS handshake timeout for {domain} ({TLS_HANDSHAKE_TIMEOUT_SECS}s)"))?
    .with_context(|| format!("TLS connection failed for {domain}"))?;

    let valid_to = leaf_certificate_expiry(tls_stream.get_ref().1.peer_certificates());

    if let Err(e) = tls_stream.shutdown().await {
        debug!("TLS shutdown for {domain} failed: {e}");
    }

    valid_to.with_context(|| format!("Failed to read certificate for {domain}"))
}

fn leaf_certificate_expiry(
    certs: Option<&[rustls::pki_types::CertificateDer<'_>]>,
) -> Result<DateTime<Utc>> {
    let leaf = certs
        .and_then(|certs| certs.first())
        .context("Server presented no certificate")?;
    let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to parse certificate: {e}"))?;
    let timestamp = cert.tbs_certificate.validity.not_after.timestamp();
    DateTime::from_timestamp(timestamp, 0).context("notAfter is out of range")
}
