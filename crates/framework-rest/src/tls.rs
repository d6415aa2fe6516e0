//! TLS material for client certificates and custom trust roots.
//!
//! # Client Certificates (mTLS)
//!
//! ```ignore
//! use framework_rest::tls::Identity;
//!
//! let identity = Identity::from_pem_files("/path/to/client.crt", "/path/to/client.key")?;
//!
//! let request = RequestBuilder::new("https://secure.example.com/api")?
//!     .certificate(identity);
//! ```
//!
//! # Custom CA Certificates
//!
//! ```ignore
//! use framework_rest::tls::Certificate;
//!
//! let client = RestClient::builder()
//!     .add_root_certificate(Certificate::from_pem_file("/path/to/ca.crt")?)
//!     .build()?;
//! ```

use std::io::{BufReader, Cursor};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};

use crate::error::{RestError, Result};

fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        RestError::Tls(format!(
            "Failed to read {} '{}': {}",
            what,
            path.display(),
            e
        ))
    })
}

fn parse_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = BufReader::new(Cursor::new(pem));
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| RestError::Tls(format!("Failed to parse PEM certificate: {}", e)))?;

    if certs.is_empty() {
        return Err(RestError::Tls("No certificates found in PEM data".to_string()));
    }
    Ok(certs)
}

fn parse_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>> {
    let mut reader = BufReader::new(Cursor::new(pem));
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| RestError::Tls(format!("Failed to parse private key PEM: {}", e)))?
        .ok_or_else(|| RestError::Tls("No private key found in PEM data".to_string()))
}

/// Re-encode DER bytes as a PEM block with 64-column base64 lines.
fn pem_block(label: &str, der: &[u8]) -> String {
    let b64 = STANDARD.encode(der);
    let mut out = format!("-----BEGIN {label}-----\n");
    for line in b64.as_bytes().chunks(64) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {label}-----\n"));
    out
}

/// A CA certificate (or chain) to add to the client's trust store.
#[derive(Clone)]
pub struct Certificate {
    der_certs: Vec<CertificateDer<'static>>,
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("cert_count", &self.der_certs.len())
            .finish()
    }
}

impl Certificate {
    /// Load certificates from PEM-encoded bytes.
    pub fn from_pem(pem_data: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self {
            der_certs: parse_certs(pem_data.as_ref())?,
        })
    }

    /// Load certificates from a PEM-encoded file.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_pem(read_file(path.as_ref(), "certificate file")?)
    }

    /// Wrap a single DER-encoded certificate.
    pub fn from_der(der_data: impl Into<Vec<u8>>) -> Self {
        Self {
            der_certs: vec![CertificateDer::from(der_data.into())],
        }
    }

    /// Number of certificates held.
    pub fn len(&self) -> usize {
        self.der_certs.len()
    }

    /// Whether no certificate is held.
    pub fn is_empty(&self) -> bool {
        self.der_certs.is_empty()
    }

    pub(crate) fn to_reqwest_certificates(&self) -> Vec<reqwest::Certificate> {
        self.der_certs
            .iter()
            .filter_map(|cert| reqwest::Certificate::from_der(cert.as_ref()).ok())
            .collect()
    }
}

/// Client identity for mutual TLS: a certificate chain plus its private key.
pub struct Identity {
    cert_chain: Vec<CertificateDer<'static>>,
    private_key: PrivateKeyDer<'static>,
}

impl Clone for Identity {
    fn clone(&self) -> Self {
        Self {
            cert_chain: self.cert_chain.clone(),
            private_key: self.private_key.clone_key(),
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("cert_count", &self.cert_chain.len())
            .field("has_key", &true)
            .finish()
    }
}

impl Identity {
    /// Create an identity from PEM-encoded certificate and key bytes.
    ///
    /// The certificate may be a chain with the client certificate first.
    pub fn from_pem(cert_pem: impl AsRef<[u8]>, key_pem: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self {
            cert_chain: parse_certs(cert_pem.as_ref())?,
            private_key: parse_key(key_pem.as_ref())?,
        })
    }

    /// Create an identity from separate PEM files.
    pub fn from_pem_files(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<Self> {
        let cert_pem = read_file(cert_path.as_ref(), "certificate file")?;
        let key_pem = read_file(key_path.as_ref(), "key file")?;
        Self::from_pem(cert_pem, key_pem)
    }

    /// Create an identity from one PEM blob holding both certificate and key.
    pub fn from_pem_combined(pem_data: impl AsRef<[u8]>) -> Result<Self> {
        let pem = pem_data.as_ref();
        Self::from_pem(pem, pem)
    }

    /// Number of certificates in the chain.
    pub fn chain_len(&self) -> usize {
        self.cert_chain.len()
    }

    /// Convert to a reqwest identity (combined PEM, certificates first).
    pub(crate) fn to_reqwest_identity(&self) -> Result<reqwest::Identity> {
        let mut pem = String::new();
        for cert in &self.cert_chain {
            pem.push_str(&pem_block("CERTIFICATE", cert.as_ref()));
        }

        let (label, key_bytes) = match &self.private_key {
            PrivateKeyDer::Pkcs1(key) => ("RSA PRIVATE KEY", key.secret_pkcs1_der()),
            PrivateKeyDer::Pkcs8(key) => ("PRIVATE KEY", key.secret_pkcs8_der()),
            PrivateKeyDer::Sec1(key) => ("EC PRIVATE KEY", key.secret_sec1_der()),
            _ => return Err(RestError::Tls("Unknown private key format".to_string())),
        };
        pem.push_str(&pem_block(label, key_bytes));

        reqwest::Identity::from_pem(pem.as_bytes())
            .map_err(|e| RestError::Tls(format!("Failed to create identity: {}", e)))
    }
}
