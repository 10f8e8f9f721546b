//! Client certificate loading for TLS connections to the brokers.
//!
//! The certificate chain and private key are read from disk once, parsed
//! with OpenSSL, checked to belong together, and handed to librdkafka as
//! inline PEM strings. Broker certificates are always verified.

use crate::{Error, Result};
use openssl::pkey::PKey;
use openssl::x509::X509;
use rdkafka::ClientConfig;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A client certificate chain and the private key of its leaf certificate,
/// both PEM encoded.
#[derive(Clone)]
pub struct TlsIdentity {
    certificate_pem: String,
    private_key_pem: String,
}

impl TlsIdentity {
    pub fn load(cert_file: &Path, key_file: &Path) -> Result<Self> {
        let certificate_pem = read_file("certificate", cert_file)?;
        let private_key_pem = read_file("private key", key_file)?;

        Self::from_pem(certificate_pem, private_key_pem)
    }

    /// Parses both halves and fails with [`Error::Authentication`] unless
    /// the first certificate's public key matches the private key.
    pub fn from_pem(certificate_pem: String, private_key_pem: String) -> Result<Self> {
        let keypair_error = |reason: String| {
            Error::Authentication(format!(
                "Couldn't establish TLS authentication keypair ({}). Check TLS_CERT_FILE and TLS_PRIVKEY_FILE.",
                reason
            ))
        };

        let chain = X509::stack_from_pem(certificate_pem.as_bytes())
            .map_err(|e| keypair_error(format!("invalid certificate: {}", e)))?;
        let leaf = chain
            .first()
            .ok_or_else(|| keypair_error("no certificate found".to_string()))?;

        let key = PKey::private_key_from_pem(private_key_pem.as_bytes())
            .map_err(|e| keypair_error(format!("invalid private key: {}", e)))?;

        let leaf_key = leaf
            .public_key()
            .map_err(|e| keypair_error(format!("unreadable certificate key: {}", e)))?;
        if !leaf_key.public_eq(&key) {
            return Err(keypair_error(
                "private key does not match certificate".to_string(),
            ));
        }

        debug!(certificates = chain.len(), "Loaded TLS client identity");

        Ok(Self {
            certificate_pem,
            private_key_pem,
        })
    }

    pub fn apply(&self, client_config: &mut ClientConfig) {
        client_config
            .set("security.protocol", "ssl")
            .set("ssl.certificate.pem", &self.certificate_pem)
            .set("ssl.key.pem", &self.private_key_pem)
            .set("enable.ssl.certificate.verification", "true")
            .set("ssl.endpoint.identification.algorithm", "https");
    }
}

impl fmt::Debug for TlsIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsIdentity")
            .field("certificate_pem", &self.certificate_pem)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

fn read_file(what: &'static str, path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::TlsFile {
        what,
        path: path.to_path_buf(),
        source,
    })
}
