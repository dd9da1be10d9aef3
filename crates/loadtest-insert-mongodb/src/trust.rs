//! TLS trust store built from a PEM certificate-authority bundle.

use loadtest_core::{BenchError, ConfigError};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A validated CA bundle, shared read-only by every worker.
///
/// The bundle is parsed here only to fail early on unusable content. The
/// `mongodb` 3.x `TlsOptions` take a file path rather than a root store, so
/// the driver loads the same path again when it opens connections.
#[derive(Debug, Clone)]
pub struct TrustConfig {
    ca_file_path: PathBuf,
    anchor_count: usize,
}

impl TrustConfig {
    /// File the transport layer loads the CA bundle from.
    pub fn ca_file_path(&self) -> &Path {
        &self.ca_file_path
    }

    /// Number of trust anchors parsed from the bundle.
    pub fn anchor_count(&self) -> usize {
        self.anchor_count
    }
}

/// Read `ca_file_path` and check it holds at least one usable certificate.
///
/// Sections that are not certificates are ignored. Malformed certificate
/// sections are skipped as long as one good certificate remains.
pub fn build_trust_config<P: AsRef<Path>>(ca_file_path: P) -> Result<TrustConfig, BenchError> {
    let path = ca_file_path.as_ref();
    let pem = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut certs = Vec::new();
    for (position, item) in CertificateDer::pem_slice_iter(&pem).enumerate() {
        match item {
            Ok(cert) => certs.push(cert),
            Err(e) => warn!("Skipping malformed PEM section #{} in {:?}: {}", position, path, e),
        }
    }
    if certs.is_empty() {
        return Err(BenchError::TrustParse {
            path: path.to_path_buf(),
            reason: "no PEM certificate found".to_string(),
        });
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if added == 0 {
        return Err(BenchError::TrustParse {
            path: path.to_path_buf(),
            reason: format!("none of the {ignored} certificates is a usable trust anchor"),
        });
    }
    debug!(
        "Loaded {} trust anchors from {:?} ({} ignored)",
        added, path, ignored
    );

    Ok(TrustConfig {
        ca_file_path: path.to_path_buf(),
        anchor_count: roots.len(),
    })
}
