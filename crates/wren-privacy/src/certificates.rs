//! Certificate trust overrides
//!
//! Overrides live for the lifetime of the process and are never persisted.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A certificate rejected by the engine, as DER bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    pub fn from_der(der: Vec<u8>) -> Self {
        Self { der }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Lowercase hex SHA-256 of the DER bytes
    pub fn fingerprint(&self) -> String {
        format!("{:x}", Sha256::digest(&self.der))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("sha256", &self.fingerprint())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct TrustStore {
    /// Host -> accepted certificate fingerprints
    hosts: HashMap<String, HashSet<String>>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&mut self, certificate: &Certificate, host: &str) {
        let fingerprint = certificate.fingerprint();
        tracing::warn!(host = %host, sha256 = %fingerprint, "Trusting rejected certificate");
        self.hosts
            .entry(host.to_lowercase())
            .or_default()
            .insert(fingerprint);
    }

    pub fn is_trusted(&self, certificate: &Certificate, host: &str) -> bool {
        self.hosts
            .get(&host.to_lowercase())
            .is_some_and(|set| set.contains(&certificate.fingerprint()))
    }

    pub fn trusted_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.hosts.keys().cloned().collect();
        hosts.sort();
        hosts
    }
}
