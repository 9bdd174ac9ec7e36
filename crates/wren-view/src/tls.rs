//! Certificate failure reasons

use serde::{Deserialize, Serialize};

/// Shown when the failure flags are a combination or unknown
pub const UNVERIFIED_IDENTITY: &str = "The identity of this website has not been verified";

/// Single certificate validation failures, with the engine's bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateError {
    UnknownCa,
    BadIdentity,
    NotActivated,
    Expired,
    Revoked,
    Insecure,
    GenericError,
}

impl CertificateError {
    const ALL: [CertificateError; 7] = [
        CertificateError::UnknownCa,
        CertificateError::BadIdentity,
        CertificateError::NotActivated,
        CertificateError::Expired,
        CertificateError::Revoked,
        CertificateError::Insecure,
        CertificateError::GenericError,
    ];

    pub fn bits(&self) -> u32 {
        match self {
            CertificateError::UnknownCa => 1,
            CertificateError::BadIdentity => 2,
            CertificateError::NotActivated => 4,
            CertificateError::Expired => 8,
            CertificateError::Revoked => 16,
            CertificateError::Insecure => 32,
            CertificateError::GenericError => 64,
        }
    }

    /// Exact match only: `Expired | UnknownCa` is not `Expired`.
    pub fn from_flags(flags: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.bits() == flags)
    }

    pub fn message(&self) -> &'static str {
        match self {
            CertificateError::BadIdentity => "The certificate does not match this website",
            CertificateError::Expired => "The certificate has expired",
            CertificateError::UnknownCa => "The signing certificate authority is not known",
            CertificateError::GenericError => "The certificate contains errors",
            CertificateError::Revoked => "The certificate has been revoked",
            CertificateError::Insecure => "The certificate is signed using a weak signature algorithm",
            CertificateError::NotActivated => "The certificate activation time is still in the future",
        }
    }
}

impl std::fmt::Display for CertificateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Message shown on the interstitial for raw engine flags
pub fn failure_reason(flags: u32) -> &'static str {
    CertificateError::from_flags(flags)
        .map(|e| e.message())
        .unwrap_or(UNVERIFIED_IDENTITY)
}
