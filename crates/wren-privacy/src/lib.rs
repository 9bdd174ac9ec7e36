//! Wren Privacy Protection
//!
//! - Exception registry: hosts and host+path prefixes exempt from blocking
//! - Per-host ad-block scripts injected once a page has finished loading
//! - Permission answers for geolocation and notifications
//! - Process-lifetime trust overrides for rejected TLS certificates

mod certificates;
mod error;
mod exceptions;
mod permissions;
mod scripts;

pub use certificates::{Certificate, TrustStore};
pub use error::PrivacyError;
pub use exceptions::{netloc, ExceptionQuery, ExceptionRegistry, Exceptions};
pub use permissions::{PermissionContext, PermissionKind, PermissionPolicy, PermissionState};
pub use scripts::{strip_last_label, Script, ScriptCatalog};

pub type Result<T> = std::result::Result<T, PrivacyError>;
