//! Side effects requested by a view

use wren_privacy::{Certificate, Script};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetAutoLoadImages(bool),
    /// Engine zoom factor, 1.0 = 100%
    SetZoomLevel(f64),
    RunScript(Script),
    TitleChanged(String),
    LoadHtml {
        html: String,
        base_uri: Option<String>,
    },
    /// Drop cached previews of a URI
    DeletePreviews(String),
    /// Reload the URI once the network comes back
    ScheduleNetworkRecheck(String),
    CancelNetworkRecheck,
    TrustCertificate {
        certificate: Certificate,
        host: String,
    },
    LoadUri(String),
    /// Pull readable content out of the loaded document
    ExtractReadable,
}

/// Result of a load failure
#[derive(Debug, Clone, PartialEq)]
pub enum FailureOutcome {
    /// Unrecognized error code: the engine keeps its default behavior
    PassThrough,
    /// An error page replaces the engine's
    Handled(Vec<Effect>),
}

impl FailureOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, FailureOutcome::Handled(_))
    }

    pub fn effects(&self) -> &[Effect] {
        match self {
            FailureOutcome::Handled(effects) => effects,
            FailureOutcome::PassThrough => &[],
        }
    }
}
