//! Wren View
//!
//! Everything a single web view decides on its own, without an engine:
//!
//! ```text
//! Idle → Started → Committed → Finished
//!           │          │
//!           └──────────┴──────→ Failed
//! ```
//!
//! Each transition returns the side effects the adapter must apply
//! (image loading, zoom, script injection, error pages, certificate trust).

mod context;
mod effect;
mod error;
mod error_page;
mod profile;
mod state;
mod tls;
mod view;

pub use context::{NetworkMonitor, ViewContext};
pub use effect::{Effect, FailureOutcome};
pub use error::ViewError;
pub use error_page::{escape_html, ErrorPage, ErrorPageTemplates};
pub use profile::{
    document_font_size, engine_profile, font_family, font_settings, EngineSetting, InputSource,
    ScrollAdjustment, ScrollTracker, SettingValue, SystemFonts,
};
pub use state::LoadState;
pub use tls::{failure_reason, CertificateError, UNVERIFIED_IDENTITY};
pub use view::{is_error_page, zoom_factor, ViewState, ERROR_PAGE_URI, RECOGNIZED_ERROR_CODES};

pub type Result<T> = std::result::Result<T, ViewError>;
