//! Wren Navigation
//!
//! Decides, for every engine-originated navigation or response, whether the
//! current view uses it, downloads it, or ignores it and spawns a new view:
//!
//! 1. Responses → use if renderable, otherwise download
//! 2. Script-opened windows → popup blocking applies
//! 3. Primary clicks → in place, or a new view for new-window actions
//! 4. Middle/ctrl clicks → always a background view
//!
//! Also resolves what loading a URI actually means (blank page, external
//! handler, `javascript:` code or a web load).

mod error;
mod policy;
mod request;
mod target;

pub use error::NavigationError;
pub use policy::{decide, BlockDecision, PolicyEngine};
pub use request::{DecisionKind, MouseButton, NavigationRequest, NavigationType, ResponseMime};
pub use target::{accept_uri_for, is_accept_uri, resolve_accept_uri, LoadTarget, WEB_SCHEMES};

pub type Result<T> = std::result::Result<T, NavigationError>;
