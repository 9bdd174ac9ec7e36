//! Engine boundary
//!
//! The engine renders, runs scripts and validates certificates. The shell
//! only sees it through `Engine` (calls into it) and `EngineEvent`
//! (callbacks out of it).

use wren_navigation::{MouseButton, NavigationType};
use wren_privacy::{Certificate, PermissionKind, PermissionState};
use wren_view::{EngineSetting, InputSource};

use crate::forms::FormSubmission;

/// Calls the shell makes into one engine view.
pub trait Engine {
    fn load_uri(&mut self, uri: &str);

    fn load_html(&mut self, html: &str, base_uri: Option<&str>);

    fn load_plain_text(&mut self, text: &str);

    fn run_script(&mut self, source: &str);

    fn set_setting(&mut self, setting: &EngineSetting);

    /// 1.0 = 100%
    fn set_zoom_level(&mut self, level: f64);

    fn allow_certificate(&mut self, certificate: &Certificate, host: &str);

    fn can_show_mime_type(&self, mime_type: &str) -> bool;

    fn uri(&self) -> Option<String>;

    fn title(&self) -> Option<String>;

    /// HTML of the current document
    fn document_source(&self) -> Option<String>;

    /// Allocated width in pixels
    fn width(&self) -> u32;

    fn submit_form(&mut self, form_id: u64);

    /// Cover the page with a separate surface showing `html`. Loads on the
    /// overlay produce no `EngineEvent`s for this view.
    fn show_overlay(&mut self, html: &str);

    /// Remove the overlay surface; the page underneath is shown unchanged.
    fn hide_overlay(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    Started,
    Committed,
    Finished,
}

/// Callbacks from one engine view
#[derive(Debug, Clone)]
pub enum EngineEvent {
    NavigationPolicy {
        uri: String,
        mouse_button: MouseButton,
        navigation_type: NavigationType,
        new_window: bool,
    },
    ResponsePolicy {
        uri: String,
        mime_type: String,
    },
    LoadChanged(LoadEvent),
    LoadFailed {
        uri: String,
        code: i32,
    },
    TlsFailed {
        uri: String,
        certificate: Certificate,
        flags: u32,
    },
    UriChanged(String),
    TitleChanged(String),
    /// The engine asked for an `accept:` URI
    AcceptRequest(String),
    InsecureContent,
    DownloadStarted {
        uri: String,
        suggested_file_name: Option<String>,
        mime_type: Option<String>,
    },
    FormSubmitted(FormSubmission),
    PermissionRequest(PermissionKind),
    Scroll(InputSource),
    WebProcessCrashed,
}

/// How a policy decision is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyResponse {
    Use,
    Download,
    Ignore,
}

/// What the engine should do after an event was handled
#[derive(Debug, Clone, PartialEq)]
pub enum EventResponse {
    /// Nothing to answer
    None,
    Policy(PolicyResponse),
    /// `true` when the shell replaced the engine's default behavior
    Handled(bool),
    Permission(Option<PermissionState>),
    /// Multiplier for the scroll deltas
    ScrollScale(f64),
}
