//! Navigation policy
//!
//! ```text
//! Response                      → Use | Download (MIME only)
//! NewWindow, no button          → spawn popup, or Use in place when blocked
//! Navigation, no button         → Use
//! Primary button                → spawn popup for NewWindow, else Use
//! Other button                  → spawn background view, never blocked
//! ```

use serde::{Deserialize, Serialize};

use wren_privacy::{ExceptionQuery, ExceptionRegistry};

use crate::request::{DecisionKind, MouseButton, NavigationRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockDecision {
    /// Let the current view handle it
    Use,
    /// Hand the response to the download manager
    Download,
    /// Ignore in the current view and open `uri` in a new one
    IgnoreAndSpawn { uri: String, is_popup: bool },
}

impl BlockDecision {
    pub fn spawns_view(&self) -> bool {
        matches!(self, BlockDecision::IgnoreAndSpawn { .. })
    }
}

/// Decide what to do with a request. Pure: identical inputs always give
/// identical decisions.
pub fn decide(request: &NavigationRequest, popup_block_enabled: bool, is_exception: bool) -> BlockDecision {
    if request.kind == DecisionKind::Response {
        let renderable = request
            .response
            .as_ref()
            .map(|mime| mime.renderable)
            .unwrap_or(false);
        return if renderable {
            BlockDecision::Use
        } else {
            BlockDecision::Download
        };
    }

    let spawn = |is_popup| BlockDecision::IgnoreAndSpawn {
        uri: request.uri.clone(),
        is_popup,
    };

    match request.mouse_button {
        MouseButton::None if request.is_new_window() => {
            if is_exception || !popup_block_enabled || request.navigation_type.is_deliberate() {
                spawn(true)
            } else {
                BlockDecision::Use
            }
        }
        MouseButton::None => BlockDecision::Use,
        MouseButton::Primary if request.is_new_window() => spawn(true),
        MouseButton::Primary => BlockDecision::Use,
        MouseButton::Other => spawn(false),
    }
}

/// `decide` bound to the collaborators that supply its flags.
pub struct PolicyEngine<'a> {
    exceptions: &'a dyn ExceptionRegistry,
    popup_block_enabled: bool,
}

impl<'a> PolicyEngine<'a> {
    pub fn new(exceptions: &'a dyn ExceptionRegistry, popup_block_enabled: bool) -> Self {
        Self {
            exceptions,
            popup_block_enabled,
        }
    }

    pub fn evaluate(&self, request: &NavigationRequest) -> BlockDecision {
        // Only script-opened windows consult the exception registry
        let is_exception = request.mouse_button == MouseButton::None
            && request.is_new_window()
            && ExceptionQuery::from_uri(&request.uri).is_exempt(self.exceptions);

        let decision = decide(request, self.popup_block_enabled, is_exception);

        if request.is_new_window() && request.mouse_button == MouseButton::None && !decision.spawns_view() {
            tracing::debug!(uri = %request.uri, "Blocked popup");
        }

        decision
    }
}
