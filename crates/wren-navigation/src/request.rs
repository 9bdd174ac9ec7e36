//! Navigation requests as delivered by the engine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// No button involved: script or programmatic navigation
    None,
    /// Left click
    Primary,
    /// Middle click, ctrl-click and friends
    Other,
}

impl MouseButton {
    /// Engine button numbers: 0 none, 1 primary, anything else other
    pub fn from_engine(button: u32) -> Self {
        match button {
            0 => MouseButton::None,
            1 => MouseButton::Primary,
            _ => MouseButton::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationType {
    Other,
    Reload,
    BackForward,
    FormSubmit,
    LinkClick,
}

impl NavigationType {
    /// Link clicks and form submissions express user intent; everything
    /// else may come from a script.
    pub fn is_deliberate(&self) -> bool {
        !matches!(
            self,
            NavigationType::Other | NavigationType::Reload | NavigationType::BackForward
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionKind {
    Response,
    NavigationAction,
    NewWindowAction,
}

/// MIME information attached to response decisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMime {
    pub mime_type: String,
    /// Whether the engine can display this type itself
    pub renderable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub uri: String,
    pub mouse_button: MouseButton,
    pub navigation_type: NavigationType,
    pub kind: DecisionKind,
    /// Present for `DecisionKind::Response` only
    pub response: Option<ResponseMime>,
}

impl NavigationRequest {
    pub fn response(uri: impl Into<String>, mime_type: impl Into<String>, renderable: bool) -> Self {
        Self {
            uri: uri.into(),
            mouse_button: MouseButton::None,
            navigation_type: NavigationType::Other,
            kind: DecisionKind::Response,
            response: Some(ResponseMime {
                mime_type: mime_type.into(),
                renderable,
            }),
        }
    }

    pub fn navigation(
        uri: impl Into<String>,
        mouse_button: MouseButton,
        navigation_type: NavigationType,
    ) -> Self {
        Self {
            uri: uri.into(),
            mouse_button,
            navigation_type,
            kind: DecisionKind::NavigationAction,
            response: None,
        }
    }

    pub fn new_window(
        uri: impl Into<String>,
        mouse_button: MouseButton,
        navigation_type: NavigationType,
    ) -> Self {
        Self {
            kind: DecisionKind::NewWindowAction,
            ..Self::navigation(uri, mouse_button, navigation_type)
        }
    }

    pub fn is_new_window(&self) -> bool {
        self.kind == DecisionKind::NewWindowAction
    }
}
