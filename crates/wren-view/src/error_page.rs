//! Error pages
//!
//! Two templates are filled in by plain `@NAME@` substitution: a stylesheet
//! and an HTML body. The stylesheet's `@button@` slot hides the action
//! button when it would be useless (no network to retry with).

use std::fs;
use std::path::Path;

use wren_navigation::accept_uri_for;

use crate::Result;

const BUILTIN_STYLESHEET: &str = include_str!("../resources/error.css");
const BUILTIN_HTML: &str = include_str!("../resources/error.html");

const ICON_INFORMATION: &str = "internal:///icons/dialog-information-symbolic.svg";
const ICON_OFFLINE: &str = "internal:///icons/network-offline-symbolic.svg";
const ICON_WARNING: &str = "internal:///icons/dialog-warning-symbolic.svg";

/// Escape text for HTML body and attribute contexts.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Content of one error page. `detail` is trusted markup, everything else
/// is escaped on render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    pub title: String,
    pub subtitle: String,
    pub detail: String,
    pub icon: String,
    /// Navigated to when the button is pressed
    pub action: String,
    pub button_label: String,
    pub button_class: String,
    pub show_button: bool,
}

impl ErrorPage {
    /// Page shown when a load fails with a recognized network error.
    pub fn load_failure(uri: &str, network_available: bool) -> Self {
        let (title, detail, icon) = if network_available {
            (
                "Failed to load this web page",
                "It may be temporarily inaccessible or moved to a new address.<br/>\
                 You may wish to verify that your internet connection is working correctly.",
                ICON_INFORMATION,
            )
        } else {
            (
                "Network not available",
                "Check your network connection",
                ICON_OFFLINE,
            )
        };

        Self {
            title: title.to_string(),
            subtitle: format!("{} is not available", uri),
            detail: detail.to_string(),
            icon: icon.to_string(),
            action: uri.to_string(),
            button_label: "Retry".to_string(),
            button_class: "suggested-action".to_string(),
            show_button: network_available,
        }
    }

    /// Interstitial shown when the engine rejects a certificate.
    pub fn tls_interstitial(uri: &str, reason: &str) -> Self {
        let detail = format!(
            "This does not look like the real {}.<br/>\
             Attackers might be trying to steal or alter information going to or from \
             this site (for example, private messages, credit card information, or passwords).",
            escape_html(uri)
        );

        Self {
            title: "Connection is not secure".to_string(),
            subtitle: reason.to_string(),
            detail,
            icon: ICON_WARNING.to_string(),
            action: accept_uri_for(uri),
            button_label: "Accept Risk and Proceed".to_string(),
            button_class: "destructive-action".to_string(),
            show_button: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorPageTemplates {
    stylesheet: String,
    html: String,
}

impl Default for ErrorPageTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ErrorPageTemplates {
    pub fn new(stylesheet: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            html: html.into(),
        }
    }

    /// Templates compiled into the binary
    pub fn builtin() -> Self {
        Self::new(BUILTIN_STYLESHEET, BUILTIN_HTML)
    }

    /// Load `error.css` and `error.html` from a directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let stylesheet = fs::read_to_string(dir.join("error.css"))?;
        let html = fs::read_to_string(dir.join("error.html"))?;
        tracing::info!(dir = %dir.display(), "Loaded error page templates");
        Ok(Self::new(stylesheet, html))
    }

    pub fn render(&self, page: &ErrorPage) -> String {
        let button = if page.show_button { "" } else { "display: none" };
        let stylesheet = substitute(&self.stylesheet, &[("button", button)]);

        let title = escape_html(&page.title);
        let icon = escape_html(&page.icon);
        let subtitle = escape_html(&page.subtitle);
        let action = escape_html(&page.action);
        let button_class = escape_html(&page.button_class);
        let button_label = escape_html(&page.button_label);

        substitute(
            &self.html,
            &[
                ("STYLE", stylesheet.as_str()),
                ("TITLE", title.as_str()),
                ("ICON", icon.as_str()),
                ("SUBTITLE", subtitle.as_str()),
                ("ACTION", action.as_str()),
                ("BUTTON_CLASS", button_class.as_str()),
                ("BUTTON_LABEL", button_label.as_str()),
                ("DETAIL", page.detail.as_str()),
            ],
        )
    }

    pub fn load_failure(&self, uri: &str, network_available: bool) -> String {
        self.render(&ErrorPage::load_failure(uri, network_available))
    }

    pub fn tls_interstitial(&self, uri: &str, reason: &str) -> String {
        self.render(&ErrorPage::tls_interstitial(uri, reason))
    }
}

/// Replace every `@NAME@` in one pass. Inserted values are never scanned
/// again; unknown names are left as written.
fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('@') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let value = after.find('@').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('@');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
