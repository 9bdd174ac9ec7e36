//! Credential lookup on form submission
//!
//! The lookup may block (it talks to the page's content process), so it
//! runs on the blocking pool and its result comes back as a command.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::events::ViewCommand;
use crate::Result;

/// A form the engine is holding until the shell releases it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub form_id: u64,
    /// Engine page whose form fields are read
    pub page_id: u64,
    pub uri: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads the login fields of a submitted form.
pub trait CredentialSource: Send + Sync {
    fn lookup(&self, page_id: u64) -> Result<Option<Credentials>>;
}

/// Source for shells without a content-process helper
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn lookup(&self, _page_id: u64) -> Result<Option<Credentials>> {
        Ok(None)
    }
}

/// Run the lookup off-thread and report back with `generation` attached.
pub(crate) fn spawn_lookup(
    runtime: &Handle,
    source: Arc<dyn CredentialSource>,
    view_id: String,
    generation: u64,
    form: FormSubmission,
    commands: UnboundedSender<ViewCommand>,
) {
    runtime.spawn_blocking(move || {
        let credentials = match source.lookup(form.page_id) {
            Ok(found) => found.filter(|c| !c.username.is_empty() && !c.password.is_empty()),
            Err(e) => {
                tracing::warn!(view_id = %view_id, error = %e, "Credential lookup failed");
                None
            }
        };

        let command = ViewCommand::FormChecked {
            view_id,
            generation,
            form,
            credentials,
        };
        if commands.send(command).is_err() {
            tracing::debug!("View closed before credential lookup finished");
        }
    });
}
