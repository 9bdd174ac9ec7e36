//! Messages between views and the shell

use wren_download::Download;

use crate::forms::{Credentials, FormSubmission};

/// Published by a view for the rest of the shell
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// Open `uri` in a new view; `popup` views are shown, others open in
    /// the background
    NewPage {
        view_id: String,
        uri: String,
        popup: bool,
    },
    PopupBlocked {
        view_id: String,
        uri: String,
    },
    TitleChanged {
        view_id: String,
        title: String,
    },
    Readable {
        view_id: String,
    },
    SavePassword {
        username: String,
        password: String,
        host: String,
    },
    DownloadStarted(Download),
    /// Hand `uri` to an external program
    OpenExternal(String),
    Crashed {
        view_id: String,
    },
}

/// Delivered back to a view's control thread by background work
#[derive(Debug, Clone)]
pub enum ViewCommand {
    /// Network is back: retry the failed URI
    Reload { view_id: String, uri: String },
    FormChecked {
        view_id: String,
        generation: u64,
        form: FormSubmission,
        credentials: Option<Credentials>,
    },
}

impl ViewCommand {
    pub fn view_id(&self) -> &str {
        match self {
            ViewCommand::Reload { view_id, .. } | ViewCommand::FormChecked { view_id, .. } => view_id,
        }
    }
}
