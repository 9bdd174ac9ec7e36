//! Collaborators shared by every view

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};

use wren_download::DownloadManager;
use wren_privacy::{ExceptionRegistry, PermissionPolicy, ScriptCatalog, TrustStore};
use wren_storage::SettingsSource;
use wren_view::{ErrorPageTemplates, NetworkMonitor, SystemFonts, ViewContext};

use crate::art::ArtCache;
use crate::forms::CredentialSource;
use crate::Result;

pub struct ViewServices {
    pub settings: Arc<dyn SettingsSource>,
    pub exceptions: Arc<dyn ExceptionRegistry>,
    pub scripts: Arc<ScriptCatalog>,
    pub network: Arc<dyn NetworkMonitor>,
    pub templates: ErrorPageTemplates,
    /// Certificates accepted for the lifetime of the process
    pub trust: Arc<RwLock<TrustStore>>,
    pub downloads: DownloadManager,
    pub art: ArtCache,
    pub credentials: Arc<dyn CredentialSource>,
    pub permissions: PermissionPolicy,
    pub fonts: SystemFonts,
    pub recheck_interval: Duration,
    /// Runtime that timers and credential lookups are spawned on
    pub runtime: Handle,
}

impl ViewServices {
    pub fn context(&self, window_zoom: f64) -> ViewContext<'_> {
        ViewContext {
            settings: self.settings.as_ref(),
            exceptions: self.exceptions.as_ref(),
            scripts: self.scripts.as_ref(),
            network: self.network.as_ref(),
            templates: &self.templates,
            window_zoom,
        }
    }
}

/// Handle to the current runtime, or to a small dedicated one when called
/// outside any runtime. The caller keeps the returned `Runtime` alive.
pub(crate) fn background_runtime() -> Result<(Handle, Option<Runtime>)> {
    if let Ok(handle) = Handle::try_current() {
        return Ok((handle, None));
    }

    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("wren-background")
        .enable_time()
        .build()?;
    tracing::debug!("Started dedicated background runtime");

    Ok((runtime.handle().clone(), Some(runtime)))
}
