//! Collaborators consulted by a view while it reacts to load events

use wren_privacy::{ExceptionRegistry, ScriptCatalog};
use wren_storage::SettingsSource;

use crate::error_page::ErrorPageTemplates;

/// Reports whether the machine currently has network connectivity.
pub trait NetworkMonitor: Send + Sync {
    fn is_available(&self) -> bool;
}

/// Borrowed capabilities handed to every load transition.
pub struct ViewContext<'a> {
    pub settings: &'a dyn SettingsSource,
    pub exceptions: &'a dyn ExceptionRegistry,
    pub scripts: &'a ScriptCatalog,
    pub network: &'a dyn NetworkMonitor,
    pub templates: &'a ErrorPageTemplates,
    /// Zoom multiplier of the window hosting the view (1.0 = 100%)
    pub window_zoom: f64,
}
