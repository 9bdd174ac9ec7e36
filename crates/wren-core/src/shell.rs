//! Shell composition root
//!
//! Builds the shared services from `Config` once and hands out view
//! controllers bound to them.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use wren_download::DownloadManager;
use wren_privacy::{Exceptions, PermissionPolicy, ScriptCatalog, TrustStore};
use wren_storage::{Database, SettingsStore};
use wren_view::ErrorPageTemplates;

use crate::art::ArtCache;
use crate::config::Config;
use crate::controller::ViewController;
use crate::engine::Engine;
use crate::events::{ShellEvent, ViewCommand};
use crate::forms::{CredentialSource, NoCredentials};
use crate::network::SharedNetworkMonitor;
use crate::services::{background_runtime, ViewServices};
use crate::Result;

/// Receiving ends of the shell channels, owned by the control loop.
pub struct ShellChannels {
    pub events: UnboundedReceiver<ShellEvent>,
    pub commands: UnboundedReceiver<ViewCommand>,
}

pub struct Shell {
    config: Config,
    settings: SettingsStore,
    exceptions: Exceptions,
    network: SharedNetworkMonitor,
    services: Arc<ViewServices>,
    events: UnboundedSender<ShellEvent>,
    commands: UnboundedSender<ViewCommand>,
    /// Present when the shell was built outside a tokio runtime
    runtime: Option<Runtime>,
}

impl Shell {
    /// Open the on-disk database and build the shell.
    pub fn new(config: Config) -> Result<(Self, ShellChannels)> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&config.database_path)?;

        Self::with_database(config, db, Arc::new(NoCredentials))
    }

    pub fn with_database(
        config: Config,
        db: Database,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<(Self, ShellChannels)> {
        let settings = SettingsStore::new(db.clone());
        let exceptions = Exceptions::load(db.clone())?;
        let scripts = ScriptCatalog::from_dir(&config.adblock_dir)?;

        let templates = match &config.templates_dir {
            Some(dir) => ErrorPageTemplates::from_dir(dir).unwrap_or_else(|e| {
                tracing::warn!(dir = %dir.display(), error = %e, "Falling back to built-in error pages");
                ErrorPageTemplates::builtin()
            }),
            None => ErrorPageTemplates::builtin(),
        };

        let downloads = DownloadManager::new(db, config.download_dir.clone());
        downloads.load()?;

        let network = SharedNetworkMonitor::default();
        let (handle, runtime) = background_runtime()?;

        let services = Arc::new(ViewServices {
            settings: Arc::new(settings.clone()),
            exceptions: Arc::new(exceptions.clone()),
            scripts: Arc::new(scripts),
            network: Arc::new(network.clone()),
            templates,
            trust: Arc::new(RwLock::new(TrustStore::new())),
            downloads,
            art: ArtCache::new(config.cache_dir.clone()),
            credentials,
            permissions: PermissionPolicy::new(),
            fonts: config.system_fonts.clone(),
            recheck_interval: config.recheck_interval(),
            runtime: handle,
        });

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        tracing::info!(
            database = %config.database_path.display(),
            scripts = services.scripts.len(),
            "Shell initialized"
        );

        let shell = Self {
            config,
            settings,
            exceptions,
            network,
            services,
            events: events_tx,
            commands: commands_tx,
            runtime,
        };
        let channels = ShellChannels {
            events: events_rx,
            commands: commands_rx,
        };

        Ok((shell, channels))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn exceptions(&self) -> &Exceptions {
        &self.exceptions
    }

    pub fn network(&self) -> &SharedNetworkMonitor {
        &self.network
    }

    pub fn downloads(&self) -> &DownloadManager {
        &self.services.downloads
    }

    pub fn art(&self) -> &ArtCache {
        &self.services.art
    }

    pub fn trusted_hosts(&self) -> Vec<String> {
        self.services.trust.read().trusted_hosts()
    }

    /// Wrap an engine view. Ephemeral views never save credentials and get
    /// no geolocation.
    pub fn create_view<E: Engine>(&self, engine: E, ephemeral: bool) -> ViewController<E> {
        ViewController::new(
            engine,
            Arc::clone(&self.services),
            ephemeral,
            self.events.clone(),
            self.commands.clone(),
        )
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineEvent, EventResponse, LoadEvent};
    use std::path::PathBuf;
    use wren_privacy::{Certificate, PermissionKind, PermissionState};
    use wren_storage::{keys, SettingsSource};
    use wren_view::EngineSetting;

    #[derive(Default)]
    struct CountingEngine {
        settings: Vec<&'static str>,
    }

    impl Engine for CountingEngine {
        fn load_uri(&mut self, _uri: &str) {}
        fn load_html(&mut self, _html: &str, _base_uri: Option<&str>) {}
        fn load_plain_text(&mut self, _text: &str) {}
        fn run_script(&mut self, _source: &str) {}

        fn set_setting(&mut self, setting: &EngineSetting) {
            self.settings.push(setting.name);
        }

        fn set_zoom_level(&mut self, _level: f64) {}
        fn allow_certificate(&mut self, _certificate: &Certificate, _host: &str) {}

        fn can_show_mime_type(&self, _mime_type: &str) -> bool {
            true
        }

        fn uri(&self) -> Option<String> {
            None
        }

        fn title(&self) -> Option<String> {
            None
        }

        fn document_source(&self) -> Option<String> {
            None
        }

        fn width(&self) -> u32 {
            1024
        }

        fn submit_form(&mut self, _form_id: u64) {}
        fn show_overlay(&mut self, _html: &str) {}
        fn hide_overlay(&mut self) {}
    }

    fn shell() -> (Shell, ShellChannels) {
        let config = Config::new(PathBuf::from("/nonexistent/wren"));
        let db = Database::open_in_memory().unwrap();
        Shell::with_database(config, db, Arc::new(NoCredentials)).unwrap()
    }

    #[test]
    fn test_with_database() {
        let (shell, _channels) = shell();

        assert!(shell.downloads().list().is_empty());
        assert!(shell.exceptions().list().is_empty());
        assert!(shell.trusted_hosts().is_empty());
        assert!(shell.settings().get_bool(keys::POPUP_BLOCK));
        assert_eq!(shell.config().recheck_interval_ms, 1000);
    }

    #[test]
    fn test_create_view_applies_profile() {
        let (shell, _channels) = shell();

        let view = shell.create_view(CountingEngine::default(), false);
        assert!(view.engine().settings.contains(&"enable-javascript"));
        assert!(view.engine().settings.contains(&"serif-font-family"));
        assert!(!view.state().is_ephemeral());

        let mut private = shell.create_view(CountingEngine::default(), true);
        assert_ne!(private.id(), view.id());
        assert_eq!(
            private.handle_event(EngineEvent::PermissionRequest(PermissionKind::Geolocation)),
            EventResponse::Permission(Some(PermissionState::Deny))
        );
    }

    #[test]
    fn test_events_reach_shell_channel() {
        let (shell, mut channels) = shell();
        let mut view = shell.create_view(CountingEngine::default(), false);

        view.load_uri("ftp://mirror.example/pub");

        match channels.events.try_recv() {
            Ok(ShellEvent::OpenExternal(uri)) => assert_eq!(uri, "ftp://mirror.example/pub"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_offline_recheck_without_ambient_runtime() {
        let mut config = Config::new(PathBuf::from("/nonexistent/wren"));
        config.recheck_interval_ms = 20;
        let db = Database::open_in_memory().unwrap();
        let (shell, mut channels) = Shell::with_database(config, db, Arc::new(NoCredentials)).unwrap();
        shell.network().set_available(false);

        let mut view = shell.create_view(CountingEngine::default(), false);
        view.handle_event(EngineEvent::LoadChanged(LoadEvent::Started));
        let response = view.handle_event(EngineEvent::LoadFailed {
            uri: "https://down.example/".to_string(),
            code: 2,
        });
        assert_eq!(response, EventResponse::Handled(true));
        assert!(view.is_waiting_for_network());

        shell.network().set_available(true);
        match channels.commands.blocking_recv() {
            Some(ViewCommand::Reload { uri, view_id }) => {
                assert_eq!(uri, "https://down.example/");
                assert_eq!(view_id, view.id());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
