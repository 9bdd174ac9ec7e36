//! View controller
//!
//! Owns one engine view and its `ViewState`. Engine events are turned into
//! state-machine calls, the resulting effects are applied back onto the
//! engine, and anything the rest of the shell cares about goes out as a
//! `ShellEvent`.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use wren_download::DownloadHandle;
use wren_navigation::{
    decide, BlockDecision, LoadTarget, MouseButton, NavigationRequest, NavigationType, PolicyEngine,
};
use wren_privacy::{netloc, ExceptionQuery, PermissionKind, PermissionState};
use wren_storage::keys;
use wren_view::{
    document_font_size, engine_profile, font_settings, zoom_factor, Effect, EngineSetting,
    FailureOutcome, InputSource, ScrollTracker, SettingValue, ViewError, ViewState,
};

use crate::engine::{Engine, EngineEvent, EventResponse, LoadEvent, PolicyResponse};
use crate::events::{ShellEvent, ViewCommand};
use crate::forms::{spawn_lookup, Credentials, FormSubmission};
use crate::reader::{extract_readable, ReaderChange, ReaderOverlay};
use crate::recheck::NetworkRecheck;
use crate::services::ViewServices;

const DEFAULT_DOCUMENT_FONT_SIZE: f64 = 11.0;

pub struct ViewController<E: Engine> {
    engine: E,
    state: ViewState,
    services: Arc<ViewServices>,
    /// Zoom of the hosting window, 1.0 = 100%
    window_zoom: f64,
    scroll: ScrollTracker,
    recheck: NetworkRecheck,
    reader: ReaderOverlay,
    events: UnboundedSender<ShellEvent>,
    commands: UnboundedSender<ViewCommand>,
}

impl<E: Engine> ViewController<E> {
    pub fn new(
        mut engine: E,
        services: Arc<ViewServices>,
        ephemeral: bool,
        events: UnboundedSender<ShellEvent>,
        commands: UnboundedSender<ViewCommand>,
    ) -> Self {
        for setting in engine_profile(services.settings.as_ref(), &services.fonts) {
            engine.set_setting(&setting);
        }

        let state = ViewState::new(ephemeral);
        tracing::debug!(view_id = %state.id(), ephemeral, "Created view");

        Self {
            engine,
            state,
            services,
            window_zoom: 1.0,
            scroll: ScrollTracker::new(),
            recheck: NetworkRecheck::new(),
            reader: ReaderOverlay::new(),
            events,
            commands,
        }
    }

    pub fn id(&self) -> &str {
        self.state.id()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_reading(&self) -> bool {
        self.reader.is_active()
    }

    pub fn is_waiting_for_network(&self) -> bool {
        self.recheck.is_pending()
    }

    /// Load what the user typed or clicked.
    pub fn load_uri(&mut self, uri: &str) {
        match LoadTarget::resolve(uri) {
            LoadTarget::Blank => {
                self.state.set_loaded_uri("about:blank");
                self.engine.load_plain_text("");
            }
            LoadTarget::External(uri) => {
                tracing::info!(view_id = %self.id(), uri = %uri, "Opening with external program");
                self.emit(ShellEvent::OpenExternal(uri));
            }
            LoadTarget::Script(code) => self.engine.run_script(&code),
            LoadTarget::Web(uri) => {
                self.state.set_loaded_uri(uri.as_str());
                self.engine.load_uri(&uri);
            }
        }
    }

    /// Allow one popup from `uri`, typically after the user saw it blocked.
    pub fn set_popup_exception(&mut self, uri: &str) {
        self.state.set_popup_exception(uri);
    }

    pub fn set_window_zoom(&mut self, window_zoom: f64) {
        self.window_zoom = window_zoom;
        self.update_zoom_level();
    }

    /// Reapply the stored zoom level of the current host.
    pub fn update_zoom_level(&mut self) {
        let host = self
            .engine
            .uri()
            .map(|uri| ExceptionQuery::from_uri(&uri).host)
            .unwrap_or_default();
        let level = zoom_factor(self.services.settings.as_ref(), &host, self.window_zoom);
        self.engine.set_zoom_level(level);
    }

    /// A preference changed while the view is alive.
    pub fn on_setting_changed(&mut self, key: &str) {
        let settings = Arc::clone(&self.services.settings);

        let updates = match key {
            keys::USE_SYSTEM_FONTS | keys::FONT_MONOSPACE | keys::FONT_SANS_SERIF | keys::FONT_SERIF => {
                font_settings(settings.as_ref(), &self.services.fonts)
            }
            keys::ENABLE_PLUGINS => {
                let enabled = settings.get_bool(key);
                vec![
                    EngineSetting { name: "enable-java", value: SettingValue::Bool(enabled) },
                    EngineSetting { name: "enable-plugins", value: SettingValue::Bool(enabled) },
                ]
            }
            keys::DEVELOPER_EXTRAS => vec![EngineSetting {
                name: "enable-developer-extras",
                value: SettingValue::Bool(settings.get_bool(key)),
            }],
            keys::MIN_FONT_SIZE => vec![EngineSetting {
                name: "minimum-font-size",
                value: SettingValue::Int(settings.get_int(key)),
            }],
            keys::ZOOM_LEVELS => {
                self.update_zoom_level();
                Vec::new()
            }
            _ => Vec::new(),
        };

        for setting in updates {
            self.engine.set_setting(&setting);
        }
    }

    /// Enter or leave reading mode. Returns `true` when the overlay is shown.
    pub fn toggle_reader(&mut self) -> bool {
        let font_size = document_font_size(&self.services.fonts.document).unwrap_or(DEFAULT_DOCUMENT_FONT_SIZE);
        let width = self.engine.width();

        match self.reader.toggle(self.state.title(), self.state.readable_content(), font_size, width) {
            ReaderChange::Show(html) => {
                self.engine.show_overlay(&html);
                true
            }
            ReaderChange::Hide => {
                self.engine.hide_overlay();
                false
            }
            ReaderChange::Unavailable => false,
        }
    }

    pub fn handle_event(&mut self, event: EngineEvent) -> EventResponse {
        match event {
            EngineEvent::NavigationPolicy {
                uri,
                mouse_button,
                navigation_type,
                new_window,
            } => EventResponse::Policy(self.decide_navigation(uri, mouse_button, navigation_type, new_window)),
            EngineEvent::ResponsePolicy { uri, mime_type } => {
                let renderable = self.engine.can_show_mime_type(&mime_type);
                let request = NavigationRequest::response(uri, mime_type, renderable);
                EventResponse::Policy(to_policy_response(&decide(&request, false, false)))
            }
            EngineEvent::LoadChanged(load_event) => {
                self.on_load_changed(load_event);
                EventResponse::None
            }
            EngineEvent::LoadFailed { uri, code } => EventResponse::Handled(self.on_load_failed(&uri, code)),
            EngineEvent::TlsFailed {
                uri,
                certificate,
                flags,
            } => {
                let services = Arc::clone(&self.services);
                let result = self
                    .state
                    .on_tls_failed(&uri, certificate, flags, &services.context(self.window_zoom));
                let handled = result.is_ok();
                self.apply_result(result);
                EventResponse::Handled(handled)
            }
            EngineEvent::UriChanged(_) => {
                self.state.on_uri_changed();
                EventResponse::None
            }
            EngineEvent::TitleChanged(title) => {
                let effects = self.state.on_title_changed(&title);
                self.apply(effects);
                EventResponse::None
            }
            EngineEvent::AcceptRequest(uri) => {
                let result = self.state.on_accept_request(&uri);
                self.apply_result(result);
                EventResponse::None
            }
            EngineEvent::InsecureContent => {
                self.state.on_insecure_content();
                EventResponse::None
            }
            EngineEvent::DownloadStarted {
                uri,
                suggested_file_name,
                mime_type,
            } => {
                self.on_download_started(DownloadHandle {
                    uri,
                    suggested_file_name,
                    mime_type,
                });
                EventResponse::None
            }
            EngineEvent::FormSubmitted(form) => {
                self.on_form_submitted(form);
                EventResponse::None
            }
            EngineEvent::PermissionRequest(kind) => EventResponse::Permission(self.decide_permission(kind)),
            EngineEvent::Scroll(source) => EventResponse::ScrollScale(self.on_scroll(source)),
            EngineEvent::WebProcessCrashed => {
                tracing::error!(view_id = %self.id(), uri = ?self.engine.uri(), "Web process crashed");
                self.emit(ShellEvent::Crashed {
                    view_id: self.id().to_string(),
                });
                EventResponse::None
            }
        }
    }

    /// Apply a command produced by background work for this view.
    pub fn handle_command(&mut self, command: ViewCommand) {
        if command.view_id() != self.id() {
            tracing::warn!(view_id = %self.id(), target = %command.view_id(), "Command for another view");
            return;
        }

        match command {
            ViewCommand::Reload { uri, .. } => self.load_uri(&uri),
            ViewCommand::FormChecked {
                generation,
                form,
                credentials,
                ..
            } => self.on_form_checked(generation, form, credentials),
        }
    }

    fn decide_navigation(
        &mut self,
        uri: String,
        mouse_button: MouseButton,
        navigation_type: NavigationType,
        new_window: bool,
    ) -> PolicyResponse {
        let request = if new_window {
            NavigationRequest::new_window(uri, mouse_button, navigation_type)
        } else {
            NavigationRequest::navigation(uri, mouse_button, navigation_type)
        };

        let popup_block = self.services.settings.get_bool(keys::POPUP_BLOCK);
        let decision = if request.is_new_window() && self.state.popup_exception() == Some(request.uri.as_str()) {
            decide(&request, popup_block, true)
        } else {
            PolicyEngine::new(self.services.exceptions.as_ref(), popup_block).evaluate(&request)
        };

        if mouse_button == MouseButton::Primary {
            self.state.set_loaded_uri(request.uri.as_str());
        }

        match &decision {
            BlockDecision::IgnoreAndSpawn { uri, is_popup } => {
                self.emit(ShellEvent::NewPage {
                    view_id: self.id().to_string(),
                    uri: uri.clone(),
                    popup: *is_popup,
                });
            }
            BlockDecision::Use if request.is_new_window() && mouse_button == MouseButton::None => {
                self.emit(ShellEvent::PopupBlocked {
                    view_id: self.id().to_string(),
                    uri: request.uri.clone(),
                });
            }
            _ => {}
        }

        to_policy_response(&decision)
    }

    fn on_load_changed(&mut self, load_event: LoadEvent) {
        let uri = self.engine.uri().unwrap_or_default();
        let services = Arc::clone(&self.services);
        let ctx = services.context(self.window_zoom);

        if load_event == LoadEvent::Started && self.reader.hide() {
            self.engine.hide_overlay();
        }

        let result = match load_event {
            LoadEvent::Started => self.state.on_load_started(&uri),
            LoadEvent::Committed => self.state.on_load_committed(&uri, &ctx),
            LoadEvent::Finished => {
                let title = self.engine.title();
                self.state.on_load_finished(&uri, title.as_deref(), &ctx)
            }
        };

        self.apply_result(result);
    }

    fn on_load_failed(&mut self, uri: &str, code: i32) -> bool {
        let services = Arc::clone(&self.services);
        match self.state.on_load_failed(uri, code, &services.context(self.window_zoom)) {
            Ok(FailureOutcome::Handled(effects)) => {
                self.apply(effects);
                true
            }
            Ok(FailureOutcome::PassThrough) => false,
            Err(e) => {
                self.log_ignored(e);
                false
            }
        }
    }

    fn on_download_started(&mut self, handle: DownloadHandle) {
        match self.services.downloads.add(handle) {
            Ok(download) => self.emit(ShellEvent::DownloadStarted(download)),
            Err(e) => tracing::warn!(view_id = %self.id(), error = %e, "Failed to record download"),
        }
    }

    fn on_form_submitted(&mut self, form: FormSubmission) {
        if self.state.is_ephemeral() {
            self.engine.submit_form(form.form_id);
            return;
        }

        spawn_lookup(
            &self.services.runtime,
            Arc::clone(&self.services.credentials),
            self.id().to_string(),
            self.state.generation(),
            form,
            self.commands.clone(),
        );
    }

    fn on_form_checked(&mut self, generation: u64, form: FormSubmission, credentials: Option<Credentials>) {
        if generation != self.state.generation() {
            tracing::debug!(view_id = %self.id(), form_id = form.form_id, "Dropping stale credential lookup");
            return;
        }

        if let Some(credentials) = credentials {
            let host = Url::parse(&form.uri).map(|u| netloc(&u)).unwrap_or_default();
            self.emit(ShellEvent::SavePassword {
                username: credentials.username,
                password: credentials.password,
                host,
            });
        }

        self.engine.submit_form(form.form_id);
    }

    fn decide_permission(&self, kind: PermissionKind) -> Option<PermissionState> {
        let answer = self
            .services
            .permissions
            .decide(kind, self.state.permission_context());
        tracing::debug!(view_id = %self.id(), kind = ?kind, answer = ?answer, "Permission request");
        answer
    }

    fn on_scroll(&mut self, source: InputSource) -> f64 {
        let adjustment = self.scroll.on_scroll(source);
        if let Some(smooth) = adjustment.smooth_scrolling {
            self.engine.set_setting(&EngineSetting {
                name: "enable-smooth-scrolling",
                value: SettingValue::Bool(smooth),
            });
        }
        adjustment.delta_scale
    }

    fn apply_result(&mut self, result: wren_view::Result<Vec<Effect>>) {
        match result {
            Ok(effects) => self.apply(effects),
            Err(e) => self.log_ignored(e),
        }
    }

    fn log_ignored(&self, error: ViewError) {
        tracing::debug!(view_id = %self.id(), error = %error, "Ignoring engine event");
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetAutoLoadImages(enabled) => self.engine.set_setting(&EngineSetting {
                    name: "auto-load-images",
                    value: SettingValue::Bool(enabled),
                }),
                Effect::SetZoomLevel(level) => self.engine.set_zoom_level(level),
                Effect::RunScript(script) => self.engine.run_script(&script.source),
                Effect::TitleChanged(title) => self.emit(ShellEvent::TitleChanged {
                    view_id: self.id().to_string(),
                    title,
                }),
                Effect::LoadHtml { html, base_uri } => self.engine.load_html(&html, base_uri.as_deref()),
                Effect::DeletePreviews(uri) => {
                    if let Err(e) = self.services.art.delete_previews(&uri) {
                        tracing::warn!(uri = %uri, error = %e, "Failed to delete cached previews");
                    }
                }
                Effect::ScheduleNetworkRecheck(uri) => self.recheck.schedule(
                    &self.services.runtime,
                    self.state.id().to_string(),
                    uri,
                    self.services.recheck_interval,
                    Arc::clone(&self.services.network),
                    self.commands.clone(),
                ),
                Effect::CancelNetworkRecheck => self.recheck.cancel(),
                Effect::TrustCertificate { certificate, host } => {
                    self.services.trust.write().allow(&certificate, &host);
                    self.engine.allow_certificate(&certificate, &host);
                }
                Effect::LoadUri(uri) => self.load_uri(&uri),
                Effect::ExtractReadable => self.extract_readable(),
            }
        }
    }

    fn extract_readable(&mut self) {
        let Some(source) = self.engine.document_source() else {
            return;
        };

        if let Some(readable) = extract_readable(&source) {
            self.state.set_readable_content(readable.content_html);
            self.emit(ShellEvent::Readable {
                view_id: self.id().to_string(),
            });
        }
    }

    fn emit(&self, event: ShellEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(view_id = %self.id(), "Shell event receiver closed");
        }
    }
}

fn to_policy_response(decision: &BlockDecision) -> PolicyResponse {
    match decision {
        BlockDecision::Use => PolicyResponse::Use,
        BlockDecision::Download => PolicyResponse::Download,
        BlockDecision::IgnoreAndSpawn { .. } => PolicyResponse::Ignore,
    }
}
