//! Per-view load state
//!
//! `ViewState` holds what a view remembers between engine callbacks and
//! turns each load event into the effects the adapter must apply.

use uuid::Uuid;

use wren_navigation::{is_accept_uri, resolve_accept_uri};
use wren_privacy::{Certificate, ExceptionQuery, PermissionContext};
use wren_storage::{keys, SettingsSource};

use crate::context::ViewContext;
use crate::effect::{Effect, FailureOutcome};
use crate::error::ViewError;
use crate::state::LoadState;
use crate::tls::failure_reason;
use crate::Result;

/// Error pages are loaded as HTML without a base URI
pub const ERROR_PAGE_URI: &str = "about:blank";

/// Engine error codes that get a custom error page
pub const RECOGNIZED_ERROR_CODES: [i32; 3] = [2, 4, 44];

pub fn is_error_page(uri: &str) -> bool {
    uri == ERROR_PAGE_URI
}

/// Engine zoom factor for a host: stored percent (default 100) scaled by
/// the window zoom.
pub fn zoom_factor(settings: &dyn SettingsSource, host: &str, window_zoom: f64) -> f64 {
    let percent = settings.zoom_level(host).unwrap_or(100);
    f64::from(percent) * window_zoom / 100.0
}

#[derive(Debug)]
pub struct ViewState {
    id: String,
    /// Nothing persists from this view
    ephemeral: bool,
    load_state: LoadState,
    /// URI the user asked for, as opposed to the engine's current URI
    loaded_uri: String,
    title: String,
    readable_content: String,
    popup_exception: Option<String>,
    pending_certificate: Option<Certificate>,
    insecure_content: bool,
    /// Bumped on every Started
    generation: u64,
}

impl ViewState {
    pub fn new(ephemeral: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ephemeral,
            load_state: LoadState::Idle,
            loaded_uri: String::new(),
            title: String::new(),
            readable_content: String::new(),
            popup_exception: None,
            pending_certificate: None,
            insecure_content: false,
            generation: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn loaded_uri(&self) -> &str {
        &self.loaded_uri
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn readable_content(&self) -> &str {
        &self.readable_content
    }

    pub fn popup_exception(&self) -> Option<&str> {
        self.popup_exception.as_deref()
    }

    pub fn pending_certificate(&self) -> Option<&Certificate> {
        self.pending_certificate.as_ref()
    }

    pub fn has_insecure_content(&self) -> bool {
        self.insecure_content
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn permission_context(&self) -> PermissionContext {
        PermissionContext {
            ephemeral: self.ephemeral,
            insecure_content: self.insecure_content,
        }
    }

    fn transition_to(&mut self, new_state: LoadState) -> Result<()> {
        if !self.load_state.can_transition_to(new_state) {
            return Err(ViewError::InvalidTransition {
                from: self.load_state.to_string(),
                to: new_state.to_string(),
            });
        }

        tracing::debug!(
            view_id = %self.id,
            from = %self.load_state,
            to = %new_state,
            "Load state transition"
        );

        self.load_state = new_state;
        Ok(())
    }

    /// Record the URI the user asked for.
    pub fn set_loaded_uri(&mut self, uri: impl Into<String>) {
        self.loaded_uri = uri.into();
    }

    /// Allow one popup from `uri`; cleared by the next load.
    pub fn set_popup_exception(&mut self, uri: impl Into<String>) {
        self.popup_exception = Some(uri.into());
    }

    pub fn on_insecure_content(&mut self) {
        if !self.insecure_content {
            tracing::info!(view_id = %self.id, "Insecure content detected");
        }
        self.insecure_content = true;
    }

    /// The engine's URI changed: cached page data no longer applies.
    pub fn on_uri_changed(&mut self) {
        self.title.clear();
        self.readable_content.clear();
    }

    pub fn set_readable_content(&mut self, content: impl Into<String>) {
        self.readable_content = content.into();
    }

    pub fn on_title_changed(&mut self, title: &str) -> Vec<Effect> {
        if title.is_empty() || title == self.title {
            return Vec::new();
        }
        self.title = title.to_string();
        vec![Effect::TitleChanged(self.title.clone())]
    }

    pub fn on_load_started(&mut self, uri: &str) -> Result<Vec<Effect>> {
        self.transition_to(LoadState::Started)?;

        self.generation += 1;
        self.title.clear();
        self.readable_content.clear();
        self.popup_exception = None;

        // Error pages and the override request belong to the failed load
        if !is_error_page(uri) && !is_accept_uri(uri) {
            self.pending_certificate = None;
            self.insecure_content = false;
        }

        Ok(Vec::new())
    }

    pub fn on_load_committed(&mut self, uri: &str, ctx: &ViewContext<'_>) -> Result<Vec<Effect>> {
        self.transition_to(LoadState::Committed)?;

        let query = ExceptionQuery::from_uri(uri);
        let auto_load_images =
            !ctx.settings.get_bool(keys::IMAGE_BLOCK) || query.is_exempt(ctx.exceptions);

        Ok(vec![
            Effect::SetAutoLoadImages(auto_load_images),
            Effect::SetZoomLevel(zoom_factor(ctx.settings, &query.host, ctx.window_zoom)),
        ])
    }

    pub fn on_load_finished(
        &mut self,
        uri: &str,
        engine_title: Option<&str>,
        ctx: &ViewContext<'_>,
    ) -> Result<Vec<Effect>> {
        self.transition_to(LoadState::Finished)?;

        let mut effects = Vec::new();
        let query = ExceptionQuery::from_uri(uri);

        if ctx.settings.get_bool(keys::ADBLOCK) && !query.is_exempt(ctx.exceptions) {
            if let Some(script) = ctx.scripts.lookup(&query.host) {
                tracing::debug!(view_id = %self.id, script = %script.name, "Injecting ad-block script");
                effects.push(Effect::RunScript(script.clone()));
            }
        }

        if self.title.is_empty() {
            let title = engine_title
                .filter(|t| !t.is_empty())
                .unwrap_or(uri)
                .to_string();
            self.title = title.clone();
            effects.push(Effect::TitleChanged(title));
        }

        if !is_error_page(uri) {
            effects.push(Effect::CancelNetworkRecheck);
            effects.push(Effect::ExtractReadable);
        }

        Ok(effects)
    }

    pub fn on_load_failed(&mut self, uri: &str, code: i32, ctx: &ViewContext<'_>) -> Result<FailureOutcome> {
        self.transition_to(LoadState::Failed)?;

        if !RECOGNIZED_ERROR_CODES.contains(&code) {
            tracing::debug!(view_id = %self.id, uri = %uri, code, "Unhandled load failure");
            return Ok(FailureOutcome::PassThrough);
        }

        let network_available = ctx.network.is_available();
        tracing::info!(view_id = %self.id, uri = %uri, code, network_available, "Load failed");

        let mut effects = vec![Effect::LoadHtml {
            html: ctx.templates.load_failure(uri, network_available),
            base_uri: None,
        }];

        if network_available {
            effects.push(Effect::DeletePreviews(uri.to_string()));
        } else {
            effects.push(Effect::ScheduleNetworkRecheck(uri.to_string()));
        }

        Ok(FailureOutcome::Handled(effects))
    }

    /// The engine rejected the certificate of `uri`. `flags` are the raw
    /// validation failure bits.
    pub fn on_tls_failed(
        &mut self,
        uri: &str,
        certificate: Certificate,
        flags: u32,
        ctx: &ViewContext<'_>,
    ) -> Result<Vec<Effect>> {
        self.transition_to(LoadState::Failed)?;

        let reason = failure_reason(flags);
        tracing::warn!(
            view_id = %self.id,
            uri = %uri,
            flags,
            sha256 = %certificate.fingerprint(),
            "TLS failure"
        );

        self.pending_certificate = Some(certificate);

        Ok(vec![Effect::LoadHtml {
            html: ctx.templates.tls_interstitial(uri, reason),
            base_uri: None,
        }])
    }

    /// The user accepted the risk on an interstitial: `uri` is the
    /// `accept://` form of the rejected URI.
    pub fn on_accept_request(&mut self, uri: &str) -> Result<Vec<Effect>> {
        if self.pending_certificate.is_none() {
            tracing::debug!(view_id = %self.id, uri = %uri, "No pending certificate, ignoring accept request");
            return Ok(Vec::new());
        }

        let (host, https_uri) = resolve_accept_uri(uri)?;
        let Some(certificate) = self.pending_certificate.take() else {
            return Ok(Vec::new());
        };

        Ok(vec![
            Effect::TrustCertificate { certificate, host },
            Effect::LoadUri(https_uri),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NetworkMonitor;
    use crate::error_page::ErrorPageTemplates;
    use std::collections::{HashMap, HashSet};
    use wren_privacy::{ExceptionRegistry, ScriptCatalog};

    #[derive(Default)]
    struct FakeSettings {
        values: HashMap<&'static str, bool>,
        zoom: HashMap<&'static str, u32>,
    }

    impl SettingsSource for FakeSettings {
        fn get_bool(&self, key: &str) -> bool {
            self.values.get(key).copied().unwrap_or(false)
        }

        fn get_int(&self, _key: &str) -> i64 {
            0
        }

        fn get_string(&self, _key: &str) -> String {
            String::new()
        }

        fn zoom_level(&self, host: &str) -> Option<u32> {
            self.zoom.get(host).copied()
        }
    }

    #[derive(Default)]
    struct FakeExceptions(HashSet<&'static str>);

    impl ExceptionRegistry for FakeExceptions {
        fn is_exception(&self, value: &str) -> bool {
            self.0.contains(value)
        }
    }

    struct FakeNetwork(bool);

    impl NetworkMonitor for FakeNetwork {
        fn is_available(&self) -> bool {
            self.0
        }
    }

    struct Fixture {
        settings: FakeSettings,
        exceptions: FakeExceptions,
        scripts: ScriptCatalog,
        network: FakeNetwork,
        templates: ErrorPageTemplates,
        window_zoom: f64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                settings: FakeSettings::default(),
                exceptions: FakeExceptions::default(),
                scripts: ScriptCatalog::new(),
                network: FakeNetwork(true),
                templates: ErrorPageTemplates::builtin(),
                window_zoom: 1.0,
            }
        }

        fn ctx(&self) -> ViewContext<'_> {
            ViewContext {
                settings: &self.settings,
                exceptions: &self.exceptions,
                scripts: &self.scripts,
                network: &self.network,
                templates: &self.templates,
                window_zoom: self.window_zoom,
            }
        }
    }

    fn committed(view: &mut ViewState, uri: &str, fx: &Fixture) {
        view.on_load_started(uri).unwrap();
        view.on_load_committed(uri, &fx.ctx()).unwrap();
    }

    fn html_of(effects: &[Effect]) -> &str {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::LoadHtml { html, .. } => Some(html.as_str()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_started_resets_page_data() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);

        committed(&mut view, "https://a.example/", &fx);
        view.on_title_changed("A");
        view.set_readable_content("text");
        view.set_popup_exception("https://a.example/popup");
        assert_eq!(view.generation(), 1);

        view.on_load_started("https://b.example/").unwrap();
        assert_eq!(view.load_state(), LoadState::Started);
        assert!(view.title().is_empty());
        assert!(view.readable_content().is_empty());
        assert!(view.popup_exception().is_none());
        assert_eq!(view.generation(), 2);

        // A new navigation may supersede one still in flight
        view.on_load_started("https://c.example/").unwrap();
        assert_eq!(view.generation(), 3);
    }

    #[test]
    fn test_invalid_transitions_change_nothing() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);

        assert!(matches!(
            view.on_load_finished("https://a.example/", None, &fx.ctx()),
            Err(ViewError::InvalidTransition { .. })
        ));
        assert_eq!(view.load_state(), LoadState::Idle);

        committed(&mut view, "https://a.example/", &fx);
        view.on_load_failed("https://a.example/", 2, &fx.ctx()).unwrap();

        // Engines report "finished" after "failed"
        assert!(view.on_load_finished("https://a.example/", None, &fx.ctx()).is_err());
        assert!(view.on_load_failed("https://a.example/", 2, &fx.ctx()).is_err());
        assert_eq!(view.load_state(), LoadState::Failed);
    }

    #[test]
    fn test_committed_images_and_zoom() {
        let mut fx = Fixture::new();
        fx.settings.values.insert(keys::IMAGE_BLOCK, true);
        fx.settings.zoom.insert("zoomed.example", 150);
        fx.exceptions.0.insert("pictures.example/gallery");
        fx.window_zoom = 1.2;
        let mut view = ViewState::new(false);

        view.on_load_started("https://zoomed.example/").unwrap();
        let effects = view.on_load_committed("https://zoomed.example/", &fx.ctx()).unwrap();
        assert_eq!(effects[0], Effect::SetAutoLoadImages(false));
        match effects[1] {
            Effect::SetZoomLevel(level) => assert!((level - 1.8).abs() < 1e-9),
            ref other => panic!("unexpected effect {:?}", other),
        }

        view.on_load_started("https://pictures.example/gallery").unwrap();
        let effects = view
            .on_load_committed("https://pictures.example/gallery", &fx.ctx())
            .unwrap();
        assert_eq!(effects[0], Effect::SetAutoLoadImages(true));
        match effects[1] {
            Effect::SetZoomLevel(level) => assert!((level - 1.2).abs() < 1e-9),
            ref other => panic!("unexpected effect {:?}", other),
        }

        fx.settings.values.insert(keys::IMAGE_BLOCK, false);
        view.on_load_started("https://zoomed.example/").unwrap();
        let effects = view.on_load_committed("https://zoomed.example/", &fx.ctx()).unwrap();
        assert_eq!(effects[0], Effect::SetAutoLoadImages(true));
    }

    #[test]
    fn test_finished_runs_one_adblock_script() {
        let mut fx = Fixture::new();
        fx.settings.values.insert(keys::ADBLOCK, true);
        fx.scripts.insert("www.example", "stripped()".to_string());
        let mut view = ViewState::new(false);

        committed(&mut view, "https://www.example.com/", &fx);
        let effects = view
            .on_load_finished("https://www.example.com/", Some("Example"), &fx.ctx())
            .unwrap();

        let scripts: Vec<_> = effects
            .iter()
            .filter(|e| matches!(e, Effect::RunScript(_)))
            .collect();
        assert_eq!(scripts.len(), 1);
        assert!(effects.contains(&Effect::TitleChanged("Example".to_string())));
        assert!(effects.contains(&Effect::CancelNetworkRecheck));
        assert!(effects.contains(&Effect::ExtractReadable));
    }

    #[test]
    fn test_finished_skips_scripts_for_exceptions() {
        let mut fx = Fixture::new();
        fx.settings.values.insert(keys::ADBLOCK, true);
        fx.scripts.insert("www.example.com", "exact()".to_string());
        fx.exceptions.0.insert("www.example.com");
        let mut view = ViewState::new(false);

        committed(&mut view, "https://www.example.com/", &fx);
        let effects = view
            .on_load_finished("https://www.example.com/", None, &fx.ctx())
            .unwrap();
        assert!(!effects.iter().any(|e| matches!(e, Effect::RunScript(_))));

        // Adblock disabled: nothing injected either
        fx.exceptions.0.clear();
        fx.settings.values.insert(keys::ADBLOCK, false);
        committed(&mut view, "https://www.example.com/", &fx);
        let effects = view
            .on_load_finished("https://www.example.com/", None, &fx.ctx())
            .unwrap();
        assert!(!effects.iter().any(|e| matches!(e, Effect::RunScript(_))));
    }

    #[test]
    fn test_finished_title_fallback() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);

        committed(&mut view, "https://untitled.example/", &fx);
        let effects = view
            .on_load_finished("https://untitled.example/", Some(""), &fx.ctx())
            .unwrap();
        assert!(effects.contains(&Effect::TitleChanged("https://untitled.example/".to_string())));
        assert_eq!(view.title(), "https://untitled.example/");

        // A title already observed is kept
        committed(&mut view, "https://titled.example/", &fx);
        assert_eq!(
            view.on_title_changed("Titled"),
            vec![Effect::TitleChanged("Titled".to_string())]
        );
        assert!(view.on_title_changed("Titled").is_empty());
        assert!(view.on_title_changed("").is_empty());
        let effects = view
            .on_load_finished("https://titled.example/", Some("Other"), &fx.ctx())
            .unwrap();
        assert!(!effects.iter().any(|e| matches!(e, Effect::TitleChanged(_))));
    }

    #[test]
    fn test_failure_with_network_shows_retry_page() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);
        let uri = "https://down.example/";

        committed(&mut view, uri, &fx);
        let outcome = view.on_load_failed(uri, 2, &fx.ctx()).unwrap();

        assert!(outcome.is_handled());
        let effects = outcome.effects();
        let html = html_of(effects);
        assert!(html.contains("Failed to load this web page"));
        assert!(html.contains("Retry"));
        assert!(!html.contains("display: none"));
        assert!(effects.contains(&Effect::DeletePreviews(uri.to_string())));
        assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleNetworkRecheck(_))));
    }

    #[test]
    fn test_failure_without_network_schedules_recheck() {
        let mut fx = Fixture::new();
        fx.network = FakeNetwork(false);
        let mut view = ViewState::new(false);
        let uri = "https://down.example/";

        view.on_load_started(uri).unwrap();
        let outcome = view.on_load_failed(uri, 44, &fx.ctx()).unwrap();

        let effects = outcome.effects();
        assert!(html_of(effects).contains("Network not available"));
        assert!(html_of(effects).contains("display: none"));
        let rechecks: Vec<_> = effects
            .iter()
            .filter(|e| matches!(e, Effect::ScheduleNetworkRecheck(_)))
            .collect();
        assert_eq!(rechecks, vec![&Effect::ScheduleNetworkRecheck(uri.to_string())]);
        assert!(!effects.iter().any(|e| matches!(e, Effect::DeletePreviews(_))));
    }

    #[test]
    fn test_unrecognized_failure_passes_through() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);

        view.on_load_started("https://a.example/").unwrap();
        let outcome = view.on_load_failed("https://a.example/", 302, &fx.ctx()).unwrap();
        assert_eq!(outcome, FailureOutcome::PassThrough);
        assert_eq!(view.load_state(), LoadState::Failed);
    }

    #[test]
    fn test_error_page_finish_keeps_recheck() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);

        committed(&mut view, ERROR_PAGE_URI, &fx);
        let effects = view.on_load_finished(ERROR_PAGE_URI, None, &fx.ctx()).unwrap();
        assert!(!effects.contains(&Effect::CancelNetworkRecheck));
        assert!(!effects.contains(&Effect::ExtractReadable));
    }

    #[test]
    fn test_tls_failure_and_override() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);
        let uri = "https://self-signed.example/login";
        let certificate = Certificate::from_der(vec![0x30, 0x82, 0x01]);

        view.on_load_started(uri).unwrap();
        let effects = view.on_tls_failed(uri, certificate.clone(), 8, &fx.ctx()).unwrap();
        let html = html_of(&effects);
        assert!(html.contains("The certificate has expired"));
        assert!(html.contains("accept://self-signed.example/login"));
        assert_eq!(view.pending_certificate(), Some(&certificate));

        // The interstitial itself and the accept request keep the certificate
        view.on_load_started(ERROR_PAGE_URI).unwrap();
        view.on_load_started("accept://self-signed.example/login").unwrap();
        assert!(view.pending_certificate().is_some());

        let effects = view.on_accept_request("accept://self-signed.example/login").unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::TrustCertificate {
                    certificate,
                    host: "self-signed.example".to_string(),
                },
                Effect::LoadUri(uri.to_string()),
            ]
        );
        assert!(view.pending_certificate().is_none());

        // Nothing pending: ignored
        assert!(view.on_accept_request("accept://self-signed.example/login").unwrap().is_empty());
    }

    #[test]
    fn test_unrelated_navigation_clears_certificate() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);
        let certificate = Certificate::from_der(vec![1]);

        view.on_load_started("https://bad.example/").unwrap();
        view.on_tls_failed("https://bad.example/", certificate, 1, &fx.ctx()).unwrap();
        view.on_insecure_content();

        view.on_load_started("https://elsewhere.example/").unwrap();
        assert!(view.pending_certificate().is_none());
        assert!(!view.has_insecure_content());
    }

    #[test]
    fn test_second_tls_failure_overwrites_certificate() {
        let fx = Fixture::new();
        let mut view = ViewState::new(false);

        view.on_load_started("https://bad.example/").unwrap();
        view.on_tls_failed("https://bad.example/", Certificate::from_der(vec![1]), 1, &fx.ctx()).unwrap();
        view.on_load_started("https://bad.example/").unwrap();
        view.on_tls_failed("https://bad.example/", Certificate::from_der(vec![2]), 1, &fx.ctx()).unwrap();

        assert_eq!(view.pending_certificate(), Some(&Certificate::from_der(vec![2])));
    }

    #[test]
    fn test_permission_context() {
        let mut view = ViewState::new(true);
        view.on_insecure_content();

        let ctx = view.permission_context();
        assert!(ctx.ephemeral);
        assert!(ctx.insecure_content);
    }
}
