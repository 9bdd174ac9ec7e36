//! Engine settings profile
//!
//! Turns shell preferences into the engine's own setting names. Fixed
//! values are applied to every view; the rest follow the settings source.

use serde::{Deserialize, Serialize};

use wren_storage::{keys, SettingsSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSetting {
    pub name: &'static str,
    pub value: SettingValue,
}

impl EngineSetting {
    fn new(name: &'static str, value: SettingValue) -> Self {
        Self { name, value }
    }
}

/// Desktop font names, e.g. `Cantarell 11`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFonts {
    pub document: String,
    pub monospace: String,
    pub interface: String,
}

impl Default for SystemFonts {
    fn default() -> Self {
        Self {
            document: "Sans 11".to_string(),
            monospace: "Monospace 11".to_string(),
            interface: "Sans 11".to_string(),
        }
    }
}

/// Family part of a font name: `DejaVu Sans Mono 10` -> `DejaVu Sans Mono`
pub fn font_family(name: &str) -> &str {
    let name = name.trim();
    match name.rsplit_once(' ') {
        Some((family, size)) if size.parse::<f64>().is_ok() => family.trim_end(),
        _ => name,
    }
}

/// Size part of a font name in points, if present
pub fn document_font_size(name: &str) -> Option<f64> {
    name.trim()
        .rsplit_once(' ')
        .and_then(|(_, size)| size.parse::<f64>().ok())
}

/// Font families, either from the desktop or from the font preferences.
pub fn font_settings(settings: &dyn SettingsSource, fonts: &SystemFonts) -> Vec<EngineSetting> {
    let (monospace, sans, serif) = if settings.get_bool(keys::USE_SYSTEM_FONTS) {
        (
            font_family(&fonts.monospace).to_string(),
            font_family(&fonts.document).to_string(),
            font_family(&fonts.interface).to_string(),
        )
    } else {
        (
            settings.get_string(keys::FONT_MONOSPACE),
            settings.get_string(keys::FONT_SANS_SERIF),
            settings.get_string(keys::FONT_SERIF),
        )
    };

    vec![
        EngineSetting::new("monospace-font-family", SettingValue::Str(monospace)),
        EngineSetting::new("sans-serif-font-family", SettingValue::Str(sans)),
        EngineSetting::new("serif-font-family", SettingValue::Str(serif)),
    ]
}

/// Full settings profile applied when a view is created.
pub fn engine_profile(settings: &dyn SettingsSource, fonts: &SystemFonts) -> Vec<EngineSetting> {
    use SettingValue::{Bool, Int};

    let plugins = settings.get_bool(keys::ENABLE_PLUGINS);

    let mut profile = vec![
        EngineSetting::new("enable-java", Bool(plugins)),
        EngineSetting::new("enable-plugins", Bool(plugins)),
        EngineSetting::new("minimum-font-size", Int(settings.get_int(keys::MIN_FONT_SIZE))),
    ];
    profile.extend(font_settings(settings, fonts));
    profile.extend([
        EngineSetting::new("auto-load-images", Bool(true)),
        EngineSetting::new("allow-universal-access-from-file-urls", Bool(false)),
        EngineSetting::new("allow-file-access-from-file-urls", Bool(false)),
        EngineSetting::new("enable-javascript", Bool(true)),
        EngineSetting::new("enable-media-stream", Bool(true)),
        EngineSetting::new("enable-mediasource", Bool(true)),
        EngineSetting::new(
            "enable-developer-extras",
            Bool(settings.get_bool(keys::DEVELOPER_EXTRAS)),
        ),
        EngineSetting::new("enable-offline-web-application-cache", Bool(true)),
        EngineSetting::new("enable-page-cache", Bool(true)),
        EngineSetting::new("enable-resizable-text-areas", Bool(true)),
        EngineSetting::new("enable-smooth-scrolling", Bool(false)),
        EngineSetting::new("enable-webaudio", Bool(true)),
        EngineSetting::new("enable-webgl", Bool(true)),
        EngineSetting::new("javascript-can-access-clipboard", Bool(true)),
        EngineSetting::new("javascript-can-open-windows-automatically", Bool(true)),
        EngineSetting::new("media-playback-allows-inline", Bool(true)),
    ]);

    profile
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    Mouse,
    Touchpad,
    Touchscreen,
    Pen,
    Other,
}

/// What to do with one scroll event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAdjustment {
    pub delta_scale: f64,
    /// New `enable-smooth-scrolling` value when the device class changed
    pub smooth_scrolling: Option<bool>,
}

/// Tracks the device class of the last scroll event.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    source: InputSource,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self {
            source: InputSource::Mouse,
        }
    }
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> InputSource {
        self.source
    }

    pub fn on_scroll(&mut self, source: InputSource) -> ScrollAdjustment {
        let delta_scale = if source == InputSource::Mouse { 2.0 } else { 1.0 };

        let smooth_scrolling = if source != self.source {
            self.source = source;
            Some(source != InputSource::Mouse)
        } else {
            None
        };

        ScrollAdjustment {
            delta_scale,
            smooth_scrolling,
        }
    }
}
