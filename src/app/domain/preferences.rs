use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::infrastructure::platform::AmbientTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::System => "System",
        }
    }

    pub fn all() -> &'static [ThemeMode] {
        &[Self::Light, Self::Dark, Self::System]
    }
}

/// Concrete rendering mode after `System` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveTheme {
    Light,
    Dark,
}

impl EffectiveTheme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Resolve `System` against the host signal. The ambient signal is read on
/// every call since it can change while the app is running.
pub fn resolve_effective_theme(theme: ThemeMode, ambient: &dyn AmbientTheme) -> EffectiveTheme {
    match theme {
        ThemeMode::Light => EffectiveTheme::Light,
        ThemeMode::Dark => EffectiveTheme::Dark,
        ThemeMode::System => {
            if ambient.prefers_dark() {
                EffectiveTheme::Dark
            } else {
                EffectiveTheme::Light
            }
        }
    }
}

/// Persisted guide preferences: `{ "lang"?: string, "theme": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "lang", default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,

    #[serde(default)]
    pub theme: ThemeMode,
}

impl Preferences {
    /// Decode a stored blob leniently: unknown or missing fields fall back to
    /// defaults, only a blob that is not a JSON object is an error.
    pub fn from_stored(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        let Some(obj) = value.as_object() else {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "preferences must be a JSON object",
            ));
        };

        let language_id = obj
            .get("lang")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let theme = obj
            .get("theme")
            .and_then(Value::as_str)
            .and_then(ThemeMode::parse)
            .unwrap_or_default();

        Ok(Self { language_id, theme })
    }

    /// Merge an update in, last write wins per field.
    pub fn apply(&mut self, update: PreferenceUpdate) {
        if let Some(language_id) = update.language_id {
            self.language_id = Some(language_id);
        }
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
    }
}

/// Partial preferences for [`crate::app::services::preference_store::PreferenceStore::save`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreferenceUpdate {
    pub language_id: Option<String>,
    pub theme: Option<ThemeMode>,
}

impl PreferenceUpdate {
    pub fn language(id: impl Into<String>) -> Self {
        Self {
            language_id: Some(id.into()),
            theme: None,
        }
    }

    pub fn theme(theme: ThemeMode) -> Self {
        Self {
            language_id: None,
            theme: Some(theme),
        }
    }
}
