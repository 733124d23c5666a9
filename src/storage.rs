/// Settings persisted in the browser's synced storage

use futures::lock::Mutex;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::host::{HostError, TabHost};

/// The single storage key holding the whole settings blob.
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Root settings structure. Missing fields take their defaults, so an older
/// or partial blob still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub vertical_tabs_enabled: bool,
    pub window_management_enabled: bool,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            vertical_tabs_enabled: true,
            window_management_enabled: true,
            theme: Theme::Light,
        }
    }
}

/// A change to some of the settings fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub vertical_tabs_enabled: Option<bool>,
    pub window_management_enabled: Option<bool>,
    pub theme: Option<Theme>,
}

impl SettingsPatch {
    pub fn theme(theme: Theme) -> Self {
        SettingsPatch {
            theme: Some(theme),
            ..SettingsPatch::default()
        }
    }

    /// Read a persisted blob field by field. Missing or undecodable fields
    /// stay `None`, so one bad value never costs the others.
    pub fn from_stored(value: &serde_json::Value) -> Self {
        let Some(object) = value.as_object() else {
            warn!("Ignoring settings blob that is not an object: {}", value);
            return SettingsPatch::default();
        };

        SettingsPatch {
            vertical_tabs_enabled: stored_field(object, "verticalTabsEnabled"),
            window_management_enabled: stored_field(object, "windowManagementEnabled"),
            theme: stored_field(object, "theme"),
        }
    }
}

fn stored_field<T: DeserializeOwned>(
    object: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<T> {
    let value = object.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Ignoring unreadable setting {}: {}", key, e);
            None
        }
    }
}

/// A change the options page makes, resolved against the current settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    ToggleVerticalTabs,
    ToggleWindowManagement,
    Theme(Theme),
}

impl Settings {
    pub fn merge(&self, patch: SettingsPatch) -> Settings {
        Settings {
            vertical_tabs_enabled: patch.vertical_tabs_enabled.unwrap_or(self.vertical_tabs_enabled),
            window_management_enabled: patch
                .window_management_enabled
                .unwrap_or(self.window_management_enabled),
            theme: patch.theme.unwrap_or(self.theme),
        }
    }

    pub fn with_change(&self, change: SettingsChange) -> Settings {
        let patch = match change {
            SettingsChange::ToggleVerticalTabs => SettingsPatch {
                vertical_tabs_enabled: Some(!self.vertical_tabs_enabled),
                ..SettingsPatch::default()
            },
            SettingsChange::ToggleWindowManagement => SettingsPatch {
                window_management_enabled: Some(!self.window_management_enabled),
                ..SettingsPatch::default()
            },
            SettingsChange::Theme(theme) => SettingsPatch::theme(theme),
        };
        self.merge(patch)
    }
}

/// Reads and writes [`Settings`] through the host's key-value storage.
pub struct SettingsStore<'a, H: TabHost + ?Sized> {
    host: &'a H,
}

impl<'a, H: TabHost + ?Sized> SettingsStore<'a, H> {
    pub fn new(host: &'a H) -> Self {
        SettingsStore { host }
    }

    /// Defaults merged with whatever is persisted. Each field is decoded on
    /// its own; a field that does not decode keeps its default and is logged.
    pub async fn load(&self) -> Result<Settings, HostError> {
        let stored = self.host.storage_get(SETTINGS_KEY).await?;

        Ok(match stored {
            None | Some(serde_json::Value::Null) => Settings::default(),
            Some(value) => Settings::default().merge(SettingsPatch::from_stored(&value)),
        })
    }

    /// Replace the persisted blob.
    pub async fn save(&self, settings: &Settings) -> Result<(), HostError> {
        let value = serde_json::to_value(settings)
            .map_err(|e| HostError::decode("settings", e.to_string()))?;
        self.host.storage_set(SETTINGS_KEY, value).await
    }

    /// Load, merge one change in, save. Returns what was saved.
    pub async fn apply(&self, patch: SettingsPatch) -> Result<Settings, HostError> {
        let merged = self.load().await?.merge(patch);
        self.save(&merged).await?;
        Ok(merged)
    }

    /// Like [`apply`](Self::apply), but the change is resolved against the
    /// freshly loaded settings rather than a copy the caller rendered.
    pub async fn change(&self, change: SettingsChange) -> Result<Settings, HostError> {
        let changed = self.load().await?.with_change(change);
        self.save(&changed).await?;
        Ok(changed)
    }
}

/// Runs settings writes one at a time, so each one loads what the previous
/// one saved.
#[derive(Default)]
pub struct SettingsWriter {
    lock: Mutex<()>,
}

impl SettingsWriter {
    pub fn new() -> Self {
        SettingsWriter::default()
    }

    pub async fn write<H: TabHost + ?Sized>(
        &self,
        host: &H,
        change: SettingsChange,
    ) -> Result<Settings, HostError> {
        let _guard = self.lock.lock().await;
        SettingsStore::new(host).change(change).await
    }
}
