use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::constants::{
    ALWAYS_VISIBLE_ATTRIBUTE, ENABLED_ATTRIBUTE, HIDE_DEFAULT_CONTROLS_ATTRIBUTE,
    HIDE_INFO_ATTRIBUTE,
};
use crate::utils::errors::Result;

/// User options persisted in extension storage.
///
/// Field names serialize to the storage keys the options popup writes, so a
/// partially populated storage area deserializes with per-field defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub control_always_visible: bool,

    #[serde(default)]
    pub hide_video_info: bool,

    #[serde(default)]
    pub control_volume_with_arrows: bool,

    #[serde(default)]
    pub disable_infinite_loop: bool,

    #[serde(default)]
    pub hide_default_controls: bool,

    #[serde(default = "default_true")]
    pub show_view_count: bool,

    #[serde(default)]
    pub saved_volume_value: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            control_always_visible: false,
            hide_video_info: false,
            control_volume_with_arrows: false,
            disable_infinite_loop: false,
            hide_default_controls: false,
            show_view_count: default_true(),
            saved_volume_value: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Storage keys recognized by [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Enabled,
    ControlAlwaysVisible,
    HideVideoInfo,
    ControlVolumeWithArrows,
    DisableInfiniteLoop,
    HideDefaultControls,
    ShowViewCount,
    SavedVolumeValue,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::Enabled,
        SettingKey::ControlAlwaysVisible,
        SettingKey::HideVideoInfo,
        SettingKey::ControlVolumeWithArrows,
        SettingKey::DisableInfiniteLoop,
        SettingKey::HideDefaultControls,
        SettingKey::ShowViewCount,
        SettingKey::SavedVolumeValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::ControlAlwaysVisible => "controlAlwaysVisible",
            Self::HideVideoInfo => "hideVideoInfo",
            Self::ControlVolumeWithArrows => "controlVolumeWithArrows",
            Self::DisableInfiniteLoop => "disableInfiniteLoop",
            Self::HideDefaultControls => "hideDefaultControls",
            Self::ShowViewCount => "showViewCount",
            Self::SavedVolumeValue => "savedVolumeValue",
        }
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    /// Whether a change to this key affects the page-root marker attributes.
    pub fn affects_markers(&self) -> bool {
        matches!(
            self,
            Self::Enabled | Self::ControlAlwaysVisible | Self::HideVideoInfo | Self::HideDefaultControls
        )
    }
}

/// One entry of a storage change notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default)]
    pub new_value: Option<Value>,
    #[serde(default)]
    pub old_value: Option<Value>,
}

/// Changes keyed by storage key, as delivered by the storage change event.
pub type SettingsChanges = HashMap<String, StorageChange>;

/// Partial settings object handed to storage `set`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch(Map<String, Value>);

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: SettingKey, value: impl Into<Value>) -> Self {
        self.0.insert(key.as_str().to_string(), value.into());
        self
    }

    pub fn saved_volume(volume: f64) -> Self {
        Self::new().with(SettingKey::SavedVolumeValue, volume)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: SettingKey) -> Option<&Value> {
        self.0.get(key.as_str())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl Settings {
    /// Build settings from a raw storage object, filling in defaults for
    /// missing keys. Unknown keys are ignored.
    pub fn from_storage(raw: Value) -> Result<Self> {
        let settings = serde_json::from_value(raw)?;
        Ok(settings)
    }

    pub fn to_storage(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Apply a change notification and return the keys whose value actually
    /// changed. A removed key (no `newValue`) falls back to its default.
    pub fn apply_changes(&mut self, changes: &SettingsChanges) -> Vec<SettingKey> {
        let mut changed = Vec::new();

        for (name, change) in changes {
            let Some(key) = SettingKey::from_storage_key(name) else {
                debug!("Ignoring change to unknown storage key {}", name);
                continue;
            };

            if self.apply_value(key, change.new_value.clone()) {
                changed.push(key);
            }
        }

        changed
    }

    /// Apply a patch written locally, ahead of the storage round-trip.
    pub fn apply_patch(&mut self, patch: &SettingsPatch) -> Vec<SettingKey> {
        let mut changed = Vec::new();
        for (name, value) in patch.as_map() {
            if let Some(key) = SettingKey::from_storage_key(name)
                && self.apply_value(key, Some(value.clone()))
            {
                changed.push(key);
            }
        }
        changed
    }

    fn apply_value(&mut self, key: SettingKey, value: Option<Value>) -> bool {
        let defaults = Settings::default();

        macro_rules! set_bool {
            ($field:ident) => {{
                let next = match value.as_ref() {
                    None | Some(Value::Null) => defaults.$field,
                    Some(v) => match v.as_bool() {
                        Some(b) => b,
                        None => {
                            warn!("Expected boolean for {}, got {}", key.as_str(), v);
                            return false;
                        }
                    },
                };
                let changed = self.$field != next;
                self.$field = next;
                changed
            }};
        }

        match key {
            SettingKey::Enabled => set_bool!(enabled),
            SettingKey::ControlAlwaysVisible => set_bool!(control_always_visible),
            SettingKey::HideVideoInfo => set_bool!(hide_video_info),
            SettingKey::ControlVolumeWithArrows => set_bool!(control_volume_with_arrows),
            SettingKey::DisableInfiniteLoop => set_bool!(disable_infinite_loop),
            SettingKey::HideDefaultControls => set_bool!(hide_default_controls),
            SettingKey::ShowViewCount => set_bool!(show_view_count),
            SettingKey::SavedVolumeValue => {
                let next = value.as_ref().and_then(Value::as_f64);
                let changed = self.saved_volume_value != next;
                self.saved_volume_value = next;
                changed
            }
        }
    }

    /// Boolean attributes mirrored onto the page root for the stylesheet.
    pub fn marker_attributes(&self) -> [(&'static str, bool); 4] {
        [
            (ENABLED_ATTRIBUTE, self.enabled),
            (ALWAYS_VISIBLE_ATTRIBUTE, self.control_always_visible),
            (HIDE_INFO_ATTRIBUTE, self.hide_video_info),
            (HIDE_DEFAULT_CONTROLS_ATTRIBUTE, self.hide_default_controls),
        ]
    }
}
