use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

use crate::config::{SettingKey, Settings, SettingsChanges, SettingsPatch, StorageChange};
use crate::utils::errors::Result;

pub type ChangeListener = Box<dyn Fn(&SettingsChanges)>;

/// Persisted settings area.
///
/// `get` fills in defaults for missing keys. `on_change` listeners receive
/// every changed key with its old and new value, whoever wrote it.
#[async_trait(?Send)]
pub trait SettingsStore {
    async fn get(&self) -> Result<Settings>;
    async fn set(&self, patch: SettingsPatch) -> Result<()>;
    fn on_change(&self, listener: ChangeListener);
}

/// In-memory settings area with the same change semantics as browser sync
/// storage.
#[derive(Default)]
pub struct MemorySettingsStore {
    items: RefCell<Map<String, Value>>,
    listeners: RefCell<Vec<Rc<dyn Fn(&SettingsChanges)>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Map<String, Value>) -> Self {
        Self {
            items: RefCell::new(items),
            listeners: RefCell::default(),
        }
    }

    pub fn raw(&self) -> Map<String, Value> {
        self.items.borrow().clone()
    }

    /// Write without awaiting, as another extension context would.
    pub fn write_external(&self, patch: SettingsPatch) {
        let changes = self.merge(patch);
        self.notify(&changes);
    }

    fn merge(&self, patch: SettingsPatch) -> SettingsChanges {
        let mut items = self.items.borrow_mut();
        let mut changes = SettingsChanges::new();
        for (key, value) in patch.into_map() {
            let old = items.insert(key.clone(), value.clone());
            if old.as_ref() != Some(&value) {
                changes.insert(
                    key,
                    StorageChange {
                        new_value: Some(value),
                        old_value: old,
                    },
                );
            }
        }
        changes
    }

    fn notify(&self, changes: &SettingsChanges) {
        if changes.is_empty() {
            return;
        }
        let listeners: Vec<_> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(changes);
        }
    }
}

#[async_trait(?Send)]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self) -> Result<Settings> {
        Settings::from_storage(Value::Object(self.raw()))
    }

    async fn set(&self, patch: SettingsPatch) -> Result<()> {
        let changes = self.merge(patch);
        self.notify(&changes);
        Ok(())
    }

    fn on_change(&self, listener: ChangeListener) {
        self.listeners.borrow_mut().push(Rc::from(listener));
    }
}

/// Local, eventually consistent copy of the settings.
///
/// Writes update the copy immediately and are reconciled when the store's
/// change notification comes back.
#[derive(Debug, Clone, Default)]
pub struct SettingsBridge {
    current: Settings,
}

impl SettingsBridge {
    pub fn new(initial: Settings) -> Self {
        info!("Settings loaded: enabled={}", initial.enabled);
        Self { current: initial }
    }

    pub async fn load(store: &dyn SettingsStore) -> Result<Self> {
        Ok(Self::new(store.get().await?))
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    /// Optimistic local update ahead of a store write.
    pub fn stage(&mut self, patch: &SettingsPatch) -> Vec<SettingKey> {
        self.current.apply_patch(patch)
    }

    /// Reconcile with a change notification.
    pub fn reconcile(&mut self, changes: &SettingsChanges) -> Vec<SettingKey> {
        let changed = self.current.apply_changes(changes);
        if !changed.is_empty() {
            debug!("Settings changed: {:?}", changed);
        }
        changed
    }
}
