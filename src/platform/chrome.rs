//! Extension API bindings: sync storage, runtime messaging, tab updates and
//! the runtime liveness check.

use async_trait::async_trait;
use js_sys::{JSON, Promise, Reflect};
use serde_json::Value;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::config::{Settings, SettingsChanges, SettingsPatch};
use crate::services::NavigationNotice;
use crate::services::settings_bridge::{ChangeListener, SettingsStore};
use crate::utils::errors::{OverlayError, Result};

const SYNC_AREA: &str = "sync";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = get, catch)]
    fn storage_sync_get(keys: &JsValue) -> std::result::Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = set, catch)]
    fn storage_sync_set(items: &JsValue) -> std::result::Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn storage_on_changed(callback: &Closure<dyn Fn(JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message(callback: &Closure<dyn Fn(JsValue, JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getManifest, catch)]
    fn runtime_get_manifest() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onUpdated"], js_name = addListener)]
    fn tabs_on_updated(callback: &Closure<dyn Fn(JsValue, JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = sendMessage, catch)]
    fn tabs_send_message(tab_id: i32, message: &JsValue) -> std::result::Result<Promise, JsValue>;
}

fn js_error(context: &str, error: JsValue) -> OverlayError {
    OverlayError::storage(format!("{}: {:?}", context, error))
}

/// `JsValue` to JSON through the engine's own serializer.
pub fn to_json(value: &JsValue) -> Result<Value> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text = JSON::stringify(value)
        .map_err(|e| OverlayError::dom(format!("JSON.stringify failed: {:?}", e)))?;
    let text: String = text.into();
    Ok(serde_json::from_str(&text)?)
}

pub fn from_json(value: &Value) -> Result<JsValue> {
    let text = serde_json::to_string(value)?;
    JSON::parse(&text).map_err(|e| OverlayError::dom(format!("JSON.parse failed: {:?}", e)))
}

fn property(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// `chrome.runtime.id` is cleared once the extension is reloaded or
/// removed; the page keeps our script running regardless.
pub fn is_context_alive() -> bool {
    property(&js_sys::global(), "chrome")
        .and_then(|chrome| property(&chrome, "runtime"))
        .and_then(|runtime| property(&runtime, "id"))
        .is_some_and(|id| id.is_truthy())
}

/// Packed store builds carry an `update_url` in their manifest.
pub fn is_development_build() -> bool {
    match runtime_get_manifest() {
        Ok(manifest) => property(&manifest, "update_url").is_none(),
        Err(_) => false,
    }
}

/// `chrome.storage.sync` as a [`SettingsStore`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStorage;

#[async_trait(?Send)]
impl SettingsStore for SyncStorage {
    async fn get(&self) -> Result<Settings> {
        let promise = storage_sync_get(&JsValue::NULL).map_err(|e| js_error("storage get", e))?;
        let items = JsFuture::from(promise)
            .await
            .map_err(|e| js_error("storage get", e))?;
        let raw = match to_json(&items)? {
            Value::Null => Value::Object(Default::default()),
            raw => raw,
        };
        Settings::from_storage(raw)
    }

    async fn set(&self, patch: SettingsPatch) -> Result<()> {
        let items = from_json(&Value::Object(patch.into_map()))?;
        let promise = storage_sync_set(&items).map_err(|e| js_error("storage set", e))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| js_error("storage set", e))?;
        Ok(())
    }

    fn on_change(&self, listener: ChangeListener) {
        let callback = Closure::<dyn Fn(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
            if area.as_string().as_deref() != Some(SYNC_AREA) {
                return;
            }
            let parsed = to_json(&changes)
                .and_then(|raw| serde_json::from_value::<SettingsChanges>(raw).map_err(Into::into));
            match parsed {
                Ok(changes) => listener(&changes),
                Err(e) => warn!("Unreadable storage change: {}", e),
            }
        });
        storage_on_changed(&callback);
        callback.forget();
    }
}

/// Forward every runtime message to `handler` as JSON.
pub fn on_runtime_message(handler: impl Fn(Value) + 'static) {
    let callback = Closure::<dyn Fn(JsValue, JsValue, JsValue)>::new(
        move |message: JsValue, _sender: JsValue, _respond: JsValue| match to_json(&message) {
            Ok(message) => handler(message),
            Err(e) => debug!("Unreadable runtime message: {}", e),
        },
    );
    runtime_on_message(&callback);
    callback.forget();
}

/// Call `handler(tab_id, change_info)` on every tab update.
pub fn on_tab_updated(handler: impl Fn(i32, Value) + 'static) {
    let callback = Closure::<dyn Fn(JsValue, JsValue, JsValue)>::new(
        move |tab_id: JsValue, change_info: JsValue, _tab: JsValue| {
            let Some(tab_id) = tab_id.as_f64() else {
                return;
            };
            match to_json(&change_info) {
                Ok(info) => handler(tab_id as i32, info),
                Err(e) => debug!("Unreadable tab update: {}", e),
            }
        },
    );
    tabs_on_updated(&callback);
    callback.forget();
}

/// Deliver a notice to a tab's content script. Tabs without one reject the
/// send; that is expected and only logged.
pub fn send_notice(tab_id: i32, notice: &NavigationNotice) {
    let message = match serde_json::to_value(notice)
        .map_err(OverlayError::from)
        .and_then(|value| from_json(&value))
    {
        Ok(message) => message,
        Err(e) => {
            warn!("Failed to encode navigation notice: {}", e);
            return;
        }
    };

    let promise = match tabs_send_message(tab_id, &message) {
        Ok(promise) => promise,
        Err(e) => {
            debug!("No receiver in tab {}: {:?}", tab_id, e);
            return;
        }
    };
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            debug!("No receiver in tab {}: {:?}", tab_id, e.dyn_ref::<js_sys::Error>().map(|e| e.message()));
        }
    });
}
