// Player controls overlay for the Shorts feed.
// Platform-independent logic lives in every module below `platform`, which is
// the browser glue and only builds for wasm32.

pub mod app;
pub mod config;
pub mod constants;
pub mod dom;
pub mod locator;
pub mod player;
pub mod services;
pub mod utils;
pub mod watcher;

#[cfg(target_arch = "wasm32")]
pub mod platform;

pub use app::{ContentScript, ListenerRegistry, Platform};
pub use config::{SettingKey, Settings, SettingsPatch};
pub use player::{Binder, BinderState};
pub use utils::errors::{OverlayError, Result};
