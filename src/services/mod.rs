pub mod liveness;
pub mod messages;
pub mod scheduler;
pub mod settings_bridge;

pub use liveness::LivenessGuard;
pub use messages::NavigationNotice;
pub use scheduler::{ManualScheduler, Scheduler, TimerId, TimerSlot};
pub use settings_bridge::{MemorySettingsStore, SettingsBridge, SettingsStore};
