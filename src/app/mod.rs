pub mod content_script;

pub use content_script::{ContentScript, InputSink, KeySink, ListenerRegistry, Platform, Spawner};
