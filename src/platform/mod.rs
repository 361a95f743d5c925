//! Browser glue. Implements the capability traits over `web-sys` and the
//! extension APIs, and exports the two entry points the extension's loader
//! scripts call.

pub mod background;
pub mod browser_dom;
pub mod chrome;
pub mod content;
pub mod logging;
pub mod scheduler;

pub use browser_dom::BrowserDom;
pub use chrome::SyncStorage;
pub use scheduler::BrowserScheduler;
