pub mod binder;
pub mod keyboard;
pub mod overlay;
pub mod session;

pub use binder::{Binder, BinderState, Effect};
pub use keyboard::{KeyContext, Shortcut};
pub use overlay::{MediaEvent, OverlayHandles, OverlayInput, OverlayWidget};
pub use session::PlayerSession;
