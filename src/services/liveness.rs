//! Single liveness check shared by every callback.
//!
//! When the extension is reloaded or disabled the content script keeps
//! running with a dead runtime. Every delayed callback goes through
//! [`LivenessGuard::run`] so it no-ops instead of touching the page or
//! storage.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

#[derive(Clone)]
pub struct LivenessGuard {
    check: Rc<dyn Fn() -> bool>,
    reported: Rc<Cell<bool>>,
}

impl LivenessGuard {
    pub fn new(check: impl Fn() -> bool + 'static) -> Self {
        Self {
            check: Rc::new(check),
            reported: Rc::new(Cell::new(false)),
        }
    }

    /// Guard that never invalidates.
    pub fn always() -> Self {
        Self::new(|| true)
    }

    /// Guard driven by a shared flag; clearing the flag invalidates it.
    pub fn from_flag(flag: Rc<Cell<bool>>) -> Self {
        Self::new(move || flag.get())
    }

    pub fn is_alive(&self) -> bool {
        let alive = (self.check)();
        if !alive && !self.reported.replace(true) {
            debug!("Extension context invalidated; callbacks are now inert");
        }
        alive
    }

    /// Run `f` only while the context is alive.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        if self.is_alive() { Some(f()) } else { None }
    }
}

impl fmt::Debug for LivenessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivenessGuard")
            .field("reported_dead", &self.reported.get())
            .finish()
    }
}
