use std::time::Duration;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

use crate::services::scheduler::{Scheduler, Task, TimerId};
use crate::utils::errors::{OverlayError, Result};

/// `setTimeout` and `requestAnimationFrame` on the page window.
pub struct BrowserScheduler {
    window: Window,
}

impl BrowserScheduler {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| OverlayError::dom("no window"))?;
        Ok(Self { window })
    }
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TimerId {
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            Ok(handle) => TimerId(handle),
            Err(e) => {
                warn!("setTimeout failed: {:?}", e);
                TimerId(-1)
            }
        }
    }

    fn clear_timeout(&self, id: TimerId) {
        self.window.clear_timeout_with_handle(id.0);
    }

    fn request_animation_frame(&self, task: Task) {
        let callback = Closure::once_into_js(move || task());
        if let Err(e) = self.window.request_animation_frame(callback.unchecked_ref()) {
            warn!("requestAnimationFrame failed: {:?}", e);
        }
    }
}
