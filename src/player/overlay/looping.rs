use tracing::debug;

use crate::dom::Media;

/// Keeps `video.loop` equal to `!disable_infinite_loop`.
///
/// The host resets the flag while it sets a video up, so the guard stays
/// passive until playback has moved past zero once.
#[derive(Debug, Default)]
pub struct LoopGuard {
    engaged: bool,
}

impl LoopGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// A new video starts passive again.
    pub fn reset(&mut self) {
        self.engaged = false;
    }

    pub fn on_time_update<D: Media>(&mut self, dom: &D, video: &D::Element, disable_loop: bool) {
        if !self.engaged && dom.current_time(video) > 0.0 {
            self.engaged = true;
            debug!("Loop guard engaged");
            self.enforce(dom, video, disable_loop);
        }
    }

    /// The host touched the `loop` attribute.
    pub fn on_loop_attribute<D: Media>(&self, dom: &D, video: &D::Element, disable_loop: bool) {
        if self.engaged {
            self.enforce(dom, video, disable_loop);
        }
    }

    /// Setting changed.
    pub fn on_setting<D: Media>(&self, dom: &D, video: &D::Element, disable_loop: bool) {
        if self.engaged {
            self.enforce(dom, video, disable_loop);
        }
    }

    /// Stop at the end instead of letting the host restart the item.
    pub fn on_ended<D: Media>(&self, dom: &D, video: &D::Element, disable_loop: bool) {
        if disable_loop {
            dom.pause(video);
        }
    }

    fn enforce<D: Media>(&self, dom: &D, video: &D::Element, disable_loop: bool) {
        let wanted = !disable_loop;
        if dom.looping(video) != wanted {
            debug!("Correcting video loop flag to {}", wanted);
            dom.set_looping(video, wanted);
        }
    }
}
