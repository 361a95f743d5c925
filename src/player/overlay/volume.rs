//! Volume slider and mute button, mirrored against the host's own controls.
//!
//! The host keeps the authoritative volume and mute state behind its native
//! slider and mute button, so the overlay writes through them instead of
//! touching the video: values go into the host slider followed by a
//! synthetic `input` event, and mute toggles are forwarded as clicks. Only
//! the host's button keeps its mute carry-over between feed items in step.

use tracing::debug;

use super::{icons, read_percent};
use crate::constants::{ICON_ATTRIBUTE, VOLUME_FILL, VOLUME_REST};
use crate::dom::Media;
use crate::utils::{gradient_percent, progress_gradient};

#[derive(Debug)]
pub struct VolumeControl<E> {
    mute_button: E,
    slider: E,
    host_mute: Option<E>,
    host_slider: Option<E>,
}

impl<E: Clone> VolumeControl<E> {
    pub fn new(mute_button: E, slider: E) -> Self {
        Self {
            mute_button,
            slider,
            host_mute: None,
            host_slider: None,
        }
    }

    pub fn mute_button(&self) -> &E {
        &self.mute_button
    }

    pub fn slider(&self) -> &E {
        &self.slider
    }

    pub fn host_slider(&self) -> Option<&E> {
        self.host_slider.as_ref()
    }

    pub fn rebind_host_mute(&mut self, host_mute: Option<E>) {
        self.host_mute = host_mute;
    }

    /// Adopt a new host slider and take the overlay position from it.
    pub fn rebind_host_slider<D: Media<Element = E>>(&mut self, dom: &D, host_slider: Option<E>) {
        self.host_slider = host_slider;
        self.sync_from_host(dom);
    }

    /// Read the host level from the slider's painted gradient, falling back
    /// to its value. Returns the percentage applied to the overlay.
    pub fn sync_from_host<D: Media<Element = E>>(&self, dom: &D) -> Option<f64> {
        let host = self.host_slider.as_ref()?;
        let percent = dom
            .computed_style(host, "background")
            .and_then(|css| gradient_percent(&css))
            .or_else(|| read_percent(dom, host));

        match percent {
            Some(percent) => {
                debug!("Initial volume percent from host: {}", percent);
                self.show(dom, percent);
                Some(percent)
            }
            None => {
                debug!("Host volume slider has no readable level yet");
                None
            }
        }
    }

    /// Overlay slider `input`: write the level through the host slider.
    pub fn on_input<D: Media<Element = E>>(&self, dom: &D, video: &E) {
        let percent = read_percent(dom, &self.slider).unwrap_or(0.0);
        self.apply(dom, video, percent);

        // Raising the volume of a muted video does not unmute it on the
        // host side; toggle through the host button so both agree.
        if percent > 0.0
            && dom.muted(video)
            && let Some(host_mute) = &self.host_mute
        {
            debug!("Volume raised while muted; forwarding unmute");
            dom.click(host_mute);
        }
    }

    /// Host slider `change`: mirror it.
    pub fn on_host_change<D: Media<Element = E>>(&self, dom: &D) {
        if let Some(percent) = self.host_slider.as_ref().and_then(|h| read_percent(dom, h)) {
            self.show(dom, percent);
        }
    }

    pub fn on_mute_click<D: Media<Element = E>>(&self, dom: &D) {
        match &self.host_mute {
            Some(host_mute) => dom.click(host_mute),
            None => debug!("Mute clicked before the host mute button was found"),
        }
    }

    /// Keyboard volume step in percentage points, clamped to `0..=100`.
    pub fn step<D: Media<Element = E>>(&self, dom: &D, video: &E, delta: f64) -> f64 {
        let current = self
            .host_slider
            .as_ref()
            .and_then(|h| read_percent(dom, h))
            .unwrap_or_else(|| dom.volume(video) * 100.0);
        let next = (current + delta).clamp(0.0, 100.0);
        self.apply(dom, video, next);
        next
    }

    pub fn update_icon<D: Media<Element = E>>(&self, dom: &D, video: &E) {
        let icon = icons::volume_icon(dom.muted(video), dom.volume(video));
        dom.set_attribute(&self.mute_button, ICON_ATTRIBUTE, icon);
    }

    fn apply<D: Media<Element = E>>(&self, dom: &D, video: &E, percent: f64) {
        match &self.host_slider {
            Some(host) => {
                dom.set_input_value(host, &percent.to_string());
                dom.dispatch_input(host);
            }
            None => dom.set_volume(video, percent / 100.0),
        }
        self.show(dom, percent);
    }

    fn show<D: Media<Element = E>>(&self, dom: &D, percent: f64) {
        dom.set_input_value(&self.slider, &percent.to_string());
        dom.set_style(
            &self.slider,
            "background",
            &progress_gradient(VOLUME_FILL, VOLUME_REST, percent),
        );
    }
}
