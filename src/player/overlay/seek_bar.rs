use tracing::debug;

use super::read_percent;
use crate::constants::{SCRUBBER_FILL, SCRUBBER_REST};
use crate::dom::Media;
use crate::utils::{format_time, progress_gradient};

/// Scrubber interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    /// Slider follows playback.
    Idle,
    /// User is dragging; playback is paused and time sync is suspended.
    Dragging { was_playing: bool },
    /// Drag just ended; the next time update may still carry the pre-seek
    /// position, so it does not move the slider.
    Released,
}

/// Seek scrubber and the time label next to the buttons.
#[derive(Debug)]
pub struct SeekBar<E> {
    slider: E,
    time_display: E,
    drag: DragState,
}

impl<E: Clone> SeekBar<E> {
    pub fn new(slider: E, time_display: E) -> Self {
        Self {
            slider,
            time_display,
            drag: DragState::Idle,
        }
    }

    pub fn slider(&self) -> &E {
        &self.slider
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Forget any drag in progress, e.g. when the video element changes.
    pub fn reset(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Move the slider and label to the video's position.
    pub fn sync<D: Media<Element = E>>(&self, dom: &D, video: &E) {
        let percent = playback_percent(dom.current_time(video), dom.duration(video));
        dom.set_input_value(&self.slider, &percent.to_string());
        self.paint(dom, percent);
        self.render_time(dom, dom.current_time(video), dom.duration(video));
    }

    pub fn on_time_update<D: Media<Element = E>>(&mut self, dom: &D, video: &E) {
        match self.drag {
            DragState::Dragging { .. } => {}
            DragState::Released => {
                self.drag = DragState::Idle;
                self.render_time(dom, dom.current_time(video), dom.duration(video));
            }
            DragState::Idle => self.sync(dom, video),
        }
    }

    /// Slider `input`: start or continue a drag.
    pub fn on_input<D: Media<Element = E>>(&mut self, dom: &D, video: &E) {
        if !matches!(self.drag, DragState::Dragging { .. }) {
            let was_playing = !dom.paused(video);
            self.drag = DragState::Dragging { was_playing };
            dom.pause(video);
            debug!("Scrub started (was playing: {})", was_playing);
        }

        let percent = read_percent(dom, &self.slider).unwrap_or(0.0);
        self.paint(dom, percent);

        let duration = dom.duration(video);
        if duration.is_finite() {
            self.render_time(dom, percent / 100.0 * duration, duration);
        }
    }

    /// Slider `change`: seek once and resume if the drag interrupted playback.
    pub fn on_release<D: Media<Element = E>>(&mut self, dom: &D, video: &E) {
        let was_playing = match self.drag {
            DragState::Dragging { was_playing } => was_playing,
            _ => false,
        };
        self.drag = DragState::Released;

        let percent = read_percent(dom, &self.slider).unwrap_or(0.0);
        let duration = dom.duration(video);
        if duration.is_finite() && duration > 0.0 {
            dom.set_current_time(video, percent / 100.0 * duration);
        }
        self.paint(dom, percent);
        self.render_time(dom, dom.current_time(video), duration);

        if was_playing {
            dom.play(video);
        }
    }

    fn paint<D: Media<Element = E>>(&self, dom: &D, percent: f64) {
        dom.set_style(
            &self.slider,
            "background",
            &progress_gradient(SCRUBBER_FILL, SCRUBBER_REST, percent),
        );
    }

    fn render_time<D: Media<Element = E>>(&self, dom: &D, current: f64, duration: f64) {
        let label = format!("{} / {}", format_time(current), format_time(duration));
        dom.set_text(&self.time_display, &label);
    }
}

/// Playback position as a percentage; zero until the duration is known.
pub fn playback_percent(current_time: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    (current_time / duration * 100.0).clamp(0.0, 100.0)
}
