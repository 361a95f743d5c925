//! Keyboard shortcut resolution.
//!
//! [`resolve`] only decides which shortcut a key press maps to; the binder
//! applies it to the bound video. Keeping the decision pure lets the gating
//! rules be tested without a document.

use crate::constants::{SEEK_STEP_SECS, VOLUME_STEP_PERCENT};
use crate::dom::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shortcut {
    TogglePlay,
    /// Relative seek in seconds, clamped to the video by the caller.
    Seek(f64),
    /// Relative volume change in percentage points.
    Volume(f64),
    /// Jump to a fraction of the duration (digit keys, `0.0..=0.9`).
    SeekToFraction(f64),
}

/// Page and settings state the gating rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub enabled: bool,
    pub on_shorts_page: bool,
    pub user_typing: bool,
    pub volume_with_arrows: bool,
}

pub fn resolve(event: &KeyEvent, ctx: &KeyContext) -> Option<Shortcut> {
    if !ctx.enabled || !ctx.on_shorts_page || ctx.user_typing {
        return None;
    }
    if event.has_command_modifier() {
        return None;
    }

    // Shift is reserved for the alternate volume mode when arrows seek.
    let shift_reserved = event.shift && !ctx.volume_with_arrows;

    match event.key.as_str() {
        " " | "k" | "K" if !event.shift => Some(Shortcut::TogglePlay),
        "ArrowLeft" if !shift_reserved => Some(Shortcut::Seek(-SEEK_STEP_SECS)),
        "ArrowRight" if !shift_reserved => Some(Shortcut::Seek(SEEK_STEP_SECS)),
        "ArrowUp" | "ArrowDown" => {
            // Exactly one of the setting and Shift must hold.
            if ctx.volume_with_arrows == event.shift {
                return None;
            }
            let step = if event.key == "ArrowUp" {
                VOLUME_STEP_PERCENT
            } else {
                -VOLUME_STEP_PERCENT
            };
            Some(Shortcut::Volume(step))
        }
        key if !shift_reserved => digit(key).map(|d| Shortcut::SeekToFraction(d as f64 / 10.0)),
        _ => None,
    }
}

fn digit(key: &str) -> Option<u32> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10),
        _ => None,
    }
}
