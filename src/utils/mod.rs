pub mod errors;
pub mod format;

pub use errors::OverlayError;
pub use format::{format_time, gradient_percent, progress_gradient};
