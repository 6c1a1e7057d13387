//! Small helpers shared by the UI and background tasks.
//!
//! - **Text**: width-aware truncation, wrapping, and control-char stripping
//!   for text that arrives from the network.
//! - **Tasks**: panic capture for spawned futures.

mod task;
mod text;

pub use task::catch_task_panic;
pub use text::{display_width, strip_control_chars, truncate_to_width, wrap_to_width};
