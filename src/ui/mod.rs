//! Terminal User Interface module.
//!
//! This module provides the TUI for the feed grid, including:
//! - Main event loop (`run`)
//! - Input handling for the grid, notifications list, and overlays
//! - Rendering for the masonry grid, notification cards, and detail view
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch
//! - `helpers` - Task spawning and shared formatting
//! - `grid` - Masonry feed grid widget
//! - `notifications` - Notification list widget
//! - `detail` - Full item overlay
//! - `status` - Tab bar and status bar
//! - `help` - Keybinding overlay

mod detail;
mod events;
mod grid;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod notifications;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
