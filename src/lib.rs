//! feedgrid: a terminal social feed reader.
//!
//! The core is a masonry column layout with 2D keyboard navigation
//! ([`layout`]) and a debounced, monotonic notification seen-state protocol
//! ([`seen`]). [`feed`] holds paginated lists and the fixture backend; [`ui`]
//! is the ratatui host that drives both.

pub mod app;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod layout;
pub mod preferences;
pub mod seen;
pub mod ui;
pub mod util;
