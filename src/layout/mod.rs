//! Masonry layout for feed grids.
//!
//! This module turns a single ordered list of items into balanced columns and
//! moves a focus cursor across them:
//!
//! - **Estimation**: approximate card heights from media aspect ratios
//! - **Balancing**: greedy, count-balanced, height-biased column assignment
//! - **Navigation**: row-aligned 2D focus moves over the resulting columns
//!
//! # Architecture
//!
//! - [`height`] - `HeightModel` and the terminal row mapping used by the grid
//! - [`partition`] - `ColumnPartition` and its original-index lookup
//! - [`balance`] - `distribute` / `distribute_with`
//! - [`navigate`] - `move_up` / `move_down` / `move_left` / `move_right`
//!
//! Everything here is pure. A partition is recomputed from scratch whenever
//! the items or the column count change; focus survives recomputation only
//! through the original index.
//!
//! # Example
//!
//! ```
//! use feedgrid::layout::{distribute, move_right, Media, LayoutItem};
//!
//! #[derive(Clone)]
//! struct Card(Option<Media>);
//! impl LayoutItem for Card {
//!     fn media(&self) -> Option<Media> { self.0 }
//! }
//!
//! let cards = vec![Card(None); 7];
//! let grid = distribute(&cards, 3);
//! assert_eq!(grid.column_lengths(), vec![3, 2, 2]);
//! assert_eq!(move_right(&grid, 0), 1);
//! ```

mod balance;
mod height;
mod navigate;
mod partition;

pub use balance::{distribute, distribute_with};
pub use height::{card_rows, HeightModel, LayoutItem, Media};
pub use navigate::{move_down, move_focus, move_left, move_right, move_up, Direction};
pub use partition::{ColumnEntry, ColumnPartition};
