use std::sync::Arc;

use super::source::Pagination;
use crate::layout::{
    card_rows, distribute_with, move_focus, ColumnPartition, Direction, HeightModel, LayoutItem,
};
use crate::seen::viewport::{intersection_ratio, Span};

/// One paginated list laid out as a masonry grid.
///
/// Holds the loaded items, the partition computed from them, the focused
/// original index, and the vertical scroll offset in terminal rows. The
/// partition stores indices into `items`; it is recomputed whenever the
/// items or the column count change.
#[derive(Debug, Clone)]
pub struct FeedGrid<T> {
    /// Wrapped in Arc so render snapshots and detail views clone in O(1).
    items: Arc<Vec<T>>,
    partition: ColumnPartition<usize>,
    columns: usize,
    focus: Option<usize>,
    scroll_top: usize,
    model: HeightModel,
    pub pagination: Pagination,
}

impl<T: LayoutItem + Clone> FeedGrid<T> {
    pub fn new(columns: usize, model: HeightModel) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            partition: ColumnPartition::with_columns(columns),
            columns,
            focus: None,
            scroll_top: 0,
            model,
            pagination: Pagination::default(),
        }
    }

    pub fn items(&self) -> &Arc<Vec<T>> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn partition(&self) -> &ColumnPartition<usize> {
        &self.partition
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn focused(&self) -> Option<&T> {
        self.focus.and_then(|i| self.items.get(i))
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Replace the list wholesale. Focus moves to the first item and scroll resets.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = Arc::new(items);
        self.focus = (!self.items.is_empty()).then_some(0);
        self.scroll_top = 0;
        self.relayout();
    }

    /// Add the next page. Focus stays on the same item.
    pub fn append(&mut self, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        Arc::make_mut(&mut self.items).extend(items);
        if self.focus.is_none() {
            self.focus = Some(0);
        }
        self.relayout();
    }

    /// Change the column count. Returns false when it was already `columns`.
    pub fn set_columns(&mut self, columns: usize) -> bool {
        if columns == self.columns {
            return false;
        }
        self.columns = columns;
        self.relayout();
        true
    }

    /// Move focus one step. Returns true when focus changed.
    pub fn move_focus(&mut self, direction: Direction) -> bool {
        let Some(current) = self.focus else {
            return false;
        };
        let next = move_focus(&self.partition, current, direction);
        self.focus = Some(next);
        next != current
    }

    pub fn set_focus(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.focus = Some(index);
        true
    }

    fn relayout(&mut self) {
        let indices: Vec<usize> = (0..self.items.len()).collect();
        let items = &self.items;
        let model = &self.model;
        self.partition = distribute_with(&indices, self.columns, |&i| model.estimate(&items[i]));
        tracing::trace!(
            items = self.items.len(),
            columns = self.columns,
            lengths = ?self.partition.column_lengths(),
            "Relayout"
        );
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Card spans per column, top to bottom: `(original_index, span)`.
    pub fn card_spans(&self, column_cells: u16) -> Vec<Vec<(usize, Span)>> {
        self.partition
            .columns()
            .iter()
            .map(|column| {
                let mut top = 0;
                column
                    .iter()
                    .map(|entry| {
                        let height = card_rows(&self.items[entry.item], column_cells);
                        let span = Span::new(top, height);
                        top += height;
                        (entry.original_index, span)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn span_of(&self, index: usize, column_cells: u16) -> Option<Span> {
        let (column, row) = self.partition.locate(index)?;
        let entries = self.partition.column(column)?;
        let top = entries[..row]
            .iter()
            .map(|e| card_rows(&self.items[e.item], column_cells))
            .sum();
        let height = card_rows(&self.items[entries[row].item], column_cells);
        Some(Span::new(top, height))
    }

    /// Rows needed to draw the tallest column.
    pub fn content_rows(&self, column_cells: u16) -> usize {
        self.card_spans(column_cells)
            .iter()
            .filter_map(|column| column.last().map(|(_, span)| span.bottom()))
            .max()
            .unwrap_or(0)
    }

    /// Adjust the scroll offset so the focused card is on screen.
    ///
    /// A card taller than the viewport is aligned to its top.
    pub fn scroll_into_view(&mut self, viewport_rows: usize, column_cells: u16) {
        let Some(span) = self.focus.and_then(|f| self.span_of(f, column_cells)) else {
            self.scroll_top = 0;
            return;
        };
        if span.top < self.scroll_top || span.height >= viewport_rows {
            self.scroll_top = span.top;
        } else if span.bottom() > self.scroll_top + viewport_rows {
            self.scroll_top = span.bottom() - viewport_rows;
        }
    }

    /// Cards overlapping the viewport, with the fraction of each that is visible.
    pub fn visible(&self, viewport_rows: usize, column_cells: u16, root_margin: usize) -> Vec<(usize, f32)> {
        let viewport = Span::new(self.scroll_top, viewport_rows);
        self.card_spans(column_cells)
            .into_iter()
            .flatten()
            .filter_map(|(index, span)| {
                let ratio = intersection_ratio(span, viewport, root_margin);
                (ratio > 0.0).then_some((index, ratio))
            })
            .collect()
    }

    /// True when focus is within `threshold_rows` of the end of its column.
    pub fn needs_more(&self, threshold_rows: usize) -> bool {
        let Some((column, row)) = self.focus.and_then(|f| self.partition.locate(f)) else {
            return false;
        };
        let len = self.partition.column(column).map_or(0, <[_]>::len);
        row + threshold_rows >= len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Media;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Card(Option<Media>);

    impl LayoutItem for Card {
        fn media(&self) -> Option<Media> {
            self.0
        }
    }

    fn text_cards(n: usize) -> Vec<Card> {
        vec![Card(None); n]
    }

    fn grid(columns: usize, n: usize) -> FeedGrid<Card> {
        let mut grid = FeedGrid::new(columns, HeightModel::default());
        grid.replace(text_cards(n));
        grid
    }

    #[test]
    fn test_replace_sets_focus() {
        let mut grid = grid(3, 7);
        assert_eq!(grid.focus(), Some(0));
        assert_eq!(grid.partition().column_lengths(), vec![3, 2, 2]);
        grid.replace(Vec::new());
        assert_eq!(grid.focus(), None);
        assert!(!grid.move_focus(Direction::Down));
    }

    #[test]
    fn test_append_keeps_focus() {
        let mut grid = grid(2, 4);
        grid.set_focus(3);
        grid.append(text_cards(4));
        assert_eq!(grid.focus(), Some(3));
        assert_eq!(grid.len(), 8);
        assert_eq!(grid.partition().column_lengths(), vec![4, 4]);
    }

    #[test]
    fn test_set_columns_preserves_focused_index() {
        let mut grid = grid(3, 7);
        grid.set_focus(5);
        assert!(grid.set_columns(1));
        assert_eq!(grid.focus(), Some(5));
        assert_eq!(grid.partition().locate(5), Some((0, 5)));
        assert!(!grid.set_columns(1));
    }

    #[test]
    fn test_spans_stack_per_column() {
        let grid = grid(2, 4);
        // Text cards are five rows tall; rows 0 and 1 of each column
        assert_eq!(grid.span_of(0, 30), Some(Span::new(0, 5)));
        assert_eq!(grid.span_of(2, 30), Some(Span::new(5, 5)));
        assert_eq!(grid.content_rows(30), 10);
    }

    #[test]
    fn test_scroll_into_view() {
        let mut grid = grid(1, 10);
        grid.set_focus(4); // rows 20..25
        grid.scroll_into_view(12, 30);
        assert_eq!(grid.scroll_top(), 13);
        grid.set_focus(1); // rows 5..10
        grid.scroll_into_view(12, 30);
        assert_eq!(grid.scroll_top(), 5);
    }

    #[test]
    fn test_visible_ratios() {
        let mut grid = grid(1, 4);
        grid.set_focus(1);
        grid.scroll_into_view(8, 30);
        // viewport rows 2..10: card 0 shows 3 of 5 rows, card 1 fully
        assert_eq!(grid.scroll_top(), 2);
        assert_eq!(grid.visible(8, 30, 0), vec![(0, 0.6), (1, 1.0)]);
    }

    #[test]
    fn test_needs_more_near_column_end() {
        let mut grid = grid(2, 10);
        assert!(!grid.needs_more(2));
        grid.set_focus(6); // column 0, row 3 of 5
        assert!(grid.needs_more(2));
    }
}
