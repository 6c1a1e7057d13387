//! Directional focus movement over a column partition.
//!
//! All moves are total: when there is nowhere to go, or the current index is
//! not in the partition, the current index comes back unchanged.
//!
//! Horizontal moves are row-aligned rather than pixel-aligned. The balancer
//! places cards by estimated height, so cards in neighbouring columns are not
//! guaranteed to line up visually; matching by row keeps Left/Right predictable.

use super::partition::ColumnPartition;

/// A directional focus command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Previous entry in the same column.
pub fn move_up<T>(partition: &ColumnPartition<T>, current: usize) -> usize {
    let Some((column, row)) = partition.locate(current) else {
        return current;
    };
    if row == 0 {
        return current;
    }
    partition
        .entry_at(column, row - 1)
        .map_or(current, |e| e.original_index)
}

/// Next entry in the same column.
pub fn move_down<T>(partition: &ColumnPartition<T>, current: usize) -> usize {
    let Some((column, row)) = partition.locate(current) else {
        return current;
    };
    partition
        .entry_at(column, row + 1)
        .map_or(current, |e| e.original_index)
}

/// Same row in the previous column. No wraparound.
pub fn move_left<T>(partition: &ColumnPartition<T>, current: usize) -> usize {
    let Some((column, row)) = partition.locate(current) else {
        return current;
    };
    if column == 0 {
        return current;
    }
    partition
        .entry_at(column - 1, row)
        .map_or(current, |e| e.original_index)
}

/// Same row in the next column. A shorter target column is not a valid
/// target; there is no snapping to its last row.
pub fn move_right<T>(partition: &ColumnPartition<T>, current: usize) -> usize {
    let Some((column, row)) = partition.locate(current) else {
        return current;
    };
    partition
        .entry_at(column + 1, row)
        .map_or(current, |e| e.original_index)
}

pub fn move_focus<T>(partition: &ColumnPartition<T>, current: usize, direction: Direction) -> usize {
    match direction {
        Direction::Up => move_up(partition, current),
        Direction::Down => move_down(partition, current),
        Direction::Left => move_left(partition, current),
        Direction::Right => move_right(partition, current),
    }
}
