use std::cmp::Ordering;

use super::height::{HeightModel, LayoutItem};
use super::partition::ColumnPartition;

/// Distribute items into `column_count` columns using the default height model.
///
/// See [`distribute_with`] for the placement rule.
pub fn distribute<T: LayoutItem + Clone>(items: &[T], column_count: usize) -> ColumnPartition<T> {
    let model = HeightModel::default();
    distribute_with(items, column_count, |item| model.estimate(item))
}

/// Distribute items into `column_count` columns with a caller-supplied height estimate.
///
/// Items are placed strictly in source order, greedily, never revisiting a
/// placement. Each item goes to the column that keeps every column within one
/// item of the thinnest; among those, the one with the smallest accumulated
/// height, then fewer items, then the lowest index.
///
/// A `column_count` of zero yields a partition with no columns. An empty
/// `items` slice yields `column_count` empty columns.
pub fn distribute_with<T, F>(items: &[T], column_count: usize, mut estimate: F) -> ColumnPartition<T>
where
    T: Clone,
    F: FnMut(&T) -> f64,
{
    if column_count < 1 {
        return ColumnPartition::empty();
    }

    let mut partition = ColumnPartition::with_columns(column_count);
    let mut heights = vec![0.0_f64; column_count];
    let mut counts = vec![0_usize; column_count];

    for (index, item) in items.iter().enumerate() {
        let column = pick_column(&heights, &counts);
        heights[column] += estimate(item);
        counts[column] += 1;
        partition.push(column, item.clone(), index);
    }

    tracing::trace!(
        items = items.len(),
        columns = column_count,
        "Distributed items into columns"
    );
    partition
}

/// Choose the target column for the next item.
fn pick_column(heights: &[f64], counts: &[usize]) -> usize {
    let min_count = counts.iter().copied().min().unwrap_or(0);

    let mut best: Option<usize> = None;
    for column in 0..counts.len() {
        // Appending here must not leave this column more than one ahead of the thinnest
        if counts[column] + 1 > min_count + 1 {
            continue;
        }
        best = match best {
            None => Some(column),
            Some(current) => {
                let order = heights[column]
                    .total_cmp(&heights[current])
                    .then(counts[column].cmp(&counts[current]));
                // Strictly better only, so ties keep the lower index
                if order == Ordering::Less {
                    Some(column)
                } else {
                    Some(current)
                }
            }
        };
    }
    best.unwrap_or(0)
}
