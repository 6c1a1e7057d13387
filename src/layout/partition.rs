/// An item bound to its position in the source sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnEntry<T> {
    pub item: T,
    pub original_index: usize,
}

/// Items split into columns, with an `original_index -> (column, row)` lookup.
///
/// Produced by [`distribute`](super::distribute). Columns keep source order and
/// every original index appears in exactly one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPartition<T> {
    columns: Vec<Vec<ColumnEntry<T>>>,
    /// Indexed by original index.
    positions: Vec<Option<(usize, usize)>>,
    len: usize,
}

impl<T> Default for ColumnPartition<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> ColumnPartition<T> {
    /// A partition with no columns at all.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            positions: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn with_columns(column_count: usize) -> Self {
        Self {
            columns: (0..column_count).map(|_| Vec::new()).collect(),
            positions: Vec::new(),
            len: 0,
        }
    }

    /// Build a partition from explicit columns.
    ///
    /// No balance check is made, so this also accepts ragged shapes.
    /// If an original index appears twice, the later position wins.
    pub fn from_columns(columns: Vec<Vec<ColumnEntry<T>>>) -> Self {
        let mut partition = Self {
            columns: Vec::with_capacity(columns.len()),
            positions: Vec::new(),
            len: 0,
        };
        for (column, entries) in columns.into_iter().enumerate() {
            partition.columns.push(Vec::with_capacity(entries.len()));
            for entry in entries {
                partition.push(column, entry.item, entry.original_index);
            }
        }
        partition
    }

    pub(crate) fn push(&mut self, column: usize, item: T, original_index: usize) {
        let row = self.columns[column].len();
        self.columns[column].push(ColumnEntry {
            item,
            original_index,
        });
        if self.positions.len() <= original_index {
            self.positions.resize(original_index + 1, None);
        }
        self.positions[original_index] = Some((column, row));
        self.len += 1;
    }

    pub fn columns(&self) -> &[Vec<ColumnEntry<T>>] {
        &self.columns
    }

    pub fn column(&self, column: usize) -> Option<&[ColumnEntry<T>]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of entries across all columns.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column_lengths(&self) -> Vec<usize> {
        self.columns.iter().map(Vec::len).collect()
    }

    /// Column and row holding `original_index`, if present.
    pub fn locate(&self, original_index: usize) -> Option<(usize, usize)> {
        self.positions.get(original_index).copied().flatten()
    }

    pub fn entry_at(&self, column: usize, row: usize) -> Option<&ColumnEntry<T>> {
        self.columns.get(column)?.get(row)
    }

    pub fn get(&self, original_index: usize) -> Option<&ColumnEntry<T>> {
        let (column, row) = self.locate(original_index)?;
        self.entry_at(column, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(original_index: usize) -> ColumnEntry<char> {
        ColumnEntry {
            item: 'x',
            original_index,
        }
    }

    #[test]
    fn test_empty_partition() {
        let p: ColumnPartition<char> = ColumnPartition::empty();
        assert_eq!(p.column_count(), 0);
        assert!(p.is_empty());
        assert_eq!(p.locate(0), None);
        assert_eq!(p.entry_at(0, 0), None);
    }

    #[test]
    fn test_from_columns_locates_entries() {
        let p = ColumnPartition::from_columns(vec![
            vec![entry(0), entry(2), entry(3)],
            vec![entry(1)],
        ]);
        assert_eq!(p.len(), 4);
        assert_eq!(p.column_lengths(), vec![3, 1]);
        assert_eq!(p.locate(0), Some((0, 0)));
        assert_eq!(p.locate(1), Some((1, 0)));
        assert_eq!(p.locate(3), Some((0, 2)));
        assert_eq!(p.locate(4), None);
        assert_eq!(p.get(2).map(|e| e.original_index), Some(2));
    }

    #[test]
    fn test_from_columns_tolerates_gaps() {
        let p = ColumnPartition::from_columns(vec![vec![entry(5)]]);
        assert_eq!(p.locate(5), Some((0, 0)));
        assert_eq!(p.locate(2), None);
    }
}
