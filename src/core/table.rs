//! Table - ordered named columns of series plus user data.

use crate::core::{Series, UserData};
use crate::util::{Error, Result};

/// Column holding per-vertex positions.
pub const POSITIONS: &str = "positions";

/// Column holding triangle corners. Lives in its own element space.
pub const INDICES: &str = "indices";

/// Ordered mapping from unique column name to [`Series`].
///
/// Every column except [`INDICES`] describes the same set of elements and
/// must have the same item count. Names are unique: inserting an existing
/// name fails instead of overwriting.
#[derive(Clone, Debug, Default)]
pub struct Table {
    columns: Vec<(String, Series)>,
    user_data: UserData,
}

impl Table {
    /// Build a table, validating names and counts.
    pub fn new<I, S>(columns: I, user_data: UserData) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Series)>,
        S: Into<String>,
    {
        let mut table = Self {
            columns: Vec::new(),
            user_data,
        };
        for (name, series) in columns {
            table.insert(name, series)?;
        }
        Ok(table)
    }

    /// Return this table extended with `columns`.
    pub fn append<I, S>(mut self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Series)>,
        S: Into<String>,
    {
        for (name, series) in columns {
            self.insert(name, series)?;
        }
        Ok(self)
    }

    /// Add one column.
    ///
    /// Fails with [`Error::DuplicateColumn`] on a name collision and with
    /// [`Error::InconsistentColumnLengths`] if the count disagrees with the
    /// columns already present in the same element space.
    pub fn insert(&mut self, name: impl Into<String>, series: Series) -> Result<()> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(Error::DuplicateColumn(name));
        }
        if name != INDICES {
            if let Some(expected) = self.element_count() {
                if series.count() != expected {
                    return Err(Error::InconsistentColumnLengths {
                        column: name,
                        expected,
                        actual: series.count(),
                    });
                }
            }
        }
        self.columns.push((name, series));
        Ok(())
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Mutable column by name. Shape cannot change through a series, so
    /// the table invariants hold.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Series> {
        self.columns.iter_mut().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn positions(&self) -> Option<&Series> {
        self.column(POSITIONS)
    }

    pub fn indices(&self) -> Option<&Series> {
        self.column(INDICES)
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over (name, series) in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.columns.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Shared item count of the per-element columns, if any exist.
    pub fn element_count(&self) -> Option<usize> {
        self.columns
            .iter()
            .find(|(n, _)| n != INDICES)
            .map(|(_, s)| s.count())
    }

    /// Number of positions (0 without a positions column).
    pub fn vertex_count(&self) -> usize {
        self.positions().map(Series::count).unwrap_or(0)
    }

    /// Number of index items, i.e. faces (0 without an indices column).
    pub fn face_count(&self) -> usize {
        self.indices().map(Series::count).unwrap_or(0)
    }

    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut UserData {
        &mut self.user_data
    }

    /// Object name from user data.
    pub fn name(&self) -> Option<&str> {
        self.user_data.name()
    }

    /// Consume the table, returning its columns.
    pub fn into_columns(self) -> Vec<(String, Series)> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Allocation;

    fn floats(values: Vec<f32>, item_size: usize) -> Series {
        Series::from_vec(values, item_size, Allocation::Local).unwrap()
    }

    #[test]
    fn test_create() {
        let table = Table::new(
            [
                (POSITIONS, floats(vec![0.0; 9], 3)),
                (INDICES, Series::from_vec(vec![0u16, 1, 2], 3, Allocation::Local).unwrap()),
            ],
            UserData::new(),
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.vertex_count(), 3);
        assert_eq!(table.face_count(), 1);
        assert_eq!(table.names().collect::<Vec<_>>(), vec![POSITIONS, INDICES]);
    }

    #[test]
    fn test_inconsistent_lengths() {
        let err = Table::new(
            [("positions", floats(vec![0.0; 9], 3)), ("a", floats(vec![0.0; 2], 1))],
            UserData::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentColumnLengths { ref column, expected: 3, actual: 2 } if column == "a"
        ));
    }

    #[test]
    fn test_append() {
        let table = Table::new([(POSITIONS, floats(vec![0.0; 6], 3))], UserData::new()).unwrap();
        let table = table
            .append([("a", floats(vec![1.0, 2.0], 1)), ("b", floats(vec![0.0; 6], 3))])
            .unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec![POSITIONS, "a", "b"]);
        assert_eq!(table.column("a").unwrap().count(), 2);
        assert_eq!(table.element_count(), Some(2));
    }

    #[test]
    fn test_duplicate_column() {
        let table = Table::new([(POSITIONS, floats(vec![0.0; 3], 3))], UserData::new()).unwrap();
        let err = table.append([(POSITIONS, floats(vec![0.0; 3], 3))]).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn(ref n) if n == POSITIONS));
    }

    #[test]
    fn test_indices_exempt() {
        let mut table = Table::default();
        table
            .insert(INDICES, Series::from_vec(vec![0u32; 12], 3, Allocation::Local).unwrap())
            .unwrap();
        table.insert(POSITIONS, floats(vec![0.0; 6], 3)).unwrap();
        assert_eq!(table.element_count(), Some(2));
        assert_eq!(table.face_count(), 4);
    }

    #[test]
    fn test_column_mut() {
        let mut table = Table::new([("a", floats(vec![1.0, 2.0], 1))], UserData::new()).unwrap();
        table.column_mut("a").unwrap().set_item_at(0, 5.0).unwrap();
        assert_eq!(table.column("a").unwrap().to_f64_vec(), vec![5.0, 2.0]);
        assert!(table.column_mut("missing").is_none());
    }
}
