//! Per-vertex attribute layout and value accumulation.
//!
//! `PROPERTIES` declares names, `ESIZES` optionally declares component
//! counts, and the first vertex of an object freezes the layout. Values
//! are gathered column by column (one flat column per scalar component)
//! and interleaved into one row-major buffer per attribute on output.

/// Declared attributes of the current object and their raw values.
#[derive(Debug, Default)]
pub(crate) struct AttributeLayout {
    names: Vec<String>,
    sizes: Vec<usize>,
    columns: Vec<Vec<f32>>,
    established: bool,
}

impl AttributeLayout {
    /// Forget everything: names, sizes and values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Declare attribute names, replacing any previous declaration.
    pub fn declare<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.reset();
        self.names = names.into_iter().map(str::to_owned).collect();
    }

    /// Record explicit component counts. The caller checks the count
    /// against [`Self::num_attributes`].
    pub fn set_sizes(&mut self, sizes: Vec<usize>) {
        self.sizes = sizes;
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_attributes(&self) -> usize {
        self.names.len()
    }

    /// True once the first vertex fixed the layout.
    #[inline]
    pub fn is_established(&self) -> bool {
        self.established
    }

    /// Fix the layout: default undeclared sizes to 1 and allocate one flat
    /// column per component. The caller checks [`Self::flat_width`]
    /// against the first vertex before calling this.
    pub fn establish(&mut self) {
        if self.sizes.is_empty() {
            self.sizes = vec![1; self.names.len()];
        }
        self.columns = vec![Vec::new(); self.flat_width()];
        self.established = true;
    }

    /// Total number of scalar components per vertex, including the
    /// default of one per attribute before the layout is established.
    pub fn flat_width(&self) -> usize {
        if self.sizes.is_empty() {
            self.names.len()
        } else {
            self.sizes.iter().fold(0usize, |acc, &s| acc.saturating_add(s))
        }
    }

    /// Append one vertex worth of values, one per flat column.
    pub fn push_row(&mut self, values: impl IntoIterator<Item = f32>) {
        for (column, v) in self.columns.iter_mut().zip(values) {
            column.push(v);
        }
    }

    /// Empty the value columns, keeping the layout.
    pub fn clear_values(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
    }

    /// Interleave the accumulated values into one row-major buffer per
    /// attribute: `(name, item_size, values)` in declaration order. Empties
    /// the value columns.
    /// Nothing is returned before the layout is established.
    pub fn take_attributes(&mut self) -> Vec<(String, usize, Vec<f32>)> {
        if !self.established {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.names.len());
        let mut first: usize = 0;
        for (name, &size) in self.names.iter().zip(&self.sizes) {
            let end = first.saturating_add(size);
            let Some(components) = self.columns.get(first..end) else {
                break;
            };
            out.push((name.clone(), size, interleave(components)));
            first = end;
        }
        self.clear_values();
        out
    }
}

/// Column-major to row-major: for each row, one value per column.
fn interleave(columns: &[Vec<f32>]) -> Vec<f32> {
    let rows = columns.first().map(Vec::len).unwrap_or(0);
    let mut out = Vec::with_capacity(rows * columns.len());
    for row in 0..rows {
        out.extend(columns.iter().map(|c| c[row]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes() {
        let mut layout = AttributeLayout::default();
        layout.declare(["a", "b"]);
        assert!(!layout.is_established());
        layout.establish();
        assert!(layout.is_established());
        assert_eq!(layout.flat_width(), 2);
    }

    #[test]
    fn test_interleave() {
        let mut layout = AttributeLayout::default();
        layout.declare(["a", "b"]);
        layout.set_sizes(vec![1, 3]);
        layout.establish();
        assert_eq!(layout.flat_width(), 4);

        layout.push_row([1.0, 10.0, 11.0, 12.0]);
        layout.push_row([2.0, 20.0, 21.0, 22.0]);

        let attrs = layout.take_attributes();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0], ("a".to_string(), 1, vec![1.0, 2.0]));
        assert_eq!(attrs[1], ("b".to_string(), 3, vec![10.0, 11.0, 12.0, 20.0, 21.0, 22.0]));

        // layout kept, values emptied
        assert!(layout.is_established());
        let attrs = layout.take_attributes();
        assert!(attrs.iter().all(|(_, _, v)| v.is_empty()));
    }

    #[test]
    fn test_declare_resets() {
        let mut layout = AttributeLayout::default();
        layout.declare(["a"]);
        layout.set_sizes(vec![2]);
        layout.establish();
        layout.declare(["x", "y", "z"]);
        assert!(!layout.is_established());
        layout.establish();
        assert_eq!(layout.flat_width(), 3);
        assert_eq!(layout.names(), &["x", "y", "z"]);
    }

    #[test]
    fn test_take_before_establish() {
        let mut layout = AttributeLayout::default();
        layout.declare(["a", "b"]);
        assert_eq!(layout.flat_width(), 2);
        layout.set_sizes(vec![1, 3]);
        assert_eq!(layout.flat_width(), 4);
        assert!(layout.take_attributes().is_empty());
    }
}
