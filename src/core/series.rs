//! Series - fixed item-size views over typed buffers.

use crate::core::{Allocation, NumericPod, TypedBuffer, UserData};
use crate::util::{BufferShape, ElementKind, Error, Result};
use smallvec::SmallVec;

/// Default spatial dimension of a series.
pub const DEFAULT_DIMENSION: usize = 3;

/// Value of one item of a series: a scalar for item size 1, a small
/// vector otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Scalar(f64),
    Vector(SmallVec<[f64; 4]>),
}

impl Item {
    /// Number of components.
    #[inline]
    pub fn width(&self) -> usize {
        self.as_slice().len()
    }

    /// Components as a slice (a scalar is a slice of one).
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(v) => std::slice::from_ref(v),
            Self::Vector(v) => v,
        }
    }

    /// The scalar value, if this item has exactly one component.
    pub fn scalar(&self) -> Option<f64> {
        match self.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    /// Components as a vector.
    pub fn to_vec(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }

    fn from_components(values: &[f64]) -> Self {
        match values {
            [v] => Self::Scalar(*v),
            _ => Self::Vector(SmallVec::from_slice(values)),
        }
    }
}

impl From<f64> for Item {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl<const N: usize> From<[f64; N]> for Item {
    fn from(v: [f64; N]) -> Self {
        Self::Vector(SmallVec::from_slice(&v))
    }
}

impl From<&[f64]> for Item {
    fn from(v: &[f64]) -> Self {
        Self::Vector(SmallVec::from_slice(v))
    }
}

impl From<Vec<f64>> for Item {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(SmallVec::from_vec(v))
    }
}

impl FromIterator<f64> for Item {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::Vector(iter.into_iter().collect())
    }
}

/// A [`TypedBuffer`] viewed as `count` items of `item_size` components.
///
/// Item `i` covers buffer elements `[i * item_size, (i + 1) * item_size)`.
/// Shape is fixed at creation; values can be changed one item at a time.
#[derive(Clone, Debug)]
pub struct Series {
    buffer: TypedBuffer,
    item_size: usize,
    dimension: usize,
    user_data: UserData,
}

/// Builder for [`Series`].
#[derive(Debug, Default)]
pub struct SeriesBuilder {
    buffer: Option<TypedBuffer>,
    item_size: usize,
    dimension: Option<usize>,
    user_data: UserData,
}

impl SeriesBuilder {
    pub fn buffer(mut self, buffer: TypedBuffer) -> Self {
        self.buffer = Some(buffer);
        self
    }

    pub fn item_size(mut self, item_size: usize) -> Self {
        self.item_size = item_size;
        self
    }

    /// Spatial dimension (informational, defaults to 3).
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn user_data(mut self, user_data: UserData) -> Self {
        self.user_data = user_data;
        self
    }

    /// Validate the shape and build the series.
    pub fn build(self) -> Result<Series> {
        if self.item_size == 0 {
            return Err(BufferShape::InvalidItemSize(self.item_size).into());
        }
        let buffer = self.buffer.ok_or(BufferShape::MissingBuffer)?;
        let len = buffer.len();
        if len % self.item_size != 0 {
            return Err(BufferShape::InvalidShape {
                len,
                item_size: self.item_size,
            }
            .into());
        }
        Ok(Series {
            buffer,
            item_size: self.item_size,
            dimension: self.dimension.unwrap_or(DEFAULT_DIMENSION),
            user_data: self.user_data,
        })
    }
}

impl Series {
    /// Start building a series.
    pub fn builder() -> SeriesBuilder {
        SeriesBuilder::default()
    }

    /// View `buffer` as items of `item_size` components.
    pub fn new(buffer: TypedBuffer, item_size: usize) -> Result<Self> {
        Self::builder().buffer(buffer).item_size(item_size).build()
    }

    /// Build a series directly from typed values.
    pub fn from_vec<T: NumericPod>(values: Vec<T>, item_size: usize, allocation: Allocation) -> Result<Self> {
        Self::new(TypedBuffer::from_vec(values, allocation), item_size)
    }

    /// Underlying buffer.
    #[inline]
    pub fn buffer(&self) -> &TypedBuffer {
        &self.buffer
    }

    /// Consume the series, returning its buffer.
    pub fn into_buffer(self) -> TypedBuffer {
        self.buffer
    }

    /// Components per item.
    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Spatial dimension the series lives in.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of scalar values (`count * item_size`).
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.buffer.len() / self.item_size
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.buffer.kind()
    }

    #[inline]
    pub fn is_shared(&self) -> bool {
        self.buffer.is_shared()
    }

    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut UserData {
        &mut self.user_data
    }

    /// Typed zero-copy read of the flat values.
    pub fn read<T: NumericPod>(&self) -> Result<crate::core::BufferRef<'_, T>> {
        self.buffer.read()
    }

    /// Typed write access to the flat values.
    pub fn write<T: NumericPod>(&mut self) -> Result<crate::core::BufferMut<'_, T>> {
        self.buffer.write()
    }

    /// Item `i`. Fails with [`Error::IndexOutOfRange`] past the end.
    pub fn item_at(&self, i: usize) -> Result<Item> {
        let count = self.count();
        if i >= count {
            return Err(Error::out_of_range(i, count));
        }
        let mut values: SmallVec<[f64; 4]> = SmallVec::from_elem(0.0, self.item_size);
        self.buffer.read_f64_into(i * self.item_size, &mut values);
        Ok(Item::from_components(&values))
    }

    /// Overwrite item `i`. The value must have exactly `item_size` components.
    pub fn set_item_at(&mut self, i: usize, value: impl Into<Item>) -> Result<()> {
        let count = self.count();
        if i >= count {
            return Err(Error::out_of_range(i, count));
        }
        let value = value.into();
        if value.width() != self.item_size {
            return Err(Error::shape(self.item_size, value.width()));
        }
        self.buffer.write_f64_from(i * self.item_size, value.as_slice());
        Ok(())
    }

    /// Iterate over all items.
    pub fn iter(&self) -> impl Iterator<Item = Item> + '_ {
        let values = self.buffer.to_f64_vec();
        let item_size = self.item_size;
        (0..self.count()).map(move |i| Item::from_components(&values[i * item_size..(i + 1) * item_size]))
    }

    /// Call `f` with every item and its index.
    pub fn for_each(&self, mut f: impl FnMut(Item, usize)) {
        for (i, item) in self.iter().enumerate() {
            f(item, i);
        }
    }

    /// All values widened to f64.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.buffer.to_f64_vec()
    }

    /// Map every item to a new item of `item_size` components.
    ///
    /// The result has the same element kind and allocation as `self`.
    /// Fails with [`Error::ShapeMismatch`] as soon as `f` returns an item
    /// of a different width.
    pub fn map<F>(&self, item_size: usize, mut f: F) -> Result<Series>
    where
        F: FnMut(Item, usize) -> Item,
    {
        let mut out = self.similar(self.count(), item_size)?;
        let mut values = Vec::with_capacity(self.count() * item_size);
        for (i, item) in self.iter().enumerate() {
            let r = f(item, i);
            if r.width() != item_size {
                return Err(Error::shape(item_size, r.width()));
            }
            values.extend_from_slice(r.as_slice());
        }
        out.buffer.write_f64_from(0, &values);
        Ok(out)
    }

    /// Zero-filled series of the same kind, allocation, dimension and user
    /// data, holding `count` items of `item_size`. Values are not copied.
    pub fn similar(&self, count: usize, item_size: usize) -> Result<Series> {
        Series::builder()
            .buffer(self.buffer.similar(count * item_size))
            .item_size(item_size)
            .dimension(self.dimension)
            .user_data(self.user_data.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Series {
        Series::from_vec(vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 3, Allocation::Local).unwrap()
    }

    #[test]
    fn test_create() {
        let s = triangle();
        assert_eq!(s.count(), 3);
        assert_eq!(s.len(), 9);
        assert_eq!(s.item_size(), 3);
        assert_eq!(s.dimension(), DEFAULT_DIMENSION);
        assert_eq!(s.kind(), ElementKind::Float32);
    }

    #[test]
    fn test_create_errors() {
        let err = Series::from_vec(vec![1u8; 5], 3, Allocation::Local).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedBuffer(BufferShape::InvalidShape { len: 5, item_size: 3 })
        ));

        let err = Series::from_vec(vec![1u8; 6], 0, Allocation::Local).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(BufferShape::InvalidItemSize(0))));

        let err = Series::builder().item_size(3).build().unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(BufferShape::MissingBuffer)));
    }

    #[test]
    fn test_item_at() {
        let s = triangle();
        assert_eq!(s.item_at(1).unwrap().to_vec(), vec![1.0, 0.0, 0.0]);
        assert!(matches!(s.item_at(3), Err(Error::IndexOutOfRange { index: 3, count: 3 })));

        let scalars = Series::from_vec(vec![4u32, 5, 6], 1, Allocation::Local).unwrap();
        assert_eq!(scalars.item_at(2).unwrap(), Item::Scalar(6.0));
        assert_eq!(scalars.item_at(0).unwrap().scalar(), Some(4.0));
    }

    #[test]
    fn test_set_item_at() {
        let mut s = triangle();
        s.set_item_at(2, [5.0, 6.0, 7.0]).unwrap();
        assert_eq!(s.item_at(2).unwrap().to_vec(), vec![5.0, 6.0, 7.0]);

        assert!(matches!(
            s.set_item_at(0, [1.0, 2.0]),
            Err(Error::ShapeMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            s.set_item_at(3, [1.0, 2.0, 3.0]),
            Err(Error::IndexOutOfRange { index: 3, count: 3 })
        ));

        let mut scalars = Series::from_vec(vec![0i16; 2], 1, Allocation::Local).unwrap();
        scalars.set_item_at(1, -4.0).unwrap();
        assert_eq!(scalars.read::<i16>().unwrap()[1], -4);
    }

    #[test]
    fn test_iter() {
        let s = triangle();
        let items: Vec<Item> = s.iter().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].as_slice(), &[0.0, 1.0, 0.0]);

        let mut seen = 0;
        s.for_each(|item, i| {
            assert_eq!(item, s.item_at(i).unwrap());
            seen += 1;
        });
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_map_declared_size() {
        let s = triangle();
        let norms = s
            .map(1, |item, _| {
                let v = item.as_slice();
                Item::Scalar((v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
            })
            .unwrap();
        assert_eq!(norms.item_size(), 1);
        assert_eq!(norms.count(), 3);
        assert_eq!(norms.kind(), ElementKind::Float32);
        assert_eq!(norms.to_f64_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_map_rejects_wrong_width() {
        let s = triangle();
        let err = s
            .map(2, |item, i| if i == 1 { item } else { Item::from([0.0, 0.0]) })
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_similar() {
        let mut s = Series::from_vec(vec![1u16, 2, 3, 4, 5, 6], 3, Allocation::Shared).unwrap();
        s.user_data_mut().set("unit", "m");
        let t = s.similar(4, 2).unwrap();
        assert_eq!(t.count(), 4);
        assert_eq!(t.item_size(), 2);
        assert_eq!(t.kind(), ElementKind::Uint16);
        assert!(t.is_shared());
        assert!(!t.buffer().shares_memory_with(s.buffer()));
        assert_eq!(t.to_f64_vec(), vec![0.0; 8]);
        assert_eq!(t.user_data().get_str("unit"), Some("m"));
    }
}
