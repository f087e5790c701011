//! Growable array with all-or-nothing growth

use std::mem::size_of;

use crate::types::{Error, Result};

/// Contiguous growable sequence of fixed-size elements.
///
/// Every growing operation reserves capacity before any element moves, so an
/// out-of-memory failure leaves the array exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynArray<T> {
    items: Vec<T>,
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DynArray<T> {
    /// Create an empty array
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the array holds no element
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reserved capacity in elements; may be nonzero for an empty array
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Reserve room for `additional` more elements, or fail without change
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        let total = self
            .items
            .len()
            .checked_add(additional)
            .ok_or_else(|| Error::illegal_size("element count overflows"))?;
        if size_of::<T>() != 0 && total > isize::MAX as usize / size_of::<T>() {
            return Err(Error::illegal_size(format!(
                "{} elements of {} bytes exceed the addressable size",
                total,
                size_of::<T>()
            )));
        }
        self.items.try_reserve(additional)?;
        Ok(())
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(Error::IllegalIndex {
                index,
                len: self.items.len(),
            })
        }
    }

    #[inline]
    fn check_insert_index(&self, index: usize) -> Result<()> {
        if index <= self.items.len() {
            Ok(())
        } else {
            Err(Error::IllegalIndex {
                index,
                len: self.items.len(),
            })
        }
    }

    /// Element at `index`
    #[inline]
    pub fn get(&self, index: usize) -> Result<&T> {
        self.check_index(index)?;
        Ok(&self.items[index])
    }

    /// Mutable element at `index`
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        Ok(&mut self.items[index])
    }

    /// Replace the element at `index`, returning the old one
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    /// Elements as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Elements as a mutable slice
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Iterate over the elements in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Insert one element at `index` (`index == len` appends)
    pub fn insert_element(&mut self, index: usize, value: T) -> Result<()> {
        self.check_insert_index(index)?;
        self.reserve(1)?;
        self.items.insert(index, value);
        Ok(())
    }

    /// Append one element
    pub fn append_element(&mut self, value: T) -> Result<()> {
        self.reserve(1)?;
        self.items.push(value);
        Ok(())
    }

    /// Prepend one element
    pub fn prepend_element(&mut self, value: T) -> Result<()> {
        self.insert_element(0, value)
    }

    /// Remove the element at `index`, shifting the tail left.
    ///
    /// Preserves order; O(n).
    pub fn remove_index(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    /// Remove the element at `index` by moving the last element into its place.
    ///
    /// O(1), but does NOT preserve order.
    pub fn remove_index_fast(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.items.swap_remove(index))
    }

    /// Drop every element; capacity is kept
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Truncate to `len` elements; no effect when already shorter
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Consume the array into its vector
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Default> DynArray<T> {
    /// Create an array of `len` default elements
    pub fn with_size(len: usize) -> Result<Self> {
        let mut array = Self::new();
        array.set_size(len)?;
        Ok(array)
    }

    /// Resize to `len`: growth appends default elements, shrinking truncates the tail
    pub fn set_size(&mut self, len: usize) -> Result<()> {
        if len > self.items.len() {
            self.reserve(len - self.items.len())?;
            self.items.resize_with(len, T::default);
        } else {
            self.items.truncate(len);
        }
        Ok(())
    }
}

impl<T: Clone> DynArray<T> {
    /// Build an array holding copies of `data`
    pub fn try_from_slice(data: &[T]) -> Result<Self> {
        let mut array = Self::new();
        array.append_elements(data)?;
        Ok(array)
    }

    /// Copy the array, reporting allocation failure instead of aborting
    pub fn try_clone(&self) -> Result<Self> {
        Self::try_from_slice(&self.items)
    }

    /// Insert copies of `data` at `index`, shifting the tail right
    pub fn insert_elements(&mut self, index: usize, data: &[T]) -> Result<()> {
        self.check_insert_index(index)?;
        self.reserve(data.len())?;
        self.items.splice(index..index, data.iter().cloned());
        Ok(())
    }

    /// Append copies of `data`
    pub fn append_elements(&mut self, data: &[T]) -> Result<()> {
        self.reserve(data.len())?;
        self.items.extend_from_slice(data);
        Ok(())
    }

    /// Prepend copies of `data`
    pub fn prepend_elements(&mut self, data: &[T]) -> Result<()> {
        self.insert_elements(0, data)
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for DynArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}
