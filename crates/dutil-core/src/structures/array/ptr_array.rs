//! Array of opaque references with identity-based set operations
//!
//! Slots are optional: growing the array with `set_size` creates empty slots
//! that callers fill later. Lookups and set operations skip empty slots and
//! compare present references by [`Identity`], never by value.

use super::DynArray;
use crate::types::{Error, Identity, Result};

/// Growable array of optional references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrArray<P> {
    slots: DynArray<Option<P>>,
}

impl<P> Default for PtrArray<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PtrArray<P> {
    /// Create an empty array
    pub fn new() -> Self {
        Self { slots: DynArray::new() }
    }

    /// Create an array of `len` empty slots
    pub fn with_size(len: usize) -> Result<Self> {
        Ok(Self {
            slots: DynArray::with_size(len)?,
        })
    }

    /// Number of slots, empty ones included
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when there are no slots
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reference stored at `index`, `None` for an empty slot
    #[inline]
    pub fn get(&self, index: usize) -> Result<Option<&P>> {
        Ok(self.slots.get(index)?.as_ref())
    }

    /// Store `value` at `index`, returning the previous slot content
    pub fn set(&mut self, index: usize, value: Option<P>) -> Result<Option<P>> {
        self.slots.set(index, value)
    }

    /// Resize; growth appends empty slots, shrinking drops tail references
    pub fn set_size(&mut self, len: usize) -> Result<()> {
        self.slots.set_size(len)
    }

    /// Slots in order
    pub fn iter(&self) -> impl Iterator<Item = Option<&P>> + '_ {
        self.slots.iter().map(Option::as_ref)
    }

    /// Present references in order
    pub fn present(&self) -> impl Iterator<Item = &P> + '_ {
        self.slots.iter().flatten()
    }

    /// Insert a reference at `index`
    pub fn insert_element(&mut self, index: usize, value: P) -> Result<()> {
        self.slots.insert_element(index, Some(value))
    }

    /// Append a reference
    pub fn append_element(&mut self, value: P) -> Result<()> {
        self.slots.append_element(Some(value))
    }

    /// Prepend a reference
    pub fn prepend_element(&mut self, value: P) -> Result<()> {
        self.slots.prepend_element(Some(value))
    }

    /// Remove the slot at `index`, preserving order; O(n)
    pub fn remove_index(&mut self, index: usize) -> Result<Option<P>> {
        self.slots.remove_index(index)
    }

    /// Remove the slot at `index` by swapping in the last slot; O(1), order NOT preserved
    pub fn remove_index_fast(&mut self, index: usize) -> Result<Option<P>> {
        self.slots.remove_index_fast(index)
    }

    /// Drop every slot without touching referenced data
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Hand every contained reference to `destroy`, leaving the array empty
    pub fn destroy_contained(&mut self, mut destroy: impl FnMut(P)) {
        let slots = std::mem::take(&mut self.slots).into_vec();
        for value in slots.into_iter().flatten() {
            destroy(value);
        }
    }
}

impl<P: Clone> PtrArray<P> {
    /// Insert copies of `values` at `index`
    pub fn insert_elements(&mut self, index: usize, values: &[P]) -> Result<()> {
        let wrapped = Self::wrap(values)?;
        self.slots.insert_elements(index, &wrapped)
    }

    /// Append copies of `values`
    pub fn append_elements(&mut self, values: &[P]) -> Result<()> {
        let len = self.len();
        self.insert_elements(len, values)
    }

    /// Prepend copies of `values`
    pub fn prepend_elements(&mut self, values: &[P]) -> Result<()> {
        self.insert_elements(0, values)
    }

    /// Append every slot of `other`, empty slots included
    pub fn append_array(&mut self, other: &PtrArray<P>) -> Result<()> {
        self.slots.append_elements(other.slots.as_slice())
    }

    fn wrap(values: &[P]) -> Result<Vec<Option<P>>> {
        let mut wrapped = Vec::new();
        wrapped.try_reserve_exact(values.len())?;
        wrapped.extend(values.iter().cloned().map(Some));
        Ok(wrapped)
    }
}

impl<P: Identity> PtrArray<P> {
    /// Index of the first slot referencing the same object as `value`
    pub fn check_presence(&self, value: &P) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|p| p.same_ref(value)))
    }

    /// Remove the first reference to `value`, preserving order
    pub fn remove_element(&mut self, value: &P) -> Result<P> {
        let index = self.check_presence(value).ok_or(Error::NotFound)?;
        self.slots.remove_index(index)?.ok_or(Error::NotFound)
    }

    /// Remove the first reference to `value` by swapping in the last slot
    pub fn remove_element_fast(&mut self, value: &P) -> Result<P> {
        let index = self.check_presence(value).ok_or(Error::NotFound)?;
        self.slots.remove_index_fast(index)?.ok_or(Error::NotFound)
    }
}

impl<P: Identity + Clone> PtrArray<P> {
    /// Set union by identity: `a`'s distinct references, then `b`'s new ones
    pub fn merge(a: &PtrArray<P>, b: &PtrArray<P>) -> Result<PtrArray<P>> {
        let mut out = PtrArray::new();
        for value in a.present().chain(b.present()) {
            if out.check_presence(value).is_none() {
                out.append_element(value.clone())?;
            }
        }
        Ok(out)
    }

    /// Cartesian product: one `(a_i, b_j)` pair per ordered pair, row-major.
    ///
    /// O(n·m) in time and space; empty slots contribute no pairs.
    pub fn multiply(a: &PtrArray<P>, b: &PtrArray<P>) -> Result<PtrArray<(P, P)>> {
        let (n, m) = (a.present().count(), b.present().count());
        let total = n
            .checked_mul(m)
            .ok_or_else(|| Error::illegal_size("product size overflows"))?;
        let mut out = PtrArray::new();
        out.slots.reserve(total)?;
        for x in a.present() {
            for y in b.present() {
                out.append_element((x.clone(), y.clone()))?;
            }
        }
        Ok(out)
    }
}

impl<P: Clone> PtrArray<PtrArray<P>> {
    /// Combinatorial expansion: for every ordered pair of inner arrays
    /// `(a_i, b_j)`, one array holding `a_i`'s slots followed by `b_j`'s.
    pub fn multiply_concat(a: &Self, b: &Self) -> Result<Self> {
        let mut out = PtrArray::new();
        for x in a.present() {
            for y in b.present() {
                let mut joined = PtrArray::new();
                joined.slots.reserve(x.len() + y.len())?;
                joined.append_array(x)?;
                joined.append_array(y)?;
                out.append_element(joined)?;
            }
        }
        Ok(out)
    }
}
