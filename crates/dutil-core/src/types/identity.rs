//! Reference identity for opaque references
//!
//! Pointer arrays and lists store references they do not own. Equality and
//! the default list order are defined by *which* object is referenced, not by
//! its contents, so two distinct `Arc`s holding equal values are different
//! elements.

use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::Arc;

/// Address-like identity of an opaque reference.
pub trait Identity {
    /// Identity value; equal for references to the same object.
    fn identity(&self) -> usize;

    /// Whether both references designate the same object.
    #[inline]
    fn same_ref(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }

    /// Total order over references; `Equal` exactly when [`same_ref`] holds.
    ///
    /// [`same_ref`]: Identity::same_ref
    #[inline]
    fn compare_ref(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl<T: ?Sized> Identity for Arc<T> {
    #[inline]
    fn identity(&self) -> usize {
        Arc::as_ptr(self).cast::<()>() as usize
    }
}

impl<T: ?Sized> Identity for Rc<T> {
    #[inline]
    fn identity(&self) -> usize {
        Rc::as_ptr(self).cast::<()>() as usize
    }
}

impl<T: ?Sized> Identity for Box<T> {
    #[inline]
    fn identity(&self) -> usize {
        (&**self as *const T).cast::<()>() as usize
    }
}

impl<T: ?Sized> Identity for &T {
    #[inline]
    fn identity(&self) -> usize {
        (*self as *const T).cast::<()>() as usize
    }
}

macro_rules! integer_identity {
    ($($t:ty),*) => {
        $(
            impl Identity for $t {
                #[inline]
                fn identity(&self) -> usize { *self as usize }
            }
        )*
    };
}

// Integer handles stand in for references (slot numbers, external ids).
integer_identity!(usize, u32, u64);

impl<A: Identity, B: Identity> Identity for (A, B) {
    #[inline]
    fn identity(&self) -> usize {
        self.0.identity().rotate_left(17) ^ self.1.identity()
    }

    #[inline]
    fn same_ref(&self, other: &Self) -> bool {
        self.0.same_ref(&other.0) && self.1.same_ref(&other.1)
    }

    // identity() folds both halves and can collide; order lexicographically
    #[inline]
    fn compare_ref(&self, other: &Self) -> Ordering {
        self.0
            .compare_ref(&other.0)
            .then_with(|| self.1.compare_ref(&other.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_compare_by_address_not_value() {
        let a = Arc::new(5);
        let b = Arc::new(5);
        let a2 = Arc::clone(&a);
        assert!(a.same_ref(&a2));
        assert!(!a.same_ref(&b));
    }

    #[test]
    fn pair_identity_is_component_wise() {
        let p = (1usize, 2usize);
        assert!(p.same_ref(&(1, 2)));
        assert!(!p.same_ref(&(2, 1)));
    }

    #[test]
    fn pair_order_separates_folded_identities() {
        let a = (1usize, 0usize);
        let b = (0usize, 1usize << 17);
        assert_eq!(a.identity(), b.identity());
        assert!(!a.same_ref(&b));
        assert_eq!(a.compare_ref(&b), Ordering::Greater);
        assert_eq!(a.compare_ref(&(1, 0)), Ordering::Equal);
    }
}
