//! Doubly linked list with a stateful cursor and an optional total order
//!
//! Nodes live in a generational arena and link to each other by index. The
//! list keeps one cursor ("current position"): it is `None` exactly when the
//! list is empty and every successful read, insert or remove repositions it.
//! Failed operations leave it where it was.
//!
//! Keyed lookup and removal compare with the list's comparator, not by
//! identity. Lists created with [`List::new`] order elements by
//! [`Identity`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::structures::arena::{Arena, Index};
use crate::types::{Error, Identity, Result};

#[cfg(test)]
mod tests;

/// Shared comparator defining a total order over list elements
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

enum Order<T> {
    Plain(fn(&T, &T) -> Ordering),
    Custom(Comparator<T>),
}

impl<T> Order<T> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        match self {
            Order::Plain(f) => f(a, b),
            Order::Custom(f) => f(a, b),
        }
    }
}

fn identity_order<T: Identity>(a: &T, b: &T) -> Ordering {
    a.compare_ref(b)
}

struct Node<T> {
    value: T,
    prev: Option<Index>,
    next: Option<Index>,
}

/// Doubly linked list with cursor
pub struct List<T> {
    nodes: Arena<Node<T>>,
    head: Option<Index>,
    tail: Option<Index>,
    cursor: Option<Index>,
    order: Order<T>,
}

impl<T: Identity> List<T> {
    /// Create an empty list ordered by reference identity
    pub fn new() -> Self {
        Self::with_order(Order::Plain(identity_order::<T>))
    }
}

impl<T: Identity> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> List<T> {
    fn with_order(order: Order<T>) -> Self {
        Self {
            nodes: Arena::new(),
            head: None,
            tail: None,
            cursor: None,
            order,
        }
    }

    /// Create an empty list ordered by `cmp`
    pub fn with_comparator<F>(cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::with_order(Order::Custom(Arc::new(cmp)))
    }

    /// Replace the comparator; existing elements are not reordered
    pub fn set_comparator(&mut self, cmp: Comparator<T>) {
        self.order = Order::Custom(cmp);
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the list holds no element
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    fn node(&self, index: Index) -> &Node<T> {
        // Links only ever point at live nodes
        match self.nodes.get(index) {
            Some(node) => node,
            None => unreachable!("dangling list link"),
        }
    }

    #[inline]
    fn node_mut(&mut self, index: Index) -> &mut Node<T> {
        match self.nodes.get_mut(index) {
            Some(node) => node,
            None => unreachable!("dangling list link"),
        }
    }

    fn move_to(&mut self, index: Index) -> &T {
        self.cursor = Some(index);
        &self.node(index).value
    }

    /// Element under the cursor
    pub fn current(&self) -> Result<&T> {
        let cursor = self.cursor.ok_or(Error::EmptyList)?;
        Ok(&self.node(cursor).value)
    }

    /// Mutable element under the cursor
    pub fn current_mut(&mut self) -> Result<&mut T> {
        let cursor = self.cursor.ok_or(Error::EmptyList)?;
        Ok(&mut self.node_mut(cursor).value)
    }

    /// Move the cursor to the first element and return it
    pub fn first(&mut self) -> Result<&T> {
        let head = self.head.ok_or(Error::EmptyList)?;
        Ok(self.move_to(head))
    }

    /// Move the cursor to the last element and return it
    pub fn last(&mut self) -> Result<&T> {
        let tail = self.tail.ok_or(Error::EmptyList)?;
        Ok(self.move_to(tail))
    }

    /// Advance the cursor; `NoNext` at the tail
    pub fn next(&mut self) -> Result<&T> {
        let cursor = self.cursor.ok_or(Error::EmptyList)?;
        let next = self.node(cursor).next.ok_or(Error::NoNext)?;
        Ok(self.move_to(next))
    }

    /// Step the cursor back; `NoPrev` at the head
    pub fn prev(&mut self) -> Result<&T> {
        let cursor = self.cursor.ok_or(Error::EmptyList)?;
        let prev = self.node(cursor).prev.ok_or(Error::NoPrev)?;
        Ok(self.move_to(prev))
    }

    /// Link a new node between `prev` and `next`
    fn link(&mut self, value: T, prev: Option<Index>, next: Option<Index>) -> Result<Index> {
        let index = self.nodes.insert(Node { value, prev, next })?;
        match prev {
            Some(p) => self.node_mut(p).next = Some(index),
            None => self.head = Some(index),
        }
        match next {
            Some(n) => self.node_mut(n).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.cursor = Some(index);
        Ok(index)
    }

    /// Insert at the head; the cursor moves to the new element
    pub fn prepend(&mut self, value: T) -> Result<()> {
        let head = self.head;
        self.link(value, None, head).map(|_| ())
    }

    /// Insert at the tail; the cursor moves to the new element
    pub fn append(&mut self, value: T) -> Result<()> {
        let tail = self.tail;
        self.link(value, tail, None).map(|_| ())
    }

    /// Ordered insertion after the last element comparing equal to `value`
    pub fn insert(&mut self, value: T) -> Result<()> {
        let mut at = self.head;
        while let Some(index) = at {
            let node = self.node(index);
            if self.order.compare(&node.value, &value) == Ordering::Greater {
                break;
            }
            at = node.next;
        }
        let prev = match at {
            Some(index) => self.node(index).prev,
            None => self.tail,
        };
        self.link(value, prev, at).map(|_| ())
    }

    fn find(&self, key: &T) -> Result<Index> {
        if self.is_empty() {
            return Err(Error::EmptyList);
        }
        let mut at = self.head;
        while let Some(index) = at {
            let node = self.node(index);
            if self.order.compare(&node.value, key) == Ordering::Equal {
                return Ok(index);
            }
            at = node.next;
        }
        Err(Error::NotFound)
    }

    fn unlink(&mut self, index: Index) -> T {
        let (prev, next) = {
            let node = self.node(index);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let node = match self.nodes.remove(index) {
            Some(node) => node,
            None => unreachable!("dangling list link"),
        };
        // Successor, or the first element when the removed one was last
        self.cursor = next.or(self.head);
        node.value
    }

    /// Remove the first element comparing equal to `key`
    pub fn remove(&mut self, key: &T) -> Result<T> {
        let index = self.find(key)?;
        Ok(self.unlink(index))
    }

    /// Find the first element comparing equal to `key`; the cursor moves to it
    pub fn retrieve(&mut self, key: &T) -> Result<&T> {
        let index = self.find(key)?;
        Ok(self.move_to(index))
    }

    /// Mutable variant of [`List::retrieve`]
    pub fn retrieve_mut(&mut self, key: &T) -> Result<&mut T> {
        let index = self.find(key)?;
        self.cursor = Some(index);
        Ok(&mut self.node_mut(index).value)
    }

    /// Element at position `position` counted from the head; O(position)
    pub fn retrieve_indexed(&mut self, position: usize) -> Result<&T> {
        if position >= self.len() {
            return Err(Error::IllegalIndex {
                index: position,
                len: self.len(),
            });
        }
        let mut at = self.head;
        for _ in 0..position {
            at = at.and_then(|i| self.node(i).next);
        }
        let index = at.ok_or(Error::IllegalIndex {
            index: position,
            len: self.len(),
        })?;
        Ok(self.move_to(index))
    }

    /// Apply `visitor` to every element head to tail with a shared context.
    ///
    /// Always visits the whole list and leaves the cursor alone.
    pub fn iterate<C>(&self, ctx: &mut C, mut visitor: impl FnMut(&T, &mut C)) {
        for value in self.iter() {
            visitor(value, ctx);
        }
    }

    /// Independent double-ended iterator; does not touch the cursor
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Remove every element; node memory is kept
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.cursor = None;
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over a list, independent of its cursor
pub struct Iter<'a, T> {
    list: &'a List<T>,
    front: Option<Index>,
    back: Option<Index>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
