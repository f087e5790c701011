//! N-ary tree with ordered children
//!
//! Nodes live in an arena and link to their parent, siblings and first/last
//! child by index. A node created with [`Tree::new_node`] is a root; it
//! becomes part of another tree only when attached under a parent. Only roots
//! can be attached, so a node never has two parents and a subtree can never
//! be attached below itself.

use std::collections::VecDeque;
use std::ops::{BitOr, ControlFlow};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::structures::arena::{Arena, Index};
use crate::structures::graph::Traversal;
use crate::types::{Error, Identity, Result};


static NEXT_TREE_TAG: AtomicU32 = AtomicU32::new(1);

/// Handle to a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: u32,
    index: Index,
}

impl Identity for NodeId {
    #[inline]
    fn identity(&self) -> usize {
        ((u64::from(self.index.generation()) << 32) | self.index.slot() as u64) as usize
    }

    #[inline]
    fn same_ref(&self, other: &Self) -> bool {
        self == other
    }

    #[inline]
    fn compare_ref(&self, other: &Self) -> std::cmp::Ordering {
        let key = |id: &Self| (id.tree, id.index.slot(), id.index.generation());
        key(self).cmp(&key(other))
    }
}

/// Order in which [`Tree::traverse`] visits nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseOrder {
    /// First child subtree, then the node, then the remaining children
    InOrder,
    /// Node before its children
    PreOrder,
    /// Children before their node
    PostOrder,
    /// Breadth first, depth by depth
    LevelOrder,
}

/// Which nodes [`Tree::traverse`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraverseFlags(u8);

impl TraverseFlags {
    /// Nodes without children
    pub const LEAVES: TraverseFlags = TraverseFlags(1);
    /// Nodes with at least one child
    pub const NON_LEAVES: TraverseFlags = TraverseFlags(2);
    /// Every node
    pub const ALL: TraverseFlags = TraverseFlags(3);

    #[inline]
    fn admits(self, leaf: bool) -> bool {
        let bit = if leaf { Self::LEAVES.0 } else { Self::NON_LEAVES.0 };
        self.0 & bit != 0
    }
}

impl BitOr for TraverseFlags {
    type Output = TraverseFlags;

    fn bitor(self, rhs: TraverseFlags) -> TraverseFlags {
        TraverseFlags(self.0 | rhs.0)
    }
}

struct Node<T> {
    data: T,
    parent: Option<Index>,
    prev: Option<Index>,
    next: Option<Index>,
    first_child: Option<Index>,
    last_child: Option<Index>,
}

enum Step {
    Enter(Index, usize),
    Visit(Index),
}

/// Forest of N-ary trees sharing one node arena
pub struct Tree<T> {
    tag: u32,
    nodes: Arena<Node<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Create an empty forest
    pub fn new() -> Self {
        Self {
            tag: NEXT_TREE_TAG.fetch_add(1, Ordering::Relaxed),
            nodes: Arena::new(),
        }
    }

    /// Number of nodes across all trees
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node exists
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    fn id(&self, index: Index) -> NodeId {
        NodeId {
            tree: self.tag,
            index,
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node<T>> {
        if id.tree != self.tag {
            return Err(Error::InvalidHandle);
        }
        self.nodes.get(id.index).ok_or(Error::InvalidHandle)
    }

    #[inline]
    fn at(&self, index: Index) -> &Node<T> {
        // Links only ever point at live nodes
        match self.nodes.get(index) {
            Some(node) => node,
            None => unreachable!("dangling tree link"),
        }
    }

    #[inline]
    fn at_mut(&mut self, index: Index) -> &mut Node<T> {
        match self.nodes.get_mut(index) {
            Some(node) => node,
            None => unreachable!("dangling tree link"),
        }
    }

    /// Create a detached root node
    pub fn new_node(&mut self, data: T) -> Result<NodeId> {
        let index = self.nodes.insert(Node {
            data,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
        })?;
        Ok(self.id(index))
    }

    /// Payload of a node
    pub fn data(&self, id: NodeId) -> Result<&T> {
        Ok(&self.node(id)?.data)
    }

    /// Mutable payload of a node
    pub fn data_mut(&mut self, id: NodeId) -> Result<&mut T> {
        self.node(id)?;
        Ok(&mut self.at_mut(id.index).data)
    }

    /// Parent of a node, `None` for a root
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent.map(|i| self.id(i)))
    }

    /// First child of a node
    pub fn first_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.first_child.map(|i| self.id(i)))
    }

    /// Following sibling of a node
    pub fn next_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.next.map(|i| self.id(i)))
    }

    /// Preceding sibling of a node
    pub fn prev_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.prev.map(|i| self.id(i)))
    }

    /// True when the node has no parent
    pub fn is_root(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.parent.is_none())
    }

    /// True when the node has no children
    pub fn is_leaf(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.first_child.is_none())
    }

    /// Children of a node, first to last
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut at = self.node(id)?.first_child;
        while let Some(index) = at {
            out.try_reserve(1)?;
            out.push(self.id(index));
            at = self.at(index).next;
        }
        Ok(out)
    }

    /// Child at position `n` (0-based), `None` when `n` is past the last child
    pub fn nth_child(&self, id: NodeId, n: usize) -> Result<Option<NodeId>> {
        let mut at = self.node(id)?.first_child;
        for _ in 0..n {
            match at {
                Some(index) => at = self.at(index).next,
                None => return Ok(None),
            }
        }
        Ok(at.map(|i| self.id(i)))
    }

    /// Depth of a node; a root has depth 1
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        let mut depth = 1;
        let mut at = self.node(id)?.parent;
        while let Some(index) = at {
            depth += 1;
            at = self.at(index).parent;
        }
        Ok(depth)
    }

    /// Validate an attach of `node` under `parent`
    fn check_attach(&self, parent: NodeId, node: NodeId) -> Result<()> {
        self.node(parent)?;
        let child = self.node(node)?;
        if child.parent.is_some() {
            return Err(Error::illegal_argument("node is already attached to a parent"));
        }
        // node is a root: attaching is a cycle only if parent lies in its tree
        let mut at = Some(parent.index);
        while let Some(index) = at {
            if index == node.index {
                return Err(Error::illegal_argument("node cannot be attached below itself"));
            }
            at = self.at(index).parent;
        }
        Ok(())
    }

    /// Link `node` under `parent` right before `before` (or last)
    fn link(&mut self, parent: Index, before: Option<Index>, node: Index) {
        let prev = match before {
            Some(b) => self.at(b).prev,
            None => self.at(parent).last_child,
        };
        {
            let n = self.at_mut(node);
            n.parent = Some(parent);
            n.prev = prev;
            n.next = before;
        }
        match prev {
            Some(p) => self.at_mut(p).next = Some(node),
            None => self.at_mut(parent).first_child = Some(node),
        }
        match before {
            Some(b) => self.at_mut(b).prev = Some(node),
            None => self.at_mut(parent).last_child = Some(node),
        }
    }

    /// Attach a root `node` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId> {
        self.insert_before(parent, None, node)
    }

    /// Attach a root `node` as the first child of `parent`
    pub fn prepend(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId> {
        let first = self.first_child(parent)?;
        self.insert_before(parent, first, node)
    }

    /// Attach a root `node` at child position `position` of `parent`;
    /// `None` or a position past the end appends
    pub fn insert(&mut self, parent: NodeId, position: Option<usize>, node: NodeId) -> Result<NodeId> {
        let sibling = match position {
            Some(n) => self.nth_child(parent, n)?,
            None => None,
        };
        self.insert_before(parent, sibling, node)
    }

    /// Attach a root `node` under `parent` before `sibling`, or last when
    /// `sibling` is `None`. `sibling` must be a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, sibling: Option<NodeId>, node: NodeId) -> Result<NodeId> {
        self.check_attach(parent, node)?;
        if let Some(s) = sibling {
            if self.node(s)?.parent != Some(parent.index) {
                return Err(Error::illegal_argument("sibling is not a child of parent"));
            }
        }
        self.link(parent.index, sibling.map(|s| s.index), node.index);
        Ok(node)
    }

    /// Detach a node (with its subtree) from its parent; it becomes a root
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev, node.next)
        };
        let Some(parent) = parent else {
            return Ok(());
        };
        match prev {
            Some(p) => self.at_mut(p).next = next,
            None => self.at_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.at_mut(n).prev = prev,
            None => self.at_mut(parent).last_child = prev,
        }
        let node = self.at_mut(id.index);
        node.parent = None;
        node.prev = None;
        node.next = None;
        Ok(())
    }

    /// Detach and delete a node with its whole subtree; returns the number of
    /// nodes removed
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<usize> {
        self.detach(id)?;
        let mut pending = vec![id.index];
        let mut removed = 0;
        while let Some(index) = pending.pop() {
            let mut child = self.at(index).first_child;
            while let Some(c) = child {
                pending.push(c);
                child = self.at(c).next;
            }
            self.nodes.remove(index);
            removed += 1;
        }
        Ok(removed)
    }

    /// Visit the subtree under `root`.
    ///
    /// `flags` selects leaves and/or inner nodes; leafness is judged on the
    /// whole tree, not on the depth cut. `max_depth` counts `root` as depth 1;
    /// `None` visits every depth and `Some(0)` visits nothing. Returning
    /// `ControlFlow::Break` from `visit` stops the walk.
    pub fn traverse<F>(
        &self,
        root: NodeId,
        order: TraverseOrder,
        flags: TraverseFlags,
        max_depth: Option<usize>,
        mut visit: F,
    ) -> Result<Traversal>
    where
        F: FnMut(NodeId, &T) -> ControlFlow<()>,
    {
        self.node(root)?;
        if max_depth == Some(0) {
            return Ok(Traversal::Completed);
        }
        let mut report = |index: Index| -> ControlFlow<()> {
            let node = self.at(index);
            if flags.admits(node.first_child.is_none()) {
                visit(self.id(index), &node.data)
            } else {
                ControlFlow::Continue(())
            }
        };
        let walk = match order {
            TraverseOrder::LevelOrder => self.level_order(root.index, max_depth, &mut report)?,
            depth_first => self.depth_order(root.index, depth_first, max_depth, &mut report)?,
        };
        Ok(match walk {
            ControlFlow::Break(()) => Traversal::Terminated,
            ControlFlow::Continue(()) => Traversal::Completed,
        })
    }

    /// Children of `index` when `depth` is above the cut
    fn expand(&self, index: Index, depth: usize, max_depth: Option<usize>) -> Result<Vec<Index>> {
        let mut children = Vec::new();
        if max_depth.map_or(true, |max| depth < max) {
            let mut child = self.at(index).first_child;
            while let Some(c) = child {
                children.try_reserve(1)?;
                children.push(c);
                child = self.at(c).next;
            }
        }
        Ok(children)
    }

    fn level_order(
        &self,
        root: Index,
        max_depth: Option<usize>,
        report: &mut dyn FnMut(Index) -> ControlFlow<()>,
    ) -> Result<ControlFlow<()>> {
        let mut queue = VecDeque::new();
        queue.push_back((root, 1));
        while let Some((index, depth)) = queue.pop_front() {
            if report(index).is_break() {
                return Ok(ControlFlow::Break(()));
            }
            let children = self.expand(index, depth, max_depth)?;
            queue.try_reserve(children.len())?;
            queue.extend(children.into_iter().map(|c| (c, depth + 1)));
        }
        Ok(ControlFlow::Continue(()))
    }

    fn depth_order(
        &self,
        root: Index,
        order: TraverseOrder,
        max_depth: Option<usize>,
        report: &mut dyn FnMut(Index) -> ControlFlow<()>,
    ) -> Result<ControlFlow<()>> {
        let mut stack = vec![Step::Enter(root, 1)];
        while let Some(step) = stack.pop() {
            let (index, depth) = match step {
                Step::Visit(index) => {
                    if report(index).is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                    continue;
                }
                Step::Enter(index, depth) => (index, depth),
            };

            let children = self.expand(index, depth, max_depth)?;
            let enter = |c: &Index| Step::Enter(*c, depth + 1);
            stack.try_reserve(children.len() + 1)?;
            match (order, children.split_first()) {
                (TraverseOrder::InOrder, Some((first, rest))) => {
                    stack.extend(rest.iter().rev().map(enter));
                    stack.push(Step::Visit(index));
                    stack.push(enter(first));
                }
                (TraverseOrder::PostOrder, _) => {
                    stack.push(Step::Visit(index));
                    stack.extend(children.iter().rev().map(enter));
                }
                _ => {
                    stack.extend(children.iter().rev().map(enter));
                    stack.push(Step::Visit(index));
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Remove every node; outstanding ids become invalid
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
