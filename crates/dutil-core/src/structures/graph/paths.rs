//! Path enumeration between two vertices
//!
//! Both enumerations report simple paths only (no vertex repeats) and are
//! steered by caller callbacks returning a [`PathControl`]:
//!
//! - `Ok` accepts and continues
//! - `Skip` rejects the edge or vertex under test and continues
//! - `Terminate` stops the enumeration at once with [`Traversal::Terminated`]
//! - `Error` and `OutOfMemory` stop it at once with an error
//!
//! After a stop no callback of any kind is invoked again.

use std::collections::VecDeque;

use super::{EdgeId, EdgeRef, Graph, VertexId, VertexRef};
use crate::structures::list;
use crate::types::{Error, Result};

/// Verdict returned by enumeration callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathControl {
    /// Accept and continue
    Ok,
    /// The callback ran out of memory; stops with `Error::OutOfMemory`
    OutOfMemory,
    /// Stop the whole enumeration
    Terminate,
    /// Stop with `Error::CallbackError`
    Error,
    /// Reject the edge or vertex under test and continue
    Skip,
}

/// How an enumeration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every admitted path was reported
    Completed,
    /// A callback returned `Terminate`
    Terminated,
}

/// Map stopping verdicts to the enumeration result
#[inline]
fn halt(control: PathControl) -> Option<Result<Traversal>> {
    match control {
        PathControl::Ok | PathControl::Skip => None,
        PathControl::Terminate => Some(Ok(Traversal::Terminated)),
        PathControl::Error => Some(Err(Error::CallbackError)),
        PathControl::OutOfMemory => Some(Err(Error::OutOfMemory)),
    }
}

/// Callbacks of the depth-first backtracking enumeration
///
/// `extend` is offered each edge before the path grows through it and
/// `reduce` is called for every accepted edge when the search backs out of
/// it, so running state kept alongside the path can be undone.
pub trait EdgePathVisitor<V, E> {
    /// Offer an edge for extending the current path
    fn extend(&mut self, _edge: EdgeRef<'_, E>) -> PathControl {
        PathControl::Ok
    }

    /// Backtrack past an edge previously accepted by `extend`
    fn reduce(&mut self, _edge: EdgeRef<'_, E>) -> PathControl {
        PathControl::Ok
    }

    /// A complete path from source to target, as its edges in order
    fn path(&mut self, edges: &[EdgeId]) -> PathControl;
}

impl<V, E, F> EdgePathVisitor<V, E> for F
where
    F: FnMut(&[EdgeId]) -> PathControl,
{
    fn path(&mut self, edges: &[EdgeId]) -> PathControl {
        self(edges)
    }
}

/// Pruning tests of the breadth-first enumerations
///
/// Each vertex and edge is tested at most once per enumeration; a `Skip`
/// verdict excludes it from every path, not just the current one.
pub trait BreadthFirstVisitor<V, E> {
    /// Test a vertex before paths may pass through it
    fn vertex_test(&mut self, _vertex: VertexRef<'_, V>) -> PathControl {
        PathControl::Ok
    }

    /// Test an edge before paths may use it
    fn edge_test(&mut self, _edge: EdgeRef<'_, E>) -> PathControl {
        PathControl::Ok
    }
}

/// Breadth-first visitor admitting every vertex and edge
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<V, E> BreadthFirstVisitor<V, E> for AcceptAll {}

struct Frame<'a> {
    vertex: VertexId,
    out: list::Iter<'a, EdgeId>,
    via: Option<EdgeId>,
}

fn bool_slots(len: usize) -> Result<Vec<bool>> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(len)?;
    slots.resize(len, false);
    Ok(slots)
}

/// Memoized test verdicts indexed by arena slot
struct Verdicts {
    seen: Vec<Option<bool>>,
}

impl Verdicts {
    fn new(len: usize) -> Result<Self> {
        let mut seen = Vec::new();
        seen.try_reserve_exact(len)?;
        seen.resize(len, None);
        Ok(Self { seen })
    }

    /// Cached verdict, or run `test` once and remember whether it admitted
    fn admit(&mut self, slot: usize, test: impl FnOnce() -> PathControl) -> std::result::Result<bool, Result<Traversal>> {
        if let Some(known) = self.seen[slot] {
            return Ok(known);
        }
        let control = test();
        if let Some(done) = halt(control) {
            return Err(done);
        }
        let admitted = control == PathControl::Ok;
        self.seen[slot] = Some(admitted);
        Ok(admitted)
    }
}

struct Partial {
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
}

impl Partial {
    fn extended(&self, edge: EdgeId, vertex: VertexId) -> Result<Partial> {
        let mut vertices = Vec::new();
        vertices.try_reserve_exact(self.vertices.len() + 1)?;
        vertices.extend_from_slice(&self.vertices);
        vertices.push(vertex);
        let mut edges = Vec::new();
        edges.try_reserve_exact(self.edges.len() + 1)?;
        edges.extend_from_slice(&self.edges);
        edges.push(edge);
        Ok(Partial { vertices, edges })
    }
}

impl<V, E> Graph<V, E> {
    /// Depth-first backtracking enumeration of every simple path `from -> to`.
    ///
    /// Out-edges are explored in insertion order. `from == to` reports a
    /// single path with no edges.
    pub fn iterate_edge_paths<P>(&self, from: VertexId, to: VertexId, visitor: &mut P) -> Result<Traversal>
    where
        P: EdgePathVisitor<V, E> + ?Sized,
    {
        self.vertex(from)?;
        self.vertex(to)?;
        if from == to {
            return halt(visitor.path(&[])).unwrap_or(Ok(Traversal::Completed));
        }

        let mut on_path = bool_slots(self.vertex_slots())?;
        let mut path: Vec<EdgeId> = Vec::new();
        let mut stack: Vec<Frame<'_>> = Vec::new();
        stack.try_reserve(1)?;
        stack.push(Frame {
            vertex: from,
            out: self.out_edges(from)?.iter(),
            via: None,
        });
        on_path[from.index.slot()] = true;

        while let Some(top) = stack.last_mut() {
            let Some(&edge_id) = top.out.next() else {
                // every out-edge of this vertex is done; back out
                let done = stack.pop();
                if let Some(frame) = done {
                    on_path[frame.vertex.index.slot()] = false;
                    if let Some(via) = frame.via {
                        path.pop();
                        if let Some(stop) = halt(visitor.reduce(self.edge_ref(via)?)) {
                            return stop;
                        }
                    }
                }
                continue;
            };

            let edge = self.edge_ref(edge_id)?;
            if on_path[edge.to.index.slot()] {
                continue;
            }

            let control = visitor.extend(edge);
            if let Some(stop) = halt(control) {
                return stop;
            }
            if control == PathControl::Skip {
                continue;
            }

            path.try_reserve(1)?;
            path.push(edge_id);
            if edge.to == to {
                if let Some(stop) = halt(visitor.path(&path)) {
                    return stop;
                }
                path.pop();
                if let Some(stop) = halt(visitor.reduce(edge)) {
                    return stop;
                }
            } else {
                stack.try_reserve(1)?;
                stack.push(Frame {
                    vertex: edge.to,
                    out: self.out_edges(edge.to)?.iter(),
                    via: Some(edge_id),
                });
                on_path[edge.to.index.slot()] = true;
            }
        }

        Ok(Traversal::Completed)
    }

    /// Breadth-first enumeration shared by the vertex and edge path variants
    fn breadth_first<P, R>(&self, from: VertexId, to: VertexId, visitor: &mut P, mut report: R) -> Result<Traversal>
    where
        P: BreadthFirstVisitor<V, E> + ?Sized,
        R: FnMut(&Partial) -> PathControl,
    {
        let source = self.vertex_ref(from)?;
        self.vertex(to)?;

        let mut vertex_verdicts = Verdicts::new(self.vertex_slots())?;
        let mut edge_verdicts = Verdicts::new(self.edge_slots())?;

        match vertex_verdicts.admit(from.index.slot(), || visitor.vertex_test(source)) {
            Err(stop) => return stop,
            Ok(false) => return Ok(Traversal::Completed),
            Ok(true) => {}
        }

        let mut queue = VecDeque::new();
        queue.try_reserve(1)?;
        queue.push_back(Partial {
            vertices: vec![from],
            edges: Vec::new(),
        });

        // FIFO order keeps reported paths in non-decreasing hop count
        while let Some(partial) = queue.pop_front() {
            let Some(&last) = partial.vertices.last() else {
                continue;
            };
            if last == to {
                if let Some(stop) = halt(report(&partial)) {
                    return stop;
                }
                continue;
            }

            for &edge_id in self.out_edges(last)? {
                let edge = self.edge_ref(edge_id)?;
                if partial.vertices.contains(&edge.to) {
                    continue;
                }
                match edge_verdicts.admit(edge_id.index.slot(), || visitor.edge_test(edge)) {
                    Err(stop) => return stop,
                    Ok(false) => continue,
                    Ok(true) => {}
                }
                let target = self.vertex_ref(edge.to)?;
                match vertex_verdicts.admit(edge.to.index.slot(), || visitor.vertex_test(target)) {
                    Err(stop) => return stop,
                    Ok(false) => continue,
                    Ok(true) => {}
                }
                queue.try_reserve(1)?;
                queue.push_back(partial.extended(edge_id, edge.to)?);
            }
        }

        Ok(Traversal::Completed)
    }

    /// Breadth-first enumeration reporting each path as its vertices.
    ///
    /// Paths arrive in non-decreasing hop count. `from == to` reports the
    /// single path `[from]`.
    pub fn iterate_vertex_paths_breadth_first<P, F>(
        &self,
        from: VertexId,
        to: VertexId,
        visitor: &mut P,
        mut path: F,
    ) -> Result<Traversal>
    where
        P: BreadthFirstVisitor<V, E> + ?Sized,
        F: FnMut(&[VertexId]) -> PathControl,
    {
        self.breadth_first(from, to, visitor, |partial| path(&partial.vertices))
    }

    /// Breadth-first enumeration reporting each path as its edges.
    ///
    /// Paths arrive in non-decreasing hop count. `from == to` reports a
    /// single path with no edges.
    pub fn iterate_edge_paths_breadth_first<P, F>(
        &self,
        from: VertexId,
        to: VertexId,
        visitor: &mut P,
        mut path: F,
    ) -> Result<Traversal>
    where
        P: BreadthFirstVisitor<V, E> + ?Sized,
        F: FnMut(&[EdgeId]) -> PathControl,
    {
        self.breadth_first(from, to, visitor, |partial| path(&partial.edges))
    }
}
