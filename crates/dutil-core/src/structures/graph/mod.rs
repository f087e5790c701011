//! Directed graph with opaque vertex and edge payloads
//!
//! Vertices and edges live in arenas. Every vertex keeps its incident edges in
//! two [`List`]s (in and out) in insertion order, which is the order path
//! enumeration explores them in. Ids carry a tag of the graph that issued
//! them; using them with another graph fails with
//! [`Error::DifferentGraphs`], using them after removal with
//! [`Error::InvalidHandle`].

use std::sync::atomic::{AtomicU32, Ordering};

use crate::structures::arena::{Arena, Index};
use crate::structures::list::List;
use crate::types::{Error, Identity, Result};

mod paths;


pub use paths::{AcceptAll, BreadthFirstVisitor, EdgePathVisitor, PathControl, Traversal};

static NEXT_GRAPH_TAG: AtomicU32 = AtomicU32::new(1);

/// Handle to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexId {
    graph: u32,
    index: Index,
}

/// Handle to an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId {
    graph: u32,
    index: Index,
}

macro_rules! id_identity {
    ($($t:ty),*) => {
        $(
            impl Identity for $t {
                #[inline]
                fn identity(&self) -> usize {
                    let word = (u64::from(self.index.generation()) << 32) | self.index.slot() as u64;
                    word as usize
                }

                #[inline]
                fn same_ref(&self, other: &Self) -> bool {
                    self == other
                }

                #[inline]
                fn compare_ref(&self, other: &Self) -> std::cmp::Ordering {
                    let key = |id: &Self| (id.graph, id.index.slot(), id.index.generation());
                    key(self).cmp(&key(other))
                }
            }
        )*
    };
}

id_identity!(VertexId, EdgeId);

/// Vertex as seen by enumeration callbacks
#[derive(Debug)]
pub struct VertexRef<'a, V> {
    /// Vertex handle
    pub id: VertexId,
    /// Vertex payload
    pub data: &'a V,
}

/// Edge as seen by enumeration callbacks
#[derive(Debug)]
pub struct EdgeRef<'a, E> {
    /// Edge handle
    pub id: EdgeId,
    /// Source vertex
    pub from: VertexId,
    /// Target vertex
    pub to: VertexId,
    /// Edge payload
    pub data: &'a E,
}

impl<V> Clone for VertexRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for VertexRef<'_, V> {}

impl<E> Clone for EdgeRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EdgeRef<'_, E> {}

/// Neighbours of a vertex as parallel vectors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    /// Vertex at the other end of each edge
    pub vertices: Vec<VertexId>,
    /// Connecting edges, same order as `vertices`
    pub edges: Vec<EdgeId>,
}

struct Vertex<V> {
    data: V,
    in_edges: List<EdgeId>,
    out_edges: List<EdgeId>,
}

struct Edge<E> {
    data: E,
    from: VertexId,
    to: VertexId,
}

/// Directed graph
pub struct Graph<V, E> {
    tag: u32,
    vertices: Arena<Vertex<V>>,
    edges: Arena<Edge<E>>,
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Graph<V, E> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            tag: NEXT_GRAPH_TAG.fetch_add(1, Ordering::Relaxed),
            vertices: Arena::new(),
            edges: Arena::new(),
        }
    }

    /// Number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn vertex(&self, id: VertexId) -> Result<&Vertex<V>> {
        if id.graph != self.tag {
            return Err(Error::DifferentGraphs);
        }
        self.vertices.get(id.index).ok_or(Error::InvalidHandle)
    }

    fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex<V>> {
        if id.graph != self.tag {
            return Err(Error::DifferentGraphs);
        }
        self.vertices.get_mut(id.index).ok_or(Error::InvalidHandle)
    }

    fn edge(&self, id: EdgeId) -> Result<&Edge<E>> {
        if id.graph != self.tag {
            return Err(Error::DifferentGraphs);
        }
        self.edges.get(id.index).ok_or(Error::InvalidHandle)
    }

    pub(crate) fn vertex_ref(&self, id: VertexId) -> Result<VertexRef<'_, V>> {
        Ok(VertexRef {
            id,
            data: &self.vertex(id)?.data,
        })
    }

    pub(crate) fn edge_ref(&self, id: EdgeId) -> Result<EdgeRef<'_, E>> {
        let edge = self.edge(id)?;
        Ok(EdgeRef {
            id,
            from: edge.from,
            to: edge.to,
            data: &edge.data,
        })
    }

    pub(crate) fn out_edges(&self, id: VertexId) -> Result<&List<EdgeId>> {
        Ok(&self.vertex(id)?.out_edges)
    }

    pub(crate) fn vertex_slots(&self) -> usize {
        self.vertices.slot_count()
    }

    pub(crate) fn edge_slots(&self) -> usize {
        self.edges.slot_count()
    }

    /// Add a vertex carrying `data`
    pub fn add_vertex(&mut self, data: V) -> Result<VertexId> {
        let index = self.vertices.insert(Vertex {
            data,
            in_edges: List::new(),
            out_edges: List::new(),
        })?;
        Ok(VertexId {
            graph: self.tag,
            index,
        })
    }

    /// Add an edge `from -> to`; fails with `DuplicateEdge` if one exists
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, data: E) -> Result<EdgeId> {
        if self.check_edge(from, to)?.is_some() {
            return Err(Error::DuplicateEdge);
        }
        self.add_edge_unchecked(from, to, data)
    }

    /// Add an edge `from -> to` without the duplicate check
    pub fn add_edge_unchecked(&mut self, from: VertexId, to: VertexId, data: E) -> Result<EdgeId> {
        self.vertex(from)?;
        self.vertex(to)?;
        let index = self.edges.insert(Edge { data, from, to })?;
        let id = EdgeId {
            graph: self.tag,
            index,
        };

        if let Err(e) = self.vertex_mut(from)?.out_edges.append(id) {
            self.edges.remove(index);
            return Err(e);
        }
        if let Err(e) = self.vertex_mut(to)?.in_edges.append(id) {
            self.vertex_mut(from)?.out_edges.remove(&id)?;
            self.edges.remove(index);
            return Err(e);
        }
        Ok(id)
    }

    /// Edge `from -> to`, if any
    pub fn check_edge(&self, from: VertexId, to: VertexId) -> Result<Option<EdgeId>> {
        let source = self.vertex(from)?;
        self.vertex(to)?;
        Ok(source
            .out_edges
            .iter()
            .copied()
            .find(|&e| self.edges.get(e.index).is_some_and(|edge| edge.to == to)))
    }

    /// Remove an edge, returning its payload
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<E> {
        let (from, to) = {
            let edge = self.edge(id)?;
            (edge.from, edge.to)
        };
        self.vertex_mut(from)?.out_edges.remove(&id)?;
        self.vertex_mut(to)?.in_edges.remove(&id)?;
        self.edges
            .remove(id.index)
            .map(|edge| edge.data)
            .ok_or(Error::InvalidHandle)
    }

    /// Remove a vertex and every incident edge, returning its payload
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<V> {
        let vertex = self.vertex(id)?;
        let mut incident: Vec<EdgeId> = Vec::new();
        incident.try_reserve(vertex.in_edges.len() + vertex.out_edges.len())?;
        incident.extend(vertex.out_edges.iter().copied());
        // self-loops appear in both lists
        incident.extend(vertex.in_edges.iter().copied().filter(|e| {
            self.edges.get(e.index).is_some_and(|edge| edge.from != id)
        }));

        for edge in incident {
            self.remove_edge(edge)?;
        }
        self.vertices
            .remove(id.index)
            .map(|vertex| vertex.data)
            .ok_or(Error::InvalidHandle)
    }

    /// All vertex handles
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        let graph = self.tag;
        self.vertices.iter().map(move |(index, _)| VertexId { graph, index })
    }

    /// All edge handles
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        let graph = self.tag;
        self.edges.iter().map(move |(index, _)| EdgeId { graph, index })
    }

    /// Payload of a vertex
    pub fn vertex_data(&self, id: VertexId) -> Result<&V> {
        Ok(&self.vertex(id)?.data)
    }

    /// Mutable payload of a vertex
    pub fn vertex_data_mut(&mut self, id: VertexId) -> Result<&mut V> {
        Ok(&mut self.vertex_mut(id)?.data)
    }

    /// Payload of an edge
    pub fn edge_data(&self, id: EdgeId) -> Result<&E> {
        Ok(&self.edge(id)?.data)
    }

    /// Mutable payload of an edge
    pub fn edge_data_mut(&mut self, id: EdgeId) -> Result<&mut E> {
        if id.graph != self.tag {
            return Err(Error::DifferentGraphs);
        }
        self.edges
            .get_mut(id.index)
            .map(|edge| &mut edge.data)
            .ok_or(Error::InvalidHandle)
    }

    /// Source and target of an edge
    pub fn edge_endpoints(&self, id: EdgeId) -> Result<(VertexId, VertexId)> {
        let edge = self.edge(id)?;
        Ok((edge.from, edge.to))
    }

    fn adjacency(&self, list: &List<EdgeId>, outgoing: bool) -> Result<Adjacency> {
        let mut adjacency = Adjacency::default();
        adjacency.vertices.try_reserve_exact(list.len())?;
        adjacency.edges.try_reserve_exact(list.len())?;
        for &e in list {
            let edge = self.edge(e)?;
            adjacency.vertices.push(if outgoing { edge.to } else { edge.from });
            adjacency.edges.push(e);
        }
        Ok(adjacency)
    }

    /// Incoming edges of a vertex with their source vertices
    pub fn in_list(&self, id: VertexId) -> Result<Adjacency> {
        self.adjacency(&self.vertex(id)?.in_edges, false)
    }

    /// Outgoing edges of a vertex with their target vertices
    pub fn out_list(&self, id: VertexId) -> Result<Adjacency> {
        self.adjacency(&self.vertex(id)?.out_edges, true)
    }

    /// Remove every vertex and edge; all issued ids become invalid
    pub fn clear(&mut self) {
        self.edges.clear();
        self.vertices.clear();
    }
}
