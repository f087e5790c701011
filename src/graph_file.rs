//! TOML graph descriptions
//!
//! ```toml
//! [[vertex]]
//! name = "a"
//!
//! [[edge]]
//! from = "a"
//! to = "b"
//! weight = 3   # optional, defaults to 1
//! ```

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use dutil_core::{
    AcceptAll, EdgeId, EdgePathVisitor, EdgeRef, Graph, HashTable, PathControl, ToolkitConfig,
    Traversal, VertexId,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default, rename = "vertex")]
    vertices: Vec<VertexEntry>,
    #[serde(default, rename = "edge")]
    edges: Vec<EdgeEntry>,
}

#[derive(Debug, Deserialize)]
struct VertexEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EdgeEntry {
    from: String,
    to: String,
    #[serde(default = "unit_weight")]
    weight: i64,
}

fn unit_weight() -> i64 {
    1
}

/// One enumerated path with its vertex names and summed edge weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReport {
    /// Vertex names from source to target
    pub vertices: Vec<String>,
    /// Sum of the edge weights along the path
    pub weight: i64,
}

/// A graph loaded from a TOML description, vertices indexed by name
pub struct LoadedGraph {
    graph: Graph<String, i64>,
    names: HashTable<VertexId>,
}

impl LoadedGraph {
    /// Read and build a graph description file
    pub fn from_file(path: impl AsRef<Path>, config: &ToolkitConfig) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph file {}", path.display()))?;
        Self::parse(&text, config).with_context(|| format!("Invalid graph file {}", path.display()))
    }

    /// Build a graph from TOML text; the name index follows the table and
    /// pool sections of `config`
    pub fn parse(text: &str, config: &ToolkitConfig) -> Result<Self> {
        let file: GraphFile = toml::from_str(text).context("Failed to parse graph description")?;

        let mut graph = Graph::new();
        let mut names = HashTable::with_key_pool(&config.table, &config.pool)?;
        for vertex in file.vertices {
            if names.contains(vertex.name.as_bytes())? {
                bail!("Duplicate vertex name: {}", vertex.name);
            }
            let key = vertex.name.clone();
            let id = graph.add_vertex(vertex.name)?;
            names.add(key.as_bytes(), id)?;
        }

        let mut loaded = Self { graph, names };
        for edge in file.edges {
            let from = loaded.vertex(&edge.from)?;
            let to = loaded.vertex(&edge.to)?;
            loaded
                .graph
                .add_edge(from, to, edge.weight)
                .with_context(|| format!("Edge {} -> {}", edge.from, edge.to))?;
        }

        tracing::debug!(
            vertices = loaded.graph.vertex_count(),
            edges = loaded.graph.edge_count(),
            "graph loaded"
        );
        Ok(loaded)
    }

    /// The underlying graph
    pub fn graph(&self) -> &Graph<String, i64> {
        &self.graph
    }

    /// Resolve a vertex by name
    pub fn vertex(&self, name: &str) -> Result<VertexId> {
        self.names
            .retrieve(name.as_bytes())?
            .copied()
            .ok_or_else(|| anyhow!("Unknown vertex: {}", name))
    }

    /// Enumerate paths depth first, tracking the running weight as the
    /// search extends and backs out of edges
    pub fn depth_first_paths(&self, from: &str, to: &str, limit: Option<usize>) -> Result<Vec<PathReport>> {
        let from = self.vertex(from)?;
        let to = self.vertex(to)?;
        let mut tracker = WeightTracker {
            loaded: self,
            from,
            weight: 0,
            limit,
            found: Vec::new(),
        };
        let outcome = self.graph.iterate_edge_paths(from, to, &mut tracker)?;
        tracing::debug!(?outcome, paths = tracker.found.len(), "depth-first enumeration finished");
        Ok(tracker.found)
    }

    /// Enumerate paths breadth first, shortest hop counts first
    pub fn breadth_first_paths(&self, from: &str, to: &str, limit: Option<usize>) -> Result<Vec<PathReport>> {
        let from = self.vertex(from)?;
        let to = self.vertex(to)?;
        let mut found = Vec::new();
        let mut failure = None;
        let outcome = self.graph.iterate_edge_paths_breadth_first(from, to, &mut AcceptAll, |edges| {
            match self.report(from, edges, None) {
                Ok(report) => found.push(report),
                Err(e) => {
                    failure = Some(e);
                    return PathControl::Error;
                }
            }
            if limit.is_some_and(|n| found.len() >= n) {
                PathControl::Terminate
            } else {
                PathControl::Ok
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        let outcome: Traversal = outcome?;
        tracing::debug!(?outcome, paths = found.len(), "breadth-first enumeration finished");
        Ok(found)
    }

    /// Describe a path; `weight` is summed from the edges when not supplied
    fn report(&self, from: VertexId, edges: &[EdgeId], weight: Option<i64>) -> Result<PathReport> {
        let mut vertices = Vec::with_capacity(edges.len() + 1);
        vertices.push(self.graph.vertex_data(from)?.clone());
        let mut total = 0i64;
        for &edge in edges {
            let (_, to) = self.graph.edge_endpoints(edge)?;
            vertices.push(self.graph.vertex_data(to)?.clone());
            total = total.wrapping_add(*self.graph.edge_data(edge)?);
        }
        Ok(PathReport {
            vertices,
            weight: weight.unwrap_or(total),
        })
    }
}

struct WeightTracker<'a> {
    loaded: &'a LoadedGraph,
    from: VertexId,
    weight: i64,
    limit: Option<usize>,
    found: Vec<PathReport>,
}

impl EdgePathVisitor<String, i64> for WeightTracker<'_> {
    fn extend(&mut self, edge: EdgeRef<'_, i64>) -> PathControl {
        self.weight = self.weight.wrapping_add(*edge.data);
        PathControl::Ok
    }

    fn reduce(&mut self, edge: EdgeRef<'_, i64>) -> PathControl {
        self.weight = self.weight.wrapping_sub(*edge.data);
        PathControl::Ok
    }

    fn path(&mut self, edges: &[EdgeId]) -> PathControl {
        match self.loaded.report(self.from, edges, Some(self.weight)) {
            Ok(report) => self.found.push(report),
            Err(_) => return PathControl::Error,
        }
        if self.limit.is_some_and(|n| self.found.len() >= n) {
            PathControl::Terminate
        } else {
            PathControl::Ok
        }
    }
}
