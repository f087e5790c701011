/// Core reusable data structures

/// Generational slot arena backing the linked structures
pub mod arena;
/// Block memory pool with overrun fencing
pub mod mem_pool;
/// Dynamic and pointer arrays
pub mod array;
/// Cursor-based doubly linked list
pub mod list;
/// Byte-string keyed hash table
pub mod hash_table;
/// Directed graph and path enumeration
pub mod graph;
/// N-ary tree with ordered children
pub mod tree;

// Export the main types
pub use arena::{Arena, Index};
pub use array::{DynArray, PtrArray};
pub use graph::{
    AcceptAll, Adjacency, BreadthFirstVisitor, EdgeId, EdgePathVisitor, EdgeRef, Graph, PathControl,
    Traversal, VertexId, VertexRef,
};
pub use hash_table::{Export, HashTable};
pub use list::{Comparator, List};
pub use mem_pool::{MemPool, PoolAlloc, PoolFlags, PoolStats};
pub use tree::{NodeId, TraverseFlags, TraverseOrder, Tree};
