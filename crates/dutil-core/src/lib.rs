//! # dutil core
//!
//! Pool-backed data structures and algorithms: a block memory pool with
//! overrun fencing, dynamic and pointer arrays, a cursor-based linked list,
//! a byte-string keyed hash table, a directed graph with path enumeration,
//! an N-ary tree, and a typed serialization buffer with base64 and checksum
//! support.
//!
//! Containers are not internally synchronized. Share one between threads by
//! wrapping it in [`Shared`]. Every operation reports failure through the
//! flat [`Error`] enum and either fully succeeds or leaves the container as
//! it was.

#![warn(missing_docs)]

/// Ambient support: configuration, diagnostics, shared access
pub mod core;

/// Type definitions shared by all containers
pub mod types;

/// Toolkit constants
pub mod constants;

/// Containers and graph algorithms
pub mod structures;

/// Serialization buffer and codecs
pub mod codec;

// Re-export commonly used items
pub use codec::{base64_decode, base64_encode, base64_encoded_len, checksum, SerializeBuffer};
pub use core::{Shared, ToolkitConfig};
pub use structures::{
    AcceptAll, Adjacency, BreadthFirstVisitor, DynArray, EdgeId, EdgePathVisitor, EdgeRef, Graph,
    HashTable, List, MemPool, NodeId, PathControl, PoolAlloc, PoolFlags, PoolStats, PtrArray,
    Traversal, TraverseFlags, TraverseOrder, Tree, VertexId, VertexRef,
};
pub use types::{Error, ErrorKind, Identity, Result};
