//! Node store port and adapters.
//!
//! The node store receives the pipeline's output: hierarchy node creations,
//! parent-child links, file node registrations and touches of file nodes
//! reused from the media cache. Calls
//! arrive in hierarchy order; implementations may build the tree
//! incrementally and rely on a parent existing before its children.
//!
//! - [`JsonlNodeStore`] - one JSON operation per line, to a file or stdout
//! - [`MemoryNodeStore`] - keeps operations in memory (dry runs)

mod jsonl;
mod memory;

pub use jsonl::JsonlNodeStore;
pub use memory::{MemoryNodeStore, StoreOp};

use serde::Serialize;

use crate::error::Result;
use crate::model::{FileNode, Node};

/// Node store port.
pub trait NodeStore: Send + Sync {
    /// Create (or replace) a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be persisted.
    fn create_node(&self, node: &Node) -> Result<()>;

    /// Record `child` as owned by `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be persisted.
    fn create_parent_child_link(&self, parent: &Node, child: &Node) -> Result<()>;

    /// Register (or replace) a downloaded file node. File nodes sit outside
    /// the hierarchy; cards reference them by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be persisted.
    fn register_file(&self, file: &FileNode) -> Result<()>;

    /// Mark an existing node as still in use.
    ///
    /// # Errors
    ///
    /// Returns an error if the touch cannot be persisted.
    fn touch_node(&self, node_id: &str) -> Result<()>;
}

/// Wire form of a store operation.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum StoreRecord<'a> {
    CreateNode { node: &'a Node },
    CreateLink { parent: &'a str, child: &'a str },
    RegisterFile { node: &'a FileNode },
    TouchNode { id: &'a str },
}
