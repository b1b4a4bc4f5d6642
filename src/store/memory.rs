//! In-memory node store.
//!
//! Used for `sync --dry-run`: the full pipeline runs, media is resolved,
//! and the operations are counted instead of written.

use std::sync::{Mutex, PoisonError};

use super::NodeStore;
use crate::error::Result;
use crate::model::{FileNode, Node};

/// A recorded store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    CreateNode(Node),
    Link { parent: String, child: String },
    RegisterFile(FileNode),
    Touch(String),
}

/// Node store that keeps every operation in call order.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    ops: Mutex<Vec<StoreOp>>,
}

impl MemoryNodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded operations.
    #[must_use]
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Created nodes, in creation order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::CreateNode(node) => Some(node),
                _ => None,
            })
            .collect()
    }

    /// Registered file nodes, in registration order.
    #[must_use]
    pub fn files(&self) -> Vec<FileNode> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::RegisterFile(file) => Some(file),
                _ => None,
            })
            .collect()
    }

    /// Links as `(parent, child)` id pairs, in creation order.
    #[must_use]
    pub fn links(&self) -> Vec<(String, String)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Link { parent, child } => Some((parent, child)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, op: StoreOp) {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).push(op);
    }
}

impl NodeStore for MemoryNodeStore {
    fn create_node(&self, node: &Node) -> Result<()> {
        self.push(StoreOp::CreateNode(node.clone()));
        Ok(())
    }

    fn create_parent_child_link(&self, parent: &Node, child: &Node) -> Result<()> {
        self.push(StoreOp::Link {
            parent: parent.id().to_string(),
            child: child.id().to_string(),
        });
        Ok(())
    }

    fn register_file(&self, file: &FileNode) -> Result<()> {
        self.push(StoreOp::RegisterFile(file.clone()));
        Ok(())
    }

    fn touch_node(&self, node_id: &str) -> Result<()> {
        self.push(StoreOp::Touch(node_id.to_string()));
        Ok(())
    }
}
