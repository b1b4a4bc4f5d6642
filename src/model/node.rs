//! Node payloads emitted to the node store.
//!
//! Every node is its normalized fields plus `id` and an `internal` block
//! carrying the type tag and content digest. Nodes serialize flat (no enum
//! tag); the type lives in `internal.type`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::card::MediaAttachment;

/// Node type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeType {
    #[serde(rename = "TrelloBoard")]
    Board,
    #[serde(rename = "TrelloBoardCard")]
    Card,
    #[serde(rename = "TrelloBoardChecklist")]
    Checklist,
    #[serde(rename = "TrelloBoardChecklistItem")]
    ChecklistItem,
    #[serde(rename = "File")]
    File,
}

impl NodeType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "TrelloBoard",
            Self::Card => "TrelloBoardCard",
            Self::Checklist => "TrelloBoardChecklist",
            Self::ChecklistItem => "TrelloBoardChecklistItem",
            Self::File => "File",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node metadata shared by every node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Internal {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub content_digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardNode {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub url: String,
    pub internal: Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardNode {
    pub id: String,
    pub list_index: usize,
    pub list_id: String,
    pub list_slug: String,
    pub list_name: String,
    pub index: usize,
    pub slug: String,
    pub name: String,
    pub content: String,
    pub medias: Vec<MediaAttachment>,
    /// Serialized as `null` when the card has no due date.
    pub due: Option<DateTime<Utc>>,
    pub url: String,
    pub internal: Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistNode {
    pub id: String,
    pub name: String,
    pub internal: Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItemNode {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub internal: Internal,
}

/// A downloaded media file. Registered with the node store just before the
/// first card that references it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub internal: Internal,
}

/// An attachment's file node as resolved for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFile {
    pub node: FileNode,
    /// Taken from the media cache rather than downloaded in this run.
    pub reused: bool,
}

/// A node of the board hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Board(BoardNode),
    Card(CardNode),
    Checklist(ChecklistNode),
    ChecklistItem(ChecklistItemNode),
}

impl Node {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Board(n) => &n.id,
            Self::Card(n) => &n.id,
            Self::Checklist(n) => &n.id,
            Self::ChecklistItem(n) => &n.id,
        }
    }

    #[must_use]
    pub fn internal(&self) -> &Internal {
        match self {
            Self::Board(n) => &n.internal,
            Self::Card(n) => &n.internal,
            Self::Checklist(n) => &n.internal,
            Self::ChecklistItem(n) => &n.internal,
        }
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.internal().node_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(node_type: NodeType) -> Internal {
        Internal {
            node_type,
            content_digest: "abc".into(),
            media_type: None,
        }
    }

    #[test]
    fn test_internal_serializes_camel_case() {
        let node = Node::Checklist(ChecklistNode {
            id: "cl_1".into(),
            name: "Fruits".into(),
            internal: internal(NodeType::Checklist),
        });

        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["id"], "cl_1");
        assert_eq!(json["internal"]["type"], "TrelloBoardChecklist");
        assert_eq!(json["internal"]["contentDigest"], "abc");
        assert!(json["internal"].get("mediaType").is_none());
    }

    #[test]
    fn test_card_due_serializes_null() {
        let node = CardNode {
            id: "card_1".into(),
            list_index: 0,
            list_id: "list_1".into(),
            list_slug: "to_do".into(),
            list_name: "To Do".into(),
            index: 0,
            slug: "card".into(),
            name: "Card".into(),
            content: String::new(),
            medias: Vec::new(),
            due: None,
            url: String::new(),
            internal: internal(NodeType::Card),
        };

        let json = serde_json::to_value(&node).unwrap();

        assert!(json.get("due").is_some());
        assert!(json["due"].is_null());
    }

    #[test]
    fn test_node_type_display_matches_serde() {
        for t in [
            NodeType::Board,
            NodeType::Card,
            NodeType::Checklist,
            NodeType::ChecklistItem,
            NodeType::File,
        ] {
            assert_eq!(serde_json::to_value(t).unwrap(), t.to_string());
        }
    }
}
