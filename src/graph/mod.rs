//! Graph construction.
//!
//! Turns a board and its enriched cards into typed nodes and an ordered
//! list of store operations. The order is pre-order depth-first:
//!
//! ```text
//! Board
//! └── Card            (source order)
//!     └── Checklist   (source order)
//!         └── Item    (source order)
//! ```
//!
//! Each node is created immediately before the link to its parent, so a
//! consumer reading the operations in order always sees a parent before
//! any of its children. A card's resolved files are registered just before
//! the card itself, so its `localFile___NODE` references never point
//! forward. Files reused from the media cache are also touched.
//!
//! Digests are taken over the raw upstream objects, never over the built
//! node, so unchanged upstream data yields identical digests every run.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::model::{
    Board, BoardNode, Card, CardNode, ChecklistItemNode, ChecklistNode, FileNode, Internal, Node,
    NodeType, Raw, TrelloCheckItem, TrelloChecklist,
};

/// Media type of nodes whose text content is markdown.
pub const MARKDOWN: &str = "text/markdown";

/// Digest function applied to raw upstream objects.
pub type DigestFn<'a> = &'a dyn Fn(&Value) -> String;

fn internal(node_type: NodeType, digest: String, media_type: Option<&str>) -> Internal {
    Internal {
        node_type,
        content_digest: digest,
        media_type: media_type.map(str::to_string),
    }
}

#[must_use]
pub fn to_board_node(board: &Board, digest: DigestFn<'_>) -> BoardNode {
    BoardNode {
        id: board.id.clone(),
        name: board.name.clone(),
        desc: board.desc.clone(),
        url: board.url.clone(),
        internal: internal(NodeType::Board, digest(&board.raw), Some(MARKDOWN)),
    }
}

/// Build a card node. The card's attachments are copied as they are, so
/// resolve media before calling this.
#[must_use]
pub fn to_card_node(card: &Card, digest: DigestFn<'_>) -> CardNode {
    CardNode {
        id: card.id.clone(),
        list_index: card.list_index,
        list_id: card.list_id.clone(),
        list_slug: card.list_slug.clone(),
        list_name: card.list_name.clone(),
        index: card.index,
        slug: card.slug.clone(),
        name: card.name.clone(),
        content: card.content.clone(),
        medias: card.medias.clone(),
        due: normalize_due(card.due.as_deref()),
        url: card.url.clone(),
        internal: internal(NodeType::Card, digest(&card.raw), Some(MARKDOWN)),
    }
}

#[must_use]
pub fn to_checklist_node(checklist: &Raw<TrelloChecklist>, digest: DigestFn<'_>) -> ChecklistNode {
    ChecklistNode {
        id: checklist.id.clone(),
        name: checklist.name.clone(),
        internal: internal(NodeType::Checklist, digest(&checklist.raw), None),
    }
}

#[must_use]
pub fn to_checklist_item_node(
    item: &Raw<TrelloCheckItem>,
    digest: DigestFn<'_>,
) -> ChecklistItemNode {
    ChecklistItemNode {
        id: item.id.clone(),
        name: item.name.clone(),
        state: item.state.clone(),
        internal: internal(NodeType::ChecklistItem, digest(&item.raw), None),
    }
}

/// Parse a due date. Absent or unparseable dates become `None`.
#[must_use]
pub fn normalize_due(due: Option<&str>) -> Option<DateTime<Utc>> {
    let due = due.filter(|d| !d.is_empty())?;
    match DateTime::parse_from_rfc3339(due) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            warn!(due, error = %e, "Ignoring unparseable due date");
            None
        }
    }
}

/// One step of graph emission.
///
/// `Node` and `Link` indices point into [`BoardGraph::nodes`]; `File` and
/// `Touch` indices point into [`BoardGraph::files`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Node(usize),
    Link { parent: usize, child: usize },
    File(usize),
    Touch(usize),
}

/// Nodes of one board plus the order to emit them in.
#[derive(Debug, Clone, Default)]
pub struct BoardGraph {
    pub nodes: Vec<Node>,
    pub files: Vec<FileNode>,
    pub emits: Vec<Emit>,
}

impl BoardGraph {
    fn push_file(&mut self, file: FileNode, reused: bool) {
        let index = self.files.len();
        self.files.push(file);
        self.emits.push(Emit::File(index));
        if reused {
            self.emits.push(Emit::Touch(index));
        }
    }

    fn push_node(&mut self, node: Node, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.emits.push(Emit::Node(index));
        if let Some(parent) = parent {
            self.emits.push(Emit::Link {
                parent,
                child: index,
            });
        }
        index
    }

    /// Number of parent-child links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.emits
            .iter()
            .filter(|e| matches!(e, Emit::Link { .. }))
            .count()
    }

    /// Number of nodes of one type.
    #[must_use]
    pub fn count(&self, node_type: NodeType) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.node_type() == node_type)
            .count()
    }
}

/// Build the node graph for a board.
#[must_use]
pub fn build_graph(board: &Board, cards: &[Card], digest: DigestFn<'_>) -> BoardGraph {
    let mut graph = BoardGraph::default();
    let root = graph.push_node(Node::Board(to_board_node(board, digest)), None);

    for card in cards {
        for file in &card.files {
            graph.push_file(file.node.clone(), file.reused);
        }
        let card_index = graph.push_node(Node::Card(to_card_node(card, digest)), Some(root));

        for checklist in &card.checklists {
            let checklist_index = graph.push_node(
                Node::Checklist(to_checklist_node(checklist, digest)),
                Some(card_index),
            );

            for item in &checklist.check_items {
                graph.push_node(
                    Node::ChecklistItem(to_checklist_item_node(item, digest)),
                    Some(checklist_index),
                );
            }
        }
    }

    graph
}
