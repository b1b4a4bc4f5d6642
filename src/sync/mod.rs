//! Sync orchestration.
//!
//! One run is:
//!
//! 1. **Fetch** the board (failures degrade to an empty card set)
//! 2. **Resolve** every card attachment to a file node, concurrently
//!    (downloads only; nothing is written to the node store yet)
//! 3. **Build** the node graph in hierarchy order
//! 4. **Emit** nodes, links and file registrations to the node store, in
//!    order
//!
//! The run logs exactly one info line when it starts and one when it
//! finishes. Everything else goes to debug, or to warn/error when something
//! degrades.
//!
//! # Example
//!
//! ```ignore
//! use tbs::sync::SyncPipeline;
//!
//! let pipeline = SyncPipeline::new(&client, &files, &cache, &store);
//! let report = pipeline.run("board_id").await?;
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::MediaCache;
use crate::digest::content_digest;
use crate::error::Result;
use crate::fetch::{fetch_board, BoardSource};
use crate::graph::{build_graph, BoardGraph, DigestFn, Emit};
use crate::media::{MediaResolver, MediaStats, RemoteFiles};
use crate::model::NodeType;
use crate::store::NodeStore;

/// Summary of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub board_id: String,
    /// True when the fetch failed and nothing was emitted.
    pub degraded: bool,
    pub cards: usize,
    pub checklists: usize,
    pub items: usize,
    pub nodes: usize,
    pub links: usize,
    /// Cards left out because their list is not open.
    pub skipped_cards: usize,
    pub media: MediaStats,
}

/// Wires the fetcher, media resolver, graph builder and node store together.
pub struct SyncPipeline<'a, S, F> {
    source: &'a S,
    files: &'a F,
    cache: &'a dyn MediaCache,
    store: &'a dyn NodeStore,
    digest: DigestFn<'a>,
}

impl<'a, S: BoardSource, F: RemoteFiles> SyncPipeline<'a, S, F> {
    /// Create a pipeline using SHA256 content digests.
    pub fn new(
        source: &'a S,
        files: &'a F,
        cache: &'a dyn MediaCache,
        store: &'a dyn NodeStore,
    ) -> Self {
        Self {
            source,
            files,
            cache,
            store,
            digest: &content_digest,
        }
    }

    /// Replace the digest function.
    #[must_use]
    pub fn with_digest(mut self, digest: DigestFn<'a>) -> Self {
        self.digest = digest;
        self
    }

    /// Run one sync of `board_id`.
    ///
    /// Fetch and media failures are contained and reflected in the report.
    ///
    /// # Errors
    ///
    /// Returns an error only if the node store rejects a write, including a
    /// file registration; emission stops at that point since the remaining
    /// operations would attach to a partial tree.
    pub async fn run(&self, board_id: &str) -> Result<SyncReport> {
        info!(board_id, "Starting Trello board sync");

        let mut fetched = fetch_board(self.source, board_id).await;

        let resolver = MediaResolver::new(self.cache, self.files);
        resolver.resolve_cards(&mut fetched.cards).await;

        let mut report = SyncReport {
            board_id: board_id.to_string(),
            degraded: fetched.is_degraded(),
            skipped_cards: fetched.skipped.len(),
            media: resolver.stats(),
            ..SyncReport::default()
        };

        if let Some(board) = &fetched.board {
            let graph = build_graph(board, &fetched.cards, self.digest);
            emit(&graph, self.store)?;

            report.cards = graph.count(NodeType::Card);
            report.checklists = graph.count(NodeType::Checklist);
            report.items = graph.count(NodeType::ChecklistItem);
            report.nodes = graph.nodes.len();
            report.links = graph.link_count();
        }

        info!(
            board_id,
            cards = report.cards,
            nodes = report.nodes,
            links = report.links,
            degraded = report.degraded,
            "Finished Trello board sync"
        );
        Ok(report)
    }
}

/// Send a graph's operations to the store in emission order.
fn emit(graph: &BoardGraph, store: &dyn NodeStore) -> Result<()> {
    for step in &graph.emits {
        match *step {
            Emit::Node(index) => store.create_node(&graph.nodes[index])?,
            Emit::Link { parent, child } => {
                store.create_parent_child_link(&graph.nodes[parent], &graph.nodes[child])?;
            }
            Emit::File(index) => store.register_file(&graph.files[index])?,
            Emit::Touch(index) => store.touch_node(&graph.files[index].id)?,
        }
    }
    debug!(operations = graph.emits.len(), "Emitted board graph");
    Ok(())
}
