//! Data types for the board sync.
//!
//! - [`trello`] - Raw API payloads as returned by the board endpoint
//! - [`card`] - Enriched board entities produced by the fetcher
//! - [`node`] - Typed node payloads handed to the node store

pub mod card;
pub mod node;
pub mod trello;

pub use card::{Board, Card, MediaAttachment};
pub use node::{
    BoardNode, CardNode, ChecklistItemNode, ChecklistNode, FileNode, Internal, Node, NodeType,
    ResolvedFile,
};
pub use trello::{
    Raw, TrelloAttachment, TrelloBoardResponse, TrelloCard, TrelloCheckItem, TrelloChecklist,
    TrelloList,
};
