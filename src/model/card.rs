//! Enriched board entities.
//!
//! These are what the fetcher hands to the graph builder: cards already
//! joined with their list, checklists and attachments.

use serde::Serialize;
use serde_json::Value;

use super::node::ResolvedFile;
use super::trello::{Raw, TrelloChecklist};

/// The board being synced. Root of the node hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub url: String,
    /// The board's own fields as fetched (`id`, `name`, `desc`, `url`).
    #[serde(skip)]
    pub raw: Value,
}

/// A media attachment on a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAttachment {
    pub id: String,
    pub name: String,
    pub url: String,
    pub pos: f64,
    pub slug: String,
    /// Id of the local file node once the attachment has been resolved.
    #[serde(rename = "localFile___NODE", skip_serializing_if = "Option::is_none")]
    pub local_file: Option<String>,
}

/// A card joined with its list, checklists and attachments.
#[derive(Debug, Clone)]
pub struct Card {
    pub list_index: usize,
    pub list_id: String,
    pub list_slug: String,
    pub list_name: String,
    /// Position of the card in the fetched card sequence.
    pub index: usize,
    pub id: String,
    pub slug: String,
    pub name: String,
    pub content: String,
    pub medias: Vec<MediaAttachment>,
    /// File nodes for `medias` that resolved, in attachment order.
    pub files: Vec<ResolvedFile>,
    /// Due date exactly as the API returned it.
    pub due: Option<String>,
    pub url: String,
    pub checklists: Vec<Raw<TrelloChecklist>>,
    /// The card object as fetched, used for its digest.
    pub raw: Value,
}
