//! Board fetching and joining.
//!
//! One request returns the whole board. The join step then enriches every
//! card, in source order, with:
//!
//! - its owning list's index, id, name and slug
//! - its checklists, dereferenced from `idChecklists`
//! - its attachments, with a slug derived from the file name stem
//!
//! Fetch failures never propagate: they are logged and the run continues
//! with an empty card set.

mod client;

pub use client::{BoardSource, TrelloClient, BOARD_QUERY, DEFAULT_API_URL};

use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, error, warn};

use crate::model::{Board, Card, MediaAttachment, TrelloBoardResponse};
use crate::slug::{slugify, slugify_stem};

/// Errors contacting or parsing the board API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid board payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A card that could not be joined and was left out of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCard {
    pub card_id: String,
    pub list_id: String,
}

/// Result of one fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchedBoard {
    /// `None` when the fetch failed.
    pub board: Option<Board>,
    pub cards: Vec<Card>,
    /// Cards whose list is not among the board's open lists.
    pub skipped: Vec<SkippedCard>,
}

impl FetchedBoard {
    /// Whether the fetch failed and the run is degraded.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.board.is_none()
    }
}

/// Fetch and join a board, degrading to an empty result on failure.
pub async fn fetch_board<S: BoardSource>(source: &S, board_id: &str) -> FetchedBoard {
    let joined = match source.fetch_board(board_id).await {
        Ok(doc) => join_board(doc),
        Err(e) => Err(e),
    };

    match joined {
        Ok(fetched) => {
            debug!(
                board_id,
                cards = fetched.cards.len(),
                skipped = fetched.skipped.len(),
                "Fetched board"
            );
            fetched
        }
        Err(e) => {
            error!(board_id, error = %e, "Error while fetching cards");
            FetchedBoard::default()
        }
    }
}

/// Index items by id, keeping each item's position in the source sequence.
fn key_by_id<'a, T>(items: &'a [T], id: impl Fn(&T) -> &str) -> HashMap<&'a str, (usize, &'a T)> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| (id(item), (index, item)))
        .collect()
}

/// Join a raw board document into a board and its enriched cards.
///
/// Cards whose list is not an open list of the board are skipped and
/// reported in [`FetchedBoard::skipped`]. Checklist ids with no matching
/// checklist are dropped from the card.
///
/// # Errors
///
/// Returns an error if the document is not a board payload.
pub fn join_board(doc: Value) -> Result<FetchedBoard, FetchError> {
    let response: TrelloBoardResponse = serde_json::from_value(doc)?;

    let board = Board {
        raw: json!({
            "id": response.id,
            "name": response.name,
            "desc": response.desc,
            "url": response.url,
        }),
        id: response.id.clone(),
        name: response.name.clone(),
        desc: response.desc.clone(),
        url: response.url.clone(),
    };

    let lists_by_id = key_by_id(&response.lists, |l| l.id.as_str());
    let checklists_by_id = key_by_id(&response.checklists, |c| c.id.as_str());

    let mut cards = Vec::with_capacity(response.cards.len());
    let mut skipped = Vec::new();

    for (index, card) in response.cards.iter().enumerate() {
        let Some(&(list_index, list)) = lists_by_id.get(card.id_list.as_str()) else {
            warn!(
                card_id = %card.id,
                list_id = %card.id_list,
                "Skipping card whose list is not an open list of the board"
            );
            skipped.push(SkippedCard {
                card_id: card.id.clone(),
                list_id: card.id_list.clone(),
            });
            continue;
        };

        let checklists = card
            .id_checklists
            .iter()
            .filter_map(|id| {
                let found = checklists_by_id.get(id.as_str()).map(|&(_, c)| c.clone());
                if found.is_none() {
                    warn!(card_id = %card.id, checklist_id = %id, "Dropping unknown checklist");
                }
                found
            })
            .collect();

        let medias = card
            .attachments
            .iter()
            .map(|a| MediaAttachment {
                id: a.id.clone(),
                name: a.name.clone(),
                url: a.url.clone(),
                pos: a.pos,
                slug: slugify_stem(&a.name),
                local_file: None,
            })
            .collect();

        cards.push(Card {
            list_index,
            list_id: card.id_list.clone(),
            list_slug: slugify(&list.name),
            list_name: list.name.clone(),
            index,
            id: card.id.clone(),
            slug: slugify(&card.name),
            name: card.name.clone(),
            content: card.desc.clone(),
            medias,
            files: Vec::new(),
            due: card.due.clone(),
            url: card.url.clone(),
            checklists,
            raw: card.raw.clone(),
        });
    }

    Ok(FetchedBoard {
        board: Some(board),
        cards,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_doc(cards: Value) -> Value {
        json!({
            "id": "board_1",
            "name": "Recipes",
            "desc": "A Cool Recipe Board",
            "url": "https://trello.com/b/abc/recipes",
            "lists": [
                {"id": "list_a", "name": "To Do", "pos": 1},
                {"id": "list_b", "name": "Done!", "pos": 2}
            ],
            "checklists": [
                {"id": "cl_1", "name": "Fruits", "idCard": "card_1", "checkItems": [
                    {"id": "ci_1", "name": "Melon", "state": "incomplete"}
                ]}
            ],
            "cards": cards
        })
    }

    #[test]
    fn test_join_enriches_cards_in_order() {
        let doc = board_doc(json!([
            {"id": "card_1", "idList": "list_b", "name": "First Card", "desc": "d1",
             "idChecklists": ["cl_1"], "attachments": []},
            {"id": "card_2", "idList": "list_a", "name": "Second Card", "desc": "d2",
             "idChecklists": [], "attachments": []}
        ]));

        let fetched = join_board(doc).unwrap();

        assert_eq!(fetched.cards.len(), 2);
        let first = &fetched.cards[0];
        assert_eq!(first.id, "card_1");
        assert_eq!(first.index, 0);
        assert_eq!(first.list_index, 1);
        assert_eq!(first.list_name, "Done!");
        assert_eq!(first.list_slug, "done");
        assert_eq!(first.slug, "first_card");
        assert_eq!(first.content, "d1");
        assert_eq!(first.checklists.len(), 1);
        assert_eq!(first.checklists[0].check_items.len(), 1);

        let second = &fetched.cards[1];
        assert_eq!(second.index, 1);
        assert_eq!(second.list_index, 0);
        assert!(second.checklists.is_empty());
    }

    #[test]
    fn test_join_board_raw_has_only_board_fields() {
        let fetched = join_board(board_doc(json!([]))).unwrap();
        let board = fetched.board.unwrap();

        assert_eq!(board.name, "Recipes");
        assert_eq!(
            board.raw,
            json!({
                "id": "board_1",
                "name": "Recipes",
                "desc": "A Cool Recipe Board",
                "url": "https://trello.com/b/abc/recipes"
            })
        );
    }

    #[test]
    fn test_join_skips_card_on_closed_list() {
        let doc = board_doc(json!([
            {"id": "card_1", "idList": "archived", "name": "Lost"},
            {"id": "card_2", "idList": "list_a", "name": "Kept"}
        ]));

        let fetched = join_board(doc).unwrap();

        assert_eq!(fetched.cards.len(), 1);
        assert_eq!(fetched.cards[0].id, "card_2");
        // source position is kept even when an earlier card is skipped
        assert_eq!(fetched.cards[0].index, 1);
        assert_eq!(
            fetched.skipped,
            vec![SkippedCard {
                card_id: "card_1".into(),
                list_id: "archived".into()
            }]
        );
    }

    #[test]
    fn test_join_drops_unknown_checklist() {
        let doc = board_doc(json!([
            {"id": "card_1", "idList": "list_a", "name": "Card",
             "idChecklists": ["missing", "cl_1"]}
        ]));

        let fetched = join_board(doc).unwrap();

        let ids: Vec<&str> = fetched.cards[0].checklists.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cl_1"]);
    }

    #[test]
    fn test_join_attachment_slugs() {
        let doc = board_doc(json!([
            {"id": "card_1", "idList": "list_a", "name": "Card", "attachments": [
                {"id": "att_1", "name": "Hero Image.png", "url": "https://x/hero.png", "pos": 1},
                {"id": "att_2", "name": "Mockup Final", "url": "https://x/mockup", "pos": 2}
            ]}
        ]));

        let fetched = join_board(doc).unwrap();
        let medias = &fetched.cards[0].medias;

        assert_eq!(medias[0].slug, "hero_image");
        assert_eq!(medias[1].slug, "mockup_final");
        assert!(medias.iter().all(|m| m.local_file.is_none()));
    }

    #[test]
    fn test_join_rejects_non_board() {
        assert!(join_board(json!(["not", "a", "board"])).is_err());
    }

    struct FailingSource;

    impl BoardSource for FailingSource {
        async fn fetch_board(&self, _board_id: &str) -> Result<Value, FetchError> {
            Err(FetchError::Status {
                status: 401,
                body: "invalid token".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let fetched = fetch_board(&FailingSource, "board_1").await;

        assert!(fetched.is_degraded());
        assert!(fetched.cards.is_empty());
    }
}
