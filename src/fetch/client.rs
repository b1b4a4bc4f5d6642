//! Board source port and its Trello HTTP implementation.

use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use super::FetchError;

/// Default Trello REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.trello.com/1";

/// Board fields and embedded resources requested in the single board call.
pub const BOARD_QUERY: &[(&str, &str)] = &[
    ("fields", "desc,id,name,url"),
    ("cards", "visible"),
    ("card_fields", "id,idChecklists,idList,name,desc,due,url"),
    ("card_attachments", "true"),
    ("card_attachments_fields", "id,url,name,pos"),
    ("checklists", "all"),
    ("checklist_fields", "all"),
    ("lists", "open"),
    ("list_fields", "id,name,pos"),
];

/// Source of raw board documents.
///
/// Implemented by [`TrelloClient`] for the real API; tests substitute
/// canned JSON.
pub trait BoardSource: Send + Sync {
    /// Fetch the board with its lists, cards, checklists and attachments
    /// embedded in one JSON document.
    fn fetch_board(
        &self,
        board_id: &str,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Trello REST client authenticated with an API key and token.
pub struct TrelloClient {
    client: reqwest::Client,
    api_url: String,
    key: String,
    token: String,
}

impl TrelloClient {
    /// Create a client against the public Trello API.
    pub fn new(key: String, token: String) -> Self {
        Self::with_api_url(DEFAULT_API_URL.to_string(), key, token)
    }

    /// Create a client against a custom endpoint.
    pub fn with_api_url(api_url: String, key: String, token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            key,
            token,
        }
    }

    /// URL of the board endpoint for `board_id`.
    #[must_use]
    pub fn board_url(&self, board_id: &str) -> String {
        format!("{}/boards/{board_id}", self.api_url)
    }
}

impl BoardSource for TrelloClient {
    async fn fetch_board(&self, board_id: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(self.board_url(board_id))
            .query(BOARD_QUERY)
            .query(&[("key", self.key.as_str()), ("token", self.token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
