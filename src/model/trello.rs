//! Raw Trello API payloads.
//!
//! Field names follow the API's camelCase. Entities that get a node keep
//! their untouched JSON next to the typed view (see [`Raw`]) so digests are
//! computed over exactly what the API returned.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::ops::Deref;

/// A typed API entity together with the raw JSON it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Raw<T> {
    pub value: T,
    pub raw: Value,
}

impl<T: DeserializeOwned> Raw<T> {
    /// Parse a raw JSON value, keeping a copy of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not match `T`.
    pub fn from_value(raw: Value) -> serde_json::Result<Self> {
        let value = T::deserialize(&raw)?;
        Ok(Self { value, raw })
    }
}

impl<T> Deref for Raw<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Raw<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(raw).map_err(serde::de::Error::custom)
    }
}

impl<T> Serialize for Raw<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Response of `GET /boards/{id}` with embedded lists, cards and checklists.
#[derive(Debug, Clone, Deserialize)]
pub struct TrelloBoardResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub cards: Vec<Raw<TrelloCard>>,
    #[serde(default)]
    pub checklists: Vec<Raw<TrelloChecklist>>,
    #[serde(default)]
    pub lists: Vec<TrelloList>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pos: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloCard {
    pub id: String,
    pub id_list: String,
    #[serde(default)]
    pub id_checklists: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub attachments: Vec<TrelloAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloAttachment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub pos: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloChecklist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub id_card: Option<String>,
    #[serde(default)]
    pub check_items: Vec<Raw<TrelloCheckItem>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloCheckItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub id_checklist: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
