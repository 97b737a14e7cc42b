//! Admin CRM: notes and tags attached to clubs and sponsors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kinds of accounts CRM records can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CrmEntityType {
    Club,
    Sponsor,
}

text_enum!(CrmEntityType {
    Club => "club",
    Sponsor => "sponsor",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub author_id: String,
    pub entity_type: CrmEntityType,
    pub entity_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(
        author_id: impl Into<String>,
        entity_type: CrmEntityType,
        entity_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_id(),
            author_id: author_id.into(),
            entity_type,
            entity_id: entity_id.into(),
            body: body.into(),
            created_at: super::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            name: name.into(),
            color: None,
            created_at: super::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagAssignment {
    pub tag_id: String,
    pub entity_type: CrmEntityType,
    pub entity_id: String,
    pub created_at: DateTime<Utc>,
}
