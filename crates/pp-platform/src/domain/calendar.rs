//! Club Calendar Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Owned;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub club_id: String,
    pub title: String,
    /// Free-form type, e.g. "match", "hospitality", "activation"
    pub event_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn new(
        club_id: impl Into<String>,
        title: impl Into<String>,
        event_type: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: super::new_id(),
            club_id: club_id.into(),
            title: title.into(),
            event_type: event_type.into(),
            starts_at,
            ends_at,
            location: None,
            created_at: super::now(),
        }
    }
}

impl Owned for CalendarEvent {
    const ENTITY: &'static str = "CalendarEvent";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}
