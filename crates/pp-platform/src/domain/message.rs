//! Direct Messages between accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: Option<String>,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender_id: impl Into<String>, recipient_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            subject: None,
            body: body.into(),
            read_at: None,
            created_at: super::now(),
        }
    }

    /// Sender and recipient may both read a message.
    pub fn is_participant(&self, account_id: &str) -> bool {
        self.sender_id == account_id || self.recipient_id == account_id
    }
}
