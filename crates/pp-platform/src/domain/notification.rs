//! In-app Notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Owned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ContractSent,
    ContractSigned,
    InvoiceSent,
    ApplicationReceived,
    ApplicationDecided,
    MessageReceived,
}

text_enum!(NotificationKind {
    ContractSent => "contract_sent",
    ContractSigned => "contract_signed",
    InvoiceSent => "invoice_sent",
    ApplicationReceived => "application_received",
    ApplicationDecided => "application_decided",
    MessageReceived => "message_received",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub account_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        account_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_id(),
            account_id: account_id.into(),
            kind,
            title: title.into(),
            body: body.into(),
            entity_type: None,
            entity_id: None,
            read_at: None,
            created_at: super::now(),
        }
    }

    pub fn for_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl Owned for Notification {
    const ENTITY: &'static str = "Notification";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.account_id
    }
}
