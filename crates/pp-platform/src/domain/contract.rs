//! Sponsorship Contract Entity
//!
//! Document lifecycle: `draft → sent → viewed → signed`.
//! Sending issues an unguessable sign token; viewing and signing happen
//! through that token without a bearer token.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Owned;
use crate::error::{PlatformError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Draft,
    Sent,
    Viewed,
    Signed,
}

text_enum!(ContractStatus {
    Draft => "draft",
    Sent => "sent",
    Viewed => "viewed",
    Signed => "signed",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub club_id: String,
    pub sponsor_id: String,
    pub title: String,
    pub terms: Option<String>,
    pub value_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContractStatus,
    pub sign_token: Option<String>,
    pub signed_by: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(
        club_id: impl Into<String>,
        sponsor_id: impl Into<String>,
        title: impl Into<String>,
        value_cents: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            club_id: club_id.into(),
            sponsor_id: sponsor_id.into(),
            title: title.into(),
            terms: None,
            value_cents,
            start_date,
            end_date,
            status: ContractStatus::Draft,
            sign_token: None,
            signed_by: None,
            signed_at: None,
            viewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    pub fn is_editable(&self) -> bool {
        self.status == ContractStatus::Draft
    }

    /// Move a draft to `sent` and issue its sign token.
    pub fn send(&mut self) -> Result<&str> {
        if self.status != ContractStatus::Draft {
            return Err(PlatformError::conflict(format!(
                "Contract is {} and cannot be sent",
                self.status
            )));
        }
        self.status = ContractStatus::Sent;
        self.updated_at = super::now();
        let token = self.sign_token.insert(generate_sign_token());
        Ok(token.as_str())
    }

    /// Record the first view through the sign token. Returns true if the status changed.
    pub fn mark_viewed(&mut self) -> bool {
        if self.status != ContractStatus::Sent {
            return false;
        }
        let now = super::now();
        self.status = ContractStatus::Viewed;
        self.viewed_at = Some(now);
        self.updated_at = now;
        true
    }

    pub fn sign(&mut self, signer_name: impl Into<String>) -> Result<()> {
        match self.status {
            ContractStatus::Sent | ContractStatus::Viewed => {
                let now = super::now();
                self.status = ContractStatus::Signed;
                self.signed_by = Some(signer_name.into());
                self.signed_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            ContractStatus::Signed => Err(PlatformError::conflict("Contract is already signed")),
            ContractStatus::Draft => Err(PlatformError::conflict("Contract has not been sent")),
        }
    }
}

impl Owned for Contract {
    const ENTITY: &'static str = "Contract";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}

/// 64 hex characters drawn from two random UUIDs
fn generate_sign_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> Contract {
        Contract::new(
            "club-1",
            "sponsor-1",
            "Shirt sponsorship",
            5_000_000,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
    }

    #[test]
    fn test_full_lifecycle() {
        let mut c = contract();
        assert!(c.is_editable());

        let token = c.send().unwrap().to_string();
        assert_eq!(token.len(), 64);
        assert_eq!(c.status, ContractStatus::Sent);
        assert!(!c.is_editable());

        assert!(c.mark_viewed());
        assert!(!c.mark_viewed());
        assert_eq!(c.status, ContractStatus::Viewed);
        assert!(c.viewed_at.is_some());

        c.sign("Jane Doe").unwrap();
        assert_eq!(c.status, ContractStatus::Signed);
        assert_eq!(c.signed_by.as_deref(), Some("Jane Doe"));
        assert!(c.signed_at.is_some());
    }

    #[test]
    fn test_sign_without_view() {
        let mut c = contract();
        c.send().unwrap();
        assert!(c.sign("Jane Doe").is_ok());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut c = contract();
        assert!(c.sign("Jane Doe").is_err());

        c.send().unwrap();
        assert!(c.send().is_err());

        c.sign("Jane Doe").unwrap();
        assert!(matches!(c.sign("Again"), Err(PlatformError::Conflict { .. })));
        assert!(!c.mark_viewed());
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_sign_token(), generate_sign_token());
    }
}
