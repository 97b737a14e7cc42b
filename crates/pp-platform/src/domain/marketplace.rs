//! Marketplace Opportunities and Sponsor Applications

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Owned;
use crate::error::{PlatformError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    Open,
    Closed,
}

text_enum!(OpportunityStatus {
    Open => "open",
    Closed => "closed",
});

/// Sponsorship package listed by a club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub club_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price_cents: i64,
    pub status: OpportunityStatus,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn new(
        club_id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            club_id: club_id.into(),
            title: title.into(),
            description: None,
            category: category.into(),
            price_cents,
            status: OpportunityStatus::Open,
            available_from: None,
            available_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OpportunityStatus::Open
    }
}

impl Owned for Opportunity {
    const ENTITY: &'static str = "Opportunity";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

text_enum!(ApplicationStatus {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
});

/// A sponsor's expression of interest in an opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub opportunity_id: String,
    pub sponsor_id: String,
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(opportunity_id: impl Into<String>, sponsor_id: impl Into<String>) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            opportunity_id: opportunity_id.into(),
            sponsor_id: sponsor_id.into(),
            message: None,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn decide(&mut self, decision: ApplicationStatus) -> Result<()> {
        if decision == ApplicationStatus::Pending {
            return Err(PlatformError::validation("Decision must be accepted or rejected"));
        }
        if self.status != ApplicationStatus::Pending {
            return Err(PlatformError::conflict(format!(
                "Application already {}",
                self.status
            )));
        }
        self.status = decision;
        self.updated_at = super::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_once() {
        let mut app = Application::new("opp-1", "sponsor-1");
        app.decide(ApplicationStatus::Accepted).unwrap();
        assert_eq!(app.status, ApplicationStatus::Accepted);
        assert!(app.decide(ApplicationStatus::Rejected).is_err());
    }

    #[test]
    fn test_pending_is_not_a_decision() {
        let mut app = Application::new("opp-1", "sponsor-1");
        assert!(matches!(
            app.decide(ApplicationStatus::Pending),
            Err(PlatformError::Validation { .. })
        ));
    }

    #[test]
    fn test_new_opportunity_is_open() {
        let opp = Opportunity::new("club-1", "LED boards", "advertising", 120_000);
        assert!(opp.is_open());
    }
}
