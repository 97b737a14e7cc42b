//! Budget and Expense Entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Owned;

/// Seasonal budget owned by a club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub club_id: String,
    pub name: String,
    pub season: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        club_id: impl Into<String>,
        name: impl Into<String>,
        season: impl Into<String>,
        total_cents: i64,
    ) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            club_id: club_id.into(),
            name: name.into(),
            season: season.into(),
            total_cents,
            created_at: now,
            updated_at: now,
        }
    }

    /// Remaining amount after `spent_cents`; negative when overspent.
    pub fn remaining_cents(&self, spent_cents: i64) -> i64 {
        self.total_cents - spent_cents
    }
}

impl Owned for Budget {
    const ENTITY: &'static str = "Budget";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}

/// Expense booked against a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub budget_id: String,
    pub description: String,
    pub amount_cents: i64,
    pub spent_on: NaiveDate,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        budget_id: impl Into<String>,
        description: impl Into<String>,
        amount_cents: i64,
        spent_on: NaiveDate,
    ) -> Self {
        Self {
            id: super::new_id(),
            budget_id: budget_id.into(),
            description: description.into(),
            amount_cents,
            spent_on,
            category: None,
            created_at: super::now(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining() {
        let budget = Budget::new("club-1", "Kit", "2024/25", 10_000);
        assert_eq!(budget.remaining_cents(2_500), 7_500);
        assert_eq!(budget.remaining_cents(12_000), -2_000);
        assert_eq!(budget.owner_id(), "club-1");
    }
}
