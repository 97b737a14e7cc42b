//! Invoice Entity
//!
//! Invoice numbers follow `PP-{YYYY}-{NNNN}` and restart at `0001` every year.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Owned;

pub const INVOICE_PREFIX: &str = "PP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Cancelled,
}

text_enum!(InvoiceStatus {
    Draft => "draft",
    Sent => "sent",
    Paid => "paid",
    Cancelled => "cancelled",
});

impl InvoiceStatus {
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Cancelled) | (Sent, Paid) | (Sent, Cancelled)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub club_id: String,
    pub sponsor_id: String,
    pub contract_id: Option<String>,
    pub invoice_number: String,
    pub amount_cents: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        club_id: impl Into<String>,
        sponsor_id: impl Into<String>,
        invoice_number: impl Into<String>,
        amount_cents: i64,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            club_id: club_id.into(),
            sponsor_id: sponsor_id.into(),
            contract_id: None,
            invoice_number: invoice_number.into(),
            amount_cents,
            issue_date,
            due_date,
            status: InvoiceStatus::Draft,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Invoice {
    const ENTITY: &'static str = "Invoice";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}

/// `PP-{year}-` prefix shared by every invoice of that year
pub fn invoice_year_prefix(year: i32) -> String {
    format!("{}-{}-", INVOICE_PREFIX, year)
}

/// Next invoice number for `year`, given the numbers already issued.
///
/// Numbers from other years and unparseable suffixes are ignored.
pub fn next_invoice_number<'a, I>(year: i32, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = invoice_year_prefix(year);
    let last = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(prefix.as_str()))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{:04}", prefix, last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_number_same_year() {
        let existing = ["PP-2024-0001", "PP-2024-0002", "PP-2024-0003", "PP-2024-0004"];
        assert_eq!(next_invoice_number(2024, existing), "PP-2024-0005");
    }

    #[test]
    fn test_new_year_restarts() {
        let existing = ["PP-2024-0001", "PP-2024-0002"];
        assert_eq!(next_invoice_number(2025, existing), "PP-2025-0001");
        assert_eq!(next_invoice_number(2025, Vec::<&str>::new()), "PP-2025-0001");
    }

    #[test]
    fn test_gaps_and_ordering() {
        let existing = ["PP-2024-0009", "PP-2024-0002"];
        assert_eq!(next_invoice_number(2024, existing), "PP-2024-0010");
    }

    #[test]
    fn test_garbage_suffix_ignored() {
        let existing = ["PP-2024-0003", "PP-2024-draft", "XX-2024-0099"];
        assert_eq!(next_invoice_number(2024, existing), "PP-2024-0004");
    }

    #[test]
    fn test_beyond_four_digits() {
        let existing = ["PP-2024-9999"];
        assert_eq!(next_invoice_number(2024, existing), "PP-2024-10000");
    }

    #[test]
    fn test_status_transitions() {
        use InvoiceStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Paid));
        assert!(Sent.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Sent));
    }
}
