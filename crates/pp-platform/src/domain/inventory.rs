//! Inventory Assets, Bookings and Sponsorship Rights
//!
//! Business checks live here as pure functions so they can be exercised
//! without a database:
//! - booking availability against an asset's quantity
//! - category exclusivity between rights held by different sponsors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ranges_overlap, Owned};
use crate::error::{PlatformError, Result};

/// Bookable inventory (LED boards, hospitality boxes, shirt slots...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAsset {
    pub id: String,
    pub club_id: String,
    pub name: String,
    pub asset_type: String,
    /// Units that can be booked concurrently
    pub quantity: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryAsset {
    pub fn new(
        club_id: impl Into<String>,
        name: impl Into<String>,
        asset_type: impl Into<String>,
        quantity: i64,
    ) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            club_id: club_id.into(),
            name: name.into(),
            asset_type: asset_type.into(),
            quantity,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for InventoryAsset {
    const ENTITY: &'static str = "InventoryAsset";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

text_enum!(BookingStatus {
    Confirmed => "confirmed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub asset_id: String,
    pub club_id: String,
    pub sponsor_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub quantity: i64,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        asset: &InventoryAsset,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        quantity: i64,
    ) -> Self {
        Self {
            id: super::new_id(),
            asset_id: asset.id.clone(),
            club_id: asset.club_id.clone(),
            sponsor_id: None,
            starts_at,
            ends_at,
            quantity,
            status: BookingStatus::Confirmed,
            notes: None,
            created_at: super::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

impl Owned for Booking {
    const ENTITY: &'static str = "Booking";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}

/// Reject the request if confirmed bookings overlapping `[starts_at, ends_at)`
/// plus `quantity` would exceed the asset's capacity.
pub fn check_availability(
    asset: &InventoryAsset,
    existing: &[Booking],
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    quantity: i64,
) -> Result<()> {
    if ends_at <= starts_at {
        return Err(PlatformError::validation("endsAt must be after startsAt"));
    }
    if quantity < 1 {
        return Err(PlatformError::validation("quantity must be at least 1"));
    }

    if quantity > asset.quantity {
        return Err(PlatformError::conflict(format!(
            "Asset {} has only {} units",
            asset.name, asset.quantity
        )));
    }

    let booked = existing
        .iter()
        .filter(|b| b.asset_id == asset.id && b.is_active())
        .filter(|b| ranges_overlap(&b.starts_at, &b.ends_at, &starts_at, &ends_at))
        .try_fold(0i64, |acc, b| acc.checked_add(b.quantity));

    match booked.and_then(|b| b.checked_add(quantity).map(|total| (b, total))) {
        Some((_, total)) if total <= asset.quantity => Ok(()),
        Some((booked, _)) => Err(PlatformError::conflict(format!(
            "Asset {} has {} of {} units booked in the requested period",
            asset.name, booked, asset.quantity
        ))),
        None => Err(PlatformError::conflict(format!(
            "Asset {} is fully booked in the requested period",
            asset.name
        ))),
    }
}

/// Sponsorship right (naming, shirt, category exclusivity...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Right {
    pub id: String,
    pub club_id: String,
    pub name: String,
    pub category: String,
    pub exclusive: bool,
    pub sponsor_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Right {
    pub fn new(
        club_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            club_id: club_id.into(),
            name: name.into(),
            category: category.into(),
            exclusive: false,
            sponsor_id: None,
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Both date bounds are inclusive.
    fn overlaps(&self, other: &Right) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// Whether holding `self` and `other` at once breaks category exclusivity.
    pub fn conflicts_with(&self, other: &Right) -> bool {
        if self.id == other.id || self.club_id != other.club_id {
            return false;
        }
        if !self.category.eq_ignore_ascii_case(&other.category) {
            return false;
        }
        if !(self.exclusive || other.exclusive) {
            return false;
        }
        let different_sponsors = match (&self.sponsor_id, &other.sponsor_id) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        };
        different_sponsors && self.overlaps(other)
    }
}

impl Owned for Right {
    const ENTITY: &'static str = "Right";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.club_id
    }
}

pub fn check_exclusivity(candidate: &Right, existing: &[Right]) -> Result<()> {
    match existing.iter().find(|r| candidate.conflicts_with(r)) {
        Some(conflict) => Err(PlatformError::conflict(format!(
            "Right '{}' conflicts with exclusive right '{}' in category {}",
            candidate.name, conflict.name, conflict.category
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, day, hour, 0, 0).unwrap()
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn test_availability_respects_capacity() {
        let asset = InventoryAsset::new("club-1", "LED board", "digital", 2);
        let existing = vec![Booking::new(&asset, at(1, 10), at(1, 12), 1)];

        assert!(check_availability(&asset, &existing, at(1, 11), at(1, 13), 1).is_ok());
        assert!(matches!(
            check_availability(&asset, &existing, at(1, 11), at(1, 13), 2),
            Err(PlatformError::Conflict { .. })
        ));
    }

    #[test]
    fn test_availability_at_i64_limits() {
        let asset = InventoryAsset::new("club-1", "Season tickets", "ticketing", i64::MAX);
        let existing = vec![Booking::new(&asset, at(1, 10), at(1, 12), i64::MAX)];

        assert!(matches!(
            check_availability(&asset, &existing, at(1, 10), at(1, 12), 1),
            Err(PlatformError::Conflict { .. })
        ));

        let stacked = vec![existing[0].clone(), existing[0].clone()];
        assert!(matches!(
            check_availability(&asset, &stacked, at(1, 10), at(1, 12), 1),
            Err(PlatformError::Conflict { .. })
        ));
    }

    #[test]
    fn test_request_above_capacity() {
        let asset = InventoryAsset::new("club-1", "Box", "hospitality", 3);
        assert!(matches!(
            check_availability(&asset, &[], at(1, 10), at(1, 12), i64::MAX),
            Err(PlatformError::Conflict { .. })
        ));
    }

    #[test]
    fn test_adjacent_bookings_do_not_overlap() {
        let asset = InventoryAsset::new("club-1", "Box", "hospitality", 1);
        let existing = vec![Booking::new(&asset, at(1, 10), at(1, 12), 1)];
        assert!(check_availability(&asset, &existing, at(1, 12), at(1, 14), 1).is_ok());
    }

    #[test]
    fn test_cancelled_bookings_free_capacity() {
        let asset = InventoryAsset::new("club-1", "Box", "hospitality", 1);
        let mut booking = Booking::new(&asset, at(1, 10), at(1, 12), 1);
        booking.status = BookingStatus::Cancelled;
        assert!(check_availability(&asset, &[booking], at(1, 10), at(1, 12), 1).is_ok());
    }

    #[test]
    fn test_availability_validation() {
        let asset = InventoryAsset::new("club-1", "Box", "hospitality", 1);
        assert!(matches!(
            check_availability(&asset, &[], at(1, 12), at(1, 10), 1),
            Err(PlatformError::Validation { .. })
        ));
        assert!(check_availability(&asset, &[], at(1, 10), at(1, 12), 0).is_err());
    }

    fn right(category: &str, exclusive: bool, sponsor: &str, from: NaiveDate, to: NaiveDate) -> Right {
        let mut r = Right::new("club-1", format!("{} right", category), category, from, to);
        r.exclusive = exclusive;
        r.sponsor_id = Some(sponsor.to_string());
        r
    }

    #[test]
    fn test_exclusive_overlap_different_sponsor() {
        let held = right("beverage", true, "sponsor-a", date(1, 1), date(6, 30));
        let candidate = right("Beverage", false, "sponsor-b", date(6, 30), date(12, 31));
        assert!(check_exclusivity(&candidate, &[held]).is_err());
    }

    #[test]
    fn test_same_sponsor_may_hold_both() {
        let held = right("beverage", true, "sponsor-a", date(1, 1), date(6, 30));
        let candidate = right("beverage", true, "sponsor-a", date(3, 1), date(9, 30));
        assert!(check_exclusivity(&candidate, &[held]).is_ok());
    }

    #[test]
    fn test_non_exclusive_rights_coexist() {
        let held = right("apparel", false, "sponsor-a", date(1, 1), date(12, 31));
        let candidate = right("apparel", false, "sponsor-b", date(1, 1), date(12, 31));
        assert!(check_exclusivity(&candidate, &[held]).is_ok());
    }

    #[test]
    fn test_disjoint_periods_and_categories() {
        let held = right("beverage", true, "sponsor-a", date(1, 1), date(3, 31));
        let later = right("beverage", true, "sponsor-b", date(4, 1), date(6, 30));
        let other_category = right("banking", true, "sponsor-b", date(1, 1), date(3, 31));
        assert!(check_exclusivity(&later, &[held.clone()]).is_ok());
        assert!(check_exclusivity(&other_category, &[held]).is_ok());
    }

    #[test]
    fn test_unassigned_rights_never_conflict() {
        let held = right("beverage", true, "sponsor-a", date(1, 1), date(12, 31));
        let mut open = right("beverage", true, "sponsor-b", date(1, 1), date(12, 31));
        open.sponsor_id = None;
        assert!(check_exclusivity(&open, &[held]).is_ok());
    }
}
