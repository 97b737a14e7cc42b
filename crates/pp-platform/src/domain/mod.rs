//! Domain Models
//!
//! Relational entities of the club/sponsor marketplace.
//! All entities use UUID v4 string IDs.

/// Implements `as_str`, `FromStr` and `Display` for enums stored as TEXT columns.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::PlatformError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(crate::error::PlatformError::validation(format!(
                        "Invalid {}: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

use chrono::{DateTime, SubsecRound, Utc};

pub mod account;
pub mod budget;
pub mod contract;
pub mod invoice;
pub mod marketplace;
pub mod inventory;
pub mod calendar;
pub mod message;
pub mod notification;
pub mod crm;
pub mod audit_log;

pub use account::*;
pub use budget::*;
pub use contract::*;
pub use invoice::*;
pub use marketplace::*;
pub use inventory::*;
pub use calendar::*;
pub use message::*;
pub use notification::*;
pub use crm::*;
pub use audit_log::*;

/// Current time at the millisecond precision timestamps are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Truncate a client-supplied instant to stored precision.
pub fn to_stored_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

/// Generate a new entity ID
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A row whose owner field decides who may read or mutate it.
pub trait Owned {
    /// Entity name used in error messages
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    fn owner_id(&self) -> &str;
}

/// True when `[a_start, a_end)` and `[b_start, b_end)` intersect.
pub fn ranges_overlap<T: PartialOrd>(a_start: &T, a_end: &T, b_start: &T, b_end: &T) -> bool {
    a_start < b_end && b_start < a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_millisecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_text_enums_parse_case_insensitively() {
        assert_eq!("Cancelled".parse::<BookingStatus>().unwrap(), BookingStatus::Cancelled);
        assert_eq!("ACCEPTED".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Accepted);
        assert!(matches!(
            "archived".parse::<BookingStatus>(),
            Err(crate::error::PlatformError::Validation { .. })
        ));
    }

    #[test]
    fn test_stored_precision_survives_millis_round_trip() {
        let ts = Utc.timestamp_nanos(1_726_000_000_123_456_789);
        let stored = to_stored_precision(ts);
        assert_eq!(stored.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(DateTime::from_timestamp_millis(stored.timestamp_millis()), Some(stored));
    }
}
