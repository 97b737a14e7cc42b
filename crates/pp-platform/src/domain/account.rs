//! Accounts and Party Profiles
//!
//! Every caller is an `Account` carrying one role. Clubs and sponsors
//! additionally own a profile row sharing the account's ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role claim carried by every access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Admin,
    Club,
    Sponsor,
}

text_enum!(PartyRole {
    Admin => "admin",
    Club => "club",
    Sponsor => "sponsor",
});

/// Login account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: PartyRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: PartyRole) -> Self {
        Self {
            id: super::new_id(),
            username: username.into(),
            password_hash: password_hash.into(),
            role,
            active: true,
            created_at: super::now(),
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }
}

/// Sports club profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// Same as the owning account ID
    pub id: String,
    pub name: String,
    pub sport: String,
    pub city: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    pub fn new(account_id: impl Into<String>, name: impl Into<String>, sport: impl Into<String>) -> Self {
        let now = super::now();
        Self {
            id: account_id.into(),
            name: name.into(),
            sport: sport.into(),
            city: None,
            description: None,
            contact_email: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Corporate sponsor profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    /// Same as the owning account ID
    pub id: String,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sponsor {
    pub fn new(account_id: impl Into<String>, company_name: impl Into<String>) -> Self {
        let now = super::now();
        Self {
            id: account_id.into(),
            company_name: company_name.into(),
            industry: None,
            website: None,
            contact_email: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<PartyRole>().unwrap(), PartyRole::Admin);
        assert_eq!("CLUB".parse::<PartyRole>().unwrap(), PartyRole::Club);
        assert_eq!(PartyRole::Sponsor.to_string(), "sponsor");
        assert!("owner".parse::<PartyRole>().is_err());
    }

    #[test]
    fn test_account_activation() {
        let mut account = Account::new("fc-north", "hash", PartyRole::Club);
        assert!(account.active);
        account.deactivate();
        assert!(!account.active);
        account.activate();
        assert!(account.active);
    }
}
