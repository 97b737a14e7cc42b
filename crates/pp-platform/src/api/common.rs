//! Common API types and utilities

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Account;
use crate::error::{PlatformError, Result};

/// Standard API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// JSON body extractor whose rejections are 400 validation errors
/// instead of axum's 415/422 plain-text responses.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> PlatformError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        other => other.body_text(),
    };
    PlatformError::validation(message)
}

/// Query-string extractor whose rejections are 400 validation errors.
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

fn query_rejection(rejection: QueryRejection) -> PlatformError {
    PlatformError::validation(rejection.body_text())
}

/// Pagination parameters
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

pub const MAX_PAGE_SIZE: u32 = 100;

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        self.page.max(1).saturating_sub(1).saturating_mul(self.limit())
    }
}

/// Account without its password hash
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub role: crate::domain::PartyRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            role: a.role,
            active: a.active,
            created_at: a.created_at,
        }
    }
}

// Request validation helpers

/// Trimmed value of a required text field.
pub fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlatformError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Optional text field; blank becomes `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn non_negative(field: &str, cents: i64) -> Result<i64> {
    if cents < 0 {
        return Err(PlatformError::validation(format!("{} must not be negative", field)));
    }
    Ok(cents)
}

pub fn positive(field: &str, value: i64) -> Result<i64> {
    if value < 1 {
        return Err(PlatformError::validation(format!("{} must be at least 1", field)));
    }
    Ok(value)
}

pub fn date_order(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(PlatformError::validation("endDate must not be before startDate"));
    }
    Ok(())
}

pub fn time_order(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= start {
        return Err(PlatformError::validation("endsAt must be after startsAt"));
    }
    Ok(())
}

/// Parse an RFC 3339 query parameter.
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PlatformError::validation(format!("{} must be an RFC 3339 timestamp", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required("name", "  FC North ").unwrap(), "FC North");
        assert!(required("name", "   ").is_err());
    }

    #[test]
    fn test_optional() {
        assert_eq!(optional(Some(" ".into())), None);
        assert_eq!(optional(Some(" x ".into())), Some("x".into()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_pagination() {
        let p = PaginationParams { page: 3, limit: 10 };
        assert_eq!(p.offset(), 20);
        let p = PaginationParams { page: 0, limit: 1000 };
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_ordering_checks() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(date_order(a, b).is_ok());
        assert!(date_order(a, a).is_ok());
        assert!(date_order(b, a).is_err());
        assert!(non_negative("amountCents", -1).is_err());
        assert!(positive("quantity", 0).is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("from", "2024-09-01T10:00:00Z").is_ok());
        assert!(parse_timestamp("from", "yesterday").is_err());
    }
}
