//! Authentication Service
//!
//! Issues and validates HS256 access tokens. A token carries the account id
//! as `sub` and the party role as `role`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Account, PartyRole};
use crate::error::{PlatformError, Result};

const LEEWAY_SECS: u64 = 5;

/// Token signing settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl_secs: i64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "pitch-partner".to_string(),
            audience: "pitch-partner".to_string(),
            token_ttl_secs: 3600,
        }
    }
}

impl From<&pp_config::AuthSettings> for AuthConfig {
    fn from(settings: &pp_config::AuthSettings) -> Self {
        Self {
            secret: settings.jwt_secret.clone(),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            token_ttl_secs: settings.token_ttl_secs,
        }
    }
}

/// JWT claims of an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    /// Kept as text so an unknown role is reported as an invalid token
    pub role: String,
    pub username: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessTokenClaims {
    pub fn party_role(&self) -> Result<PartyRole> {
        self.role.parse().map_err(|_| PlatformError::InvalidToken {
            message: format!("Unknown role claim: {}", self.role),
        })
    }
}

/// Issued access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.leeway = LEEWAY_SECS;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn issue_token(&self, account: &Account) -> Result<IssuedToken> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: account.id.clone(),
            role: account.role.as_str().to_string(),
            username: account.username.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now,
            exp: now + self.config.token_ttl_secs,
        };
        let token = self.encode_claims(&claims)?;
        Ok(IssuedToken {
            token,
            expires_in: self.config.token_ttl_secs,
        })
    }

    pub fn encode_claims(&self, claims: &AccessTokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| PlatformError::internal(format!("Failed to sign token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                    _ => PlatformError::InvalidToken { message: e.to_string() },
                }
            })
    }

    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    pub fn audience(&self) -> &str {
        &self.config.audience
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new("test-secret-that-is-at-least-32-bytes!"))
    }

    #[test]
    fn test_issue_and_validate() {
        let svc = service();
        let account = Account::new("fc-north", "hash", PartyRole::Club);
        let issued = svc.issue_token(&account).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = svc.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.party_role().unwrap(), PartyRole::Club);
        assert_eq!(claims.username, "fc-north");
    }

    #[test]
    fn test_expired_token() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: "acc-1".into(),
            role: "club".into(),
            username: "fc".into(),
            iss: svc.issuer().to_string(),
            aud: svc.audience().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = svc.encode_claims(&claims).unwrap();
        assert!(matches!(svc.validate_token(&token), Err(PlatformError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let account = Account::new("acme", "hash", PartyRole::Sponsor);
        let token = service().issue_token(&account).unwrap().token;
        let other = AuthService::new(AuthConfig::new("another-secret-that-is-32-bytes-long"));
        assert!(matches!(other.validate_token(&token), Err(PlatformError::InvalidToken { .. })));
    }

    #[test]
    fn test_unknown_role_claim() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: "acc-1".into(),
            role: "superuser".into(),
            username: "x".into(),
            iss: svc.issuer().to_string(),
            aud: svc.audience().to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = svc.encode_claims(&claims).unwrap();
        let decoded = svc.validate_token(&token).unwrap();
        assert!(matches!(decoded.party_role(), Err(PlatformError::InvalidToken { .. })));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }
}
