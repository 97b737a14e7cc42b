//! API Middleware
//!
//! Bearer-token authentication and per-route-group role gating.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::domain::PartyRole;
use crate::error::PlatformError;
use crate::service::{checks, extract_bearer_token, AuthContext, AuthService};

/// Shared state made available to every request as an extension
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
}

/// Extractor for authenticated requests.
///
/// Reuses the context placed by [`require_role`] when present, otherwise
/// validates the bearer token itself.
pub struct Authenticated(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(Authenticated(ctx.clone()));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PlatformError::unauthorized("Missing Authorization header"))?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| PlatformError::unauthorized("Invalid Authorization header format"))?;

        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(|| PlatformError::internal("AppState not found"))?;

        let claims = app_state.auth_service.validate_token(token)?;
        let ctx = AuthContext::from_claims(&claims)?;
        parts.extensions.insert(ctx.clone());

        Ok(Authenticated(ctx))
    }
}

/// Role gate for a route group, used with `from_fn_with_state`.
///
/// No token is 401; a verified token of another role is 403.
pub async fn require_role(
    State(role): State<PartyRole>,
    Authenticated(ctx): Authenticated,
    mut request: Request,
    next: Next,
) -> Result<Response, PlatformError> {
    if let Err(e) = checks::require_role(&ctx, role) {
        debug!(subject_id = %ctx.subject_id, actual = %ctx.role, required = %role, "Role gate rejected request");
        return Err(e);
    }
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
