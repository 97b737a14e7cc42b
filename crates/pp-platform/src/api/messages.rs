//! Messages API
//!
//! Direct messages between any two accounts, regardless of role.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{optional, required, JsonBody, QueryParams};
use crate::api::middleware::Authenticated;
use crate::domain::{now, Message, PartyRole};
use crate::error::PlatformError;
use crate::repository::{AccountRepository, MessageRepository};
use crate::service::NotificationService;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mailbox {
    #[default]
    Inbox,
    Sent,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MailboxQuery {
    /// `inbox` (default) or `sent`
    #[serde(rename = "box", default)]
    #[param(inline)]
    pub mailbox: Mailbox,
}

#[derive(Clone)]
pub struct MessagesState {
    pub message_repo: Arc<MessageRepository>,
    pub account_repo: Arc<AccountRepository>,
    pub notification_service: Arc<NotificationService>,
}

impl MessagesState {
    /// Club name, company name or username, whichever the sender has.
    async fn display_name(&self, account_id: &str, role: PartyRole, username: &str) -> Result<String, PlatformError> {
        let name = match role {
            PartyRole::Club => self.account_repo.find_club(account_id).await?.map(|c| c.name),
            PartyRole::Sponsor => self
                .account_repo
                .find_sponsor(account_id)
                .await?
                .map(|s| s.company_name),
            PartyRole::Admin => None,
        };
        Ok(name.unwrap_or_else(|| username.to_string()))
    }

    async fn visible_message(&self, account_id: &str, id: &str) -> Result<Message, PlatformError> {
        let message = self
            .message_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Message", id))?;
        if !message.is_participant(account_id) {
            return Err(PlatformError::forbidden(format!(
                "Message {} belongs to other accounts",
                message.id
            )));
        }
        Ok(message)
    }
}

/// Send a message
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Validation error or self-addressed"),
        (status = 404, description = "Recipient not found or inactive")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    State(state): State<MessagesState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), PlatformError> {
    let ctx = auth.0;
    let recipient_id = required("recipientId", &req.recipient_id)?;
    let body = required("body", &req.body)?;
    if recipient_id == ctx.subject_id {
        return Err(PlatformError::validation("Cannot send a message to yourself"));
    }

    state
        .account_repo
        .find_by_id(&recipient_id)
        .await?
        .filter(|a| a.active)
        .ok_or_else(|| PlatformError::not_found("Account", &recipient_id))?;

    let mut message = Message::new(&ctx.subject_id, recipient_id, body);
    message.subject = optional(req.subject);
    state.message_repo.insert(&message).await?;

    let sender_name = state.display_name(&ctx.subject_id, ctx.role, &ctx.username).await?;
    state.notification_service.message_received(&message, &sender_name).await;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Inbox or sent messages, newest first
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "messages",
    params(MailboxQuery),
    responses((status = 200, description = "Messages", body = Vec<Message>)),
    security(("bearer_auth" = []))
)]
pub async fn list_messages(
    State(state): State<MessagesState>,
    auth: Authenticated,
    QueryParams(query): QueryParams<MailboxQuery>,
) -> Result<Json<Vec<Message>>, PlatformError> {
    let account_id = &auth.0.subject_id;
    let messages = match query.mailbox {
        Mailbox::Inbox => state.message_repo.find_inbox(account_id).await?,
        Mailbox::Sent => state.message_repo.find_sent(account_id).await?,
    };
    Ok(Json(messages))
}

/// Get a message as sender or recipient
#[utoipa::path(
    get,
    path = "/api/messages/{id}",
    tag = "messages",
    params(("id" = String, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Message not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_message(
    State(state): State<MessagesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Message>, PlatformError> {
    Ok(Json(state.visible_message(&auth.0.subject_id, &id).await?))
}

/// Mark a received message as read
#[utoipa::path(
    put,
    path = "/api/messages/{id}/read",
    tag = "messages",
    params(("id" = String, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message marked read", body = Message),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Message not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_message_read(
    State(state): State<MessagesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Message>, PlatformError> {
    let mut message = state.visible_message(&auth.0.subject_id, &id).await?;
    if message.recipient_id != auth.0.subject_id {
        return Err(PlatformError::forbidden("Only the recipient can mark a message as read"));
    }

    if message.read_at.is_none() {
        let now = now();
        state.message_repo.mark_read(&message.id, now).await?;
        message.read_at = Some(now);
    }
    Ok(Json(message))
}

pub fn messages_router(state: MessagesState) -> Router {
    Router::new()
        .route("/", post(send_message).get(list_messages))
        .route("/:id", get(get_message))
        .route("/:id/read", put(mark_message_read))
        .with_state(state)
}
