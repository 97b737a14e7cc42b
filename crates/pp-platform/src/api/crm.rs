//! Admin CRM API
//!
//! Notes and tags attached to club and sponsor profiles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{optional, required, JsonBody, QueryParams};
use crate::api::middleware::Authenticated;
use crate::domain::{now, CrmEntityType, Note, Tag, TagAssignment};
use crate::error::PlatformError;
use crate::repository::{AccountRepository, NoteRepository, TagRepository};
use crate::service::AuditService;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub entity_type: CrmEntityType,
    pub entity_id: String,
    pub body: String,
}

/// Both fields must be given together to filter.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NoteQuery {
    pub entity_type: Option<CrmEntityType>,
    pub entity_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTagRequest {
    pub entity_type: CrmEntityType,
    pub entity_id: String,
}

#[derive(Clone)]
pub struct CrmState {
    pub note_repo: Arc<NoteRepository>,
    pub tag_repo: Arc<TagRepository>,
    pub account_repo: Arc<AccountRepository>,
    pub audit_service: Arc<AuditService>,
}

impl CrmState {
    /// Notes and tags may only point at an existing club or sponsor.
    async fn ensure_entity(&self, entity_type: CrmEntityType, entity_id: &str) -> Result<(), PlatformError> {
        let exists = match entity_type {
            CrmEntityType::Club => self.account_repo.find_club(entity_id).await?.is_some(),
            CrmEntityType::Sponsor => self.account_repo.find_sponsor(entity_id).await?.is_some(),
        };
        if !exists {
            let entity = match entity_type {
                CrmEntityType::Club => "Club",
                CrmEntityType::Sponsor => "Sponsor",
            };
            return Err(PlatformError::not_found(entity, entity_id));
        }
        Ok(())
    }
}

/// Add a note to a club or sponsor
#[utoipa::path(
    post,
    path = "/api/admin/notes",
    tag = "admin",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Entity not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_note(
    State(state): State<CrmState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), PlatformError> {
    let entity_id = required("entityId", &req.entity_id)?;
    let body = required("body", &req.body)?;
    state.ensure_entity(req.entity_type, &entity_id).await?;

    let note = Note::new(&auth.0.subject_id, req.entity_type, entity_id, body);
    state.note_repo.insert(&note).await?;
    state
        .audit_service
        .log_create(&auth.0, "Note", &note.id, format!("Note added to {} {}", note.entity_type, note.entity_id))
        .await;

    Ok((StatusCode::CREATED, Json(note)))
}

/// List notes, optionally for one entity
#[utoipa::path(
    get,
    path = "/api/admin/notes",
    tag = "admin",
    params(NoteQuery),
    responses(
        (status = 200, description = "Notes", body = Vec<Note>),
        (status = 400, description = "Incomplete filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notes(
    State(state): State<CrmState>,
    _auth: Authenticated,
    QueryParams(query): QueryParams<NoteQuery>,
) -> Result<Json<Vec<Note>>, PlatformError> {
    let filter = match (query.entity_type, optional(query.entity_id)) {
        (Some(entity_type), Some(entity_id)) => Some((entity_type, entity_id)),
        (None, None) => None,
        _ => {
            return Err(PlatformError::validation(
                "entityType and entityId must be given together",
            ))
        }
    };

    let notes = state
        .note_repo
        .find(filter.as_ref().map(|(t, id)| (*t, id.as_str())))
        .await?;
    Ok(Json(notes))
}

/// Delete a note
#[utoipa::path(
    delete,
    path = "/api/admin/notes/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Note ID")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_note(
    State(state): State<CrmState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    if !state.note_repo.delete(&id).await? {
        return Err(PlatformError::not_found("Note", &id));
    }
    state.audit_service.log_delete(&auth.0, "Note", &id, "Note deleted").await;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/api/admin/tags",
    tag = "admin",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 409, description = "Tag name taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_tag(
    State(state): State<CrmState>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), PlatformError> {
    let name = required("name", &req.name)?;
    if state.tag_repo.exists_by_name(&name).await? {
        return Err(PlatformError::duplicate("Tag", "name", &name));
    }

    let mut tag = Tag::new(name);
    tag.color = optional(req.color);
    state.tag_repo.insert(&tag).await?;
    state
        .audit_service
        .log_create(&auth.0, "Tag", &tag.id, format!("Tag {} created", tag.name))
        .await;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// List tags
#[utoipa::path(
    get,
    path = "/api/admin/tags",
    tag = "admin",
    responses((status = 200, description = "Tags", body = Vec<Tag>)),
    security(("bearer_auth" = []))
)]
pub async fn list_tags(
    State(state): State<CrmState>,
    _auth: Authenticated,
) -> Result<Json<Vec<Tag>>, PlatformError> {
    Ok(Json(state.tag_repo.find_all().await?))
}

/// Delete a tag and its assignments
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_tag(
    State(state): State<CrmState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, PlatformError> {
    if !state.tag_repo.delete(&id).await? {
        return Err(PlatformError::not_found("Tag", &id));
    }
    state.audit_service.log_delete(&auth.0, "Tag", &id, "Tag deleted").await;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a tag to a club or sponsor
#[utoipa::path(
    post,
    path = "/api/admin/tags/{id}/assignments",
    tag = "admin",
    params(("id" = String, Path, description = "Tag ID")),
    request_body = AssignTagRequest,
    responses(
        (status = 201, description = "Tag assigned", body = TagAssignment),
        (status = 404, description = "Tag or entity not found"),
        (status = 409, description = "Already assigned")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_tag(
    State(state): State<CrmState>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AssignTagRequest>,
) -> Result<(StatusCode, Json<TagAssignment>), PlatformError> {
    let tag = state
        .tag_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Tag", &id))?;
    let entity_id = required("entityId", &req.entity_id)?;
    state.ensure_entity(req.entity_type, &entity_id).await?;

    let assignment = TagAssignment {
        tag_id: tag.id,
        entity_type: req.entity_type,
        entity_id,
        created_at: now(),
    };
    state.tag_repo.assign(&assignment).await?;
    state
        .audit_service
        .log_update(
            &auth.0,
            "Tag",
            &assignment.tag_id,
            format!("Tag {} assigned to {} {}", tag.name, assignment.entity_type, assignment.entity_id),
        )
        .await;

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// List the entities carrying a tag
#[utoipa::path(
    get,
    path = "/api/admin/tags/{id}/assignments",
    tag = "admin",
    params(("id" = String, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Assignments", body = Vec<TagAssignment>),
        (status = 404, description = "Tag not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assignments(
    State(state): State<CrmState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<TagAssignment>>, PlatformError> {
    if state.tag_repo.find_by_id(&id).await?.is_none() {
        return Err(PlatformError::not_found("Tag", &id));
    }
    Ok(Json(state.tag_repo.find_assignments(&id).await?))
}

/// Detach a tag
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}/assignments/{entity_type}/{entity_id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Tag ID"),
        ("entity_type" = CrmEntityType, Path, description = "club or sponsor"),
        ("entity_id" = String, Path, description = "Club or sponsor ID")
    ),
    responses(
        (status = 204, description = "Tag removed"),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unassign_tag(
    State(state): State<CrmState>,
    auth: Authenticated,
    Path((id, entity_type, entity_id)): Path<(String, String, String)>,
) -> Result<StatusCode, PlatformError> {
    let entity_type: CrmEntityType = entity_type.parse()?;
    if !state.tag_repo.unassign(&id, entity_type, &entity_id).await? {
        return Err(PlatformError::not_found("TagAssignment", format!("{}/{}/{}", id, entity_type, entity_id)));
    }
    state
        .audit_service
        .log_update(&auth.0, "Tag", &id, format!("Tag removed from {} {}", entity_type, entity_id))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn notes_router(state: CrmState) -> Router {
    Router::new()
        .route("/", post(create_note).get(list_notes))
        .route("/:id", delete(delete_note))
        .with_state(state)
}

pub fn tags_router(state: CrmState) -> Router {
    Router::new()
        .route("/", post(create_tag).get(list_tags))
        .route("/:id", delete(delete_tag))
        .route("/:id/assignments", post(assign_tag).get(list_assignments))
        .route("/:id/assignments/:entity_type/:entity_id", delete(unassign_tag))
        .with_state(state)
}
