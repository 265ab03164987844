//! Presentation and moderation routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreatePresentationRequest, DeletePresentationQuery, ModerationEvent, Presentation,
    SetStatusRequest,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use super::{respond, ApiResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ActingUser, AppJson, AppQuery};
use crate::middleware::metrics::record_moderation_transition;

#[derive(Debug, Serialize)]
pub struct PresentationPayload {
    pub presentation: Presentation,
}

#[derive(Debug, Serialize)]
pub struct StatusPayload {
    pub presentation: Presentation,
    pub event: ModerationEvent,
}

#[derive(Debug, Serialize)]
pub struct DeletePayload {
    pub presentation_id: Uuid,
    pub permanent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Presentation>,
}

#[derive(Debug, Serialize)]
pub struct HistoryPayload {
    pub events: Vec<ModerationEvent>,
    pub count: usize,
}

/// Create a presentation owned by the caller.
///
/// POST /api/v1/presentations
pub async fn create_presentation(
    State(state): State<AppState>,
    actor: ActingUser,
    AppJson(request): AppJson<CreatePresentationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PresentationPayload>>), ApiError> {
    request.validate()?;

    let presentation = state
        .services
        .moderation
        .create_presentation(&actor.user_id, &request.title, request.team_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        respond("Presentation created", PresentationPayload { presentation }),
    ))
}

/// Get a presentation the caller may see.
///
/// GET /api/v1/presentations/:id
pub async fn get_presentation(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PresentationPayload>>, ApiError> {
    let presentation = state
        .services
        .moderation
        .get_presentation(id, &actor.user_id)
        .await?;
    Ok(respond("Presentation loaded", PresentationPayload { presentation }))
}

/// Set the moderation status.
///
/// PUT /api/v1/presentations/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<SetStatusRequest>,
) -> Result<Json<ApiResponse<StatusPayload>>, ApiError> {
    request.validate()?;

    let (presentation, event) = state
        .services
        .moderation
        .set_status(id, &actor.user_id, request.status, request.notes)
        .await?;
    record_moderation_transition(event.to_status.as_str());

    Ok(respond(
        "Moderation status updated",
        StatusPayload {
            presentation,
            event,
        },
    ))
}

/// Soft-delete, or permanently delete with `?permanent=true`.
///
/// DELETE /api/v1/presentations/:id
pub async fn delete_presentation(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<Uuid>,
    AppQuery(query): AppQuery<DeletePresentationQuery>,
) -> Result<Json<ApiResponse<DeletePayload>>, ApiError> {
    if query.is_permanent() {
        state
            .services
            .moderation
            .permanent_delete(id, &actor.user_id)
            .await?;
        return Ok(respond(
            "Presentation permanently deleted",
            DeletePayload {
                presentation_id: id,
                permanent: true,
                presentation: None,
            },
        ));
    }

    let presentation = state
        .services
        .moderation
        .soft_delete(id, &actor.user_id)
        .await?;
    Ok(respond(
        "Presentation deleted",
        DeletePayload {
            presentation_id: id,
            permanent: false,
            presentation: Some(presentation),
        },
    ))
}

/// Undo a soft-delete.
///
/// POST /api/v1/presentations/:id/restore
pub async fn restore_presentation(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PresentationPayload>>, ApiError> {
    let presentation = state
        .services
        .moderation
        .restore(id, &actor.user_id)
        .await?;
    Ok(respond("Presentation restored", PresentationPayload { presentation }))
}

/// Moderation history, oldest first.
///
/// GET /api/v1/presentations/:id/moderation
pub async fn moderation_history(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<HistoryPayload>>, ApiError> {
    let events = state
        .services
        .moderation
        .moderation_history(id, &actor.user_id)
        .await?;
    let count = events.len();
    Ok(respond("Moderation history loaded", HistoryPayload { events, count }))
}
