//! Platform admin routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{ListPresentationsQuery, Presentation};
use serde::Serialize;
use shared::pagination::{PageRequest, Pagination};
use uuid::Uuid;

use super::{respond, ApiResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ActingUser, AppQuery};

#[derive(Debug, Serialize)]
pub struct AdminPresentationsPayload {
    pub presentations: Vec<Presentation>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct AdminPresentationPayload {
    pub presentation: Presentation,
}

/// List every presentation, filterable by status, team and deletion.
///
/// GET /api/v1/admin/presentations
pub async fn list_presentations(
    State(state): State<AppState>,
    actor: ActingUser,
    AppQuery(query): AppQuery<ListPresentationsQuery>,
) -> Result<Json<ApiResponse<AdminPresentationsPayload>>, ApiError> {
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    let (presentations, pagination) = state
        .services
        .moderation
        .admin_list_presentations(&actor.user_id, &query.filter(), &page)
        .await?;

    Ok(respond(
        "Presentations loaded",
        AdminPresentationsPayload {
            presentations,
            pagination,
        },
    ))
}

/// Get any presentation, including deleted and taken-down ones.
///
/// GET /api/v1/admin/presentations/:id
pub async fn get_presentation(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AdminPresentationPayload>>, ApiError> {
    let presentation = state
        .services
        .moderation
        .admin_get_presentation(id, &actor.user_id)
        .await?;
    Ok(respond(
        "Presentation loaded",
        AdminPresentationPayload { presentation },
    ))
}
