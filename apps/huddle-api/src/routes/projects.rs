//! Project CRUD endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::project::Project;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route("/projects/{id}", get(get_project))
}

// ---------------------------------------------------------------------------
// POST /projects
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub project: Option<ProjectInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Missing project object or invalid fields", body = ApiErrorBody),
    ),
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let Some(input) = body.project else {
        return Err(ApiError::bad_request(
            "Missing project object in request body",
        ));
    };

    // Validate.
    let mut errors = Vec::new();
    if input.name.as_deref().unwrap_or("").is_empty() {
        errors.push(FieldError {
            field: "name".to_string(),
            message: "Project name is required".to_string(),
        });
    }
    if input.description.as_deref().unwrap_or("").is_empty() {
        errors.push(FieldError {
            field: "description".to_string(),
            message: "Project description is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let project = Project {
        id: huddle_common::id::prefixed_ulid(huddle_common::id::prefix::PROJECT),
        name: input.name.unwrap(),
        description: input.description.unwrap(),
    };

    state.projects.insert(project.clone());
    tracing::info!(project_id = %project.id, "project created");

    Ok((StatusCode::CREATED, Json(project)))
}

// ---------------------------------------------------------------------------
// GET /projects
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "All project records", body = [Project]),
    ),
)]
pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.projects.list())
}

// ---------------------------------------------------------------------------
// GET /projects/{id}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "The project record", body = Project),
        (status = 404, description = "Unknown project id", body = ApiErrorBody),
    ),
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .projects
        .get(&id)
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(Json(project))
}
