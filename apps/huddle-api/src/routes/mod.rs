pub mod health;
pub mod projects;

use axum::Router;
use utoipa::OpenApi;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::relay::server::router())
        .merge(projects::router())
        .fallback(route_not_found)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Projects
        projects::create_project,
        projects::list_projects,
        projects::get_project,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::models::project::Project,
            // Route request types
            projects::CreateProjectRequest,
            projects::ProjectInput,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Projects", description = "Project records"),
    )
)]
pub struct ApiDoc;
