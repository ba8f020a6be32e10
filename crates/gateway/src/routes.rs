//! Route configuration.

use axum::{middleware, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    account_routes, auth_routes, course_routes, enrollment_routes, exam_routes, grade_routes,
    health_routes, objection_routes, permission_routes, person_routes, role_routes,
    staff_routes, student_routes, transcript_routes, user_routes, waiting_list_routes,
};
use crate::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Require a bearer token and apply the general rate limit.
fn protected(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
}

/// Identity endpoints under `/api/v1`.
fn identity_api(state: &AppState) -> Router<AppState> {
    // Public auth endpoints get the stricter limiter; account endpoints need a token.
    let auth = auth_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_auth_middleware,
        ))
        .merge(protected(account_routes(), state));

    Router::new().nest("/auth", auth).merge(protected(
        Router::new()
            .nest("/users", user_routes())
            .nest("/roles", role_routes())
            .nest("/permissions", permission_routes()),
        state,
    ))
}

/// Person endpoints under `/api/person`.
fn person_api(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .nest("/persons", person_routes())
            .nest("/students", student_routes())
            .nest("/staff", staff_routes()),
        state,
    )
}

/// Academic endpoints under `/api/academic`.
fn academic_api(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .nest("/courses", course_routes())
            .nest("/exams", exam_routes())
            .nest("/enrollments", enrollment_routes())
            .nest("/waiting-list", waiting_list_routes())
            .nest("/grades", grade_routes())
            .nest("/transcripts", transcript_routes())
            .nest("/objections", objection_routes()),
        state,
    )
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check (no auth, no rate limit)
        .nest("/health", health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", identity_api(&state))
        .nest("/api/person", person_api(&state))
        .nest("/api/academic", academic_api(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
