//! Course catalogue handlers. Reads are open to any authenticated user.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppResult, Paginated};
use domain::academic::{Course, CourseSeats, CourseUpdate, NewCourse};
use domain::PERM_ACADEMIC_MANAGE;

use super::{exam_handler, PageQuery};
use crate::extractors::ValidatedJson;
use crate::middleware::{require_permission, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseRequest {
    #[validate(length(min = 5, max = 9, message = "Course code must be 5 to 9 characters"))]
    #[schema(example = "CS101")]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Course name is required"))]
    #[schema(example = "Introduction to Programming")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 6)]
    pub credits: i32,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    #[schema(example = 120)]
    pub capacity: i32,
    #[schema(example = "2025-FALL")]
    pub semester: String,
    /// Active staff member teaching the course
    pub instructor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Course name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i32>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub instructor_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CourseListQuery {
    /// e.g. `2025-FALL`
    pub semester: Option<String>,
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/:id/restore", post(restore_course))
        .route("/:id/seats", get(seats))
        .route("/:id/exams", get(exam_handler::list_exams))
}

#[utoipa::path(
    get,
    path = "/api/academic/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(PageQuery, CourseListQuery),
    responses((status = 200, description = "Paginated courses"))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<CourseListQuery>,
) -> AppResult<Json<Paginated<Course>>> {
    let params = page.into();
    let courses = state.academic.courses.list_courses(params, query.semester).await?;
    Ok(Json(Paginated::from_page(courses, params)))
}

#[utoipa::path(
    post,
    path = "/api/academic/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid code, semester or instructor"),
        (status = 409, description = "Course code taken")
    )
)]
pub async fn create_course(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    let course = state
        .academic
        .courses
        .create_course(NewCourse {
            code: payload.code,
            name: payload.name,
            description: payload.description,
            credits: payload.credits,
            capacity: payload.capacity,
            semester: payload.semester,
            instructor_id: payload.instructor_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/academic/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course", body = Course),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Course>> {
    Ok(Json(state.academic.courses.get_course(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/academic/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Capacity below current enrollment")
    )
)]
pub async fn update_course(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCourseRequest>,
) -> AppResult<Json<Course>> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    let update = CourseUpdate {
        name: payload.name,
        description: payload.description,
        credits: payload.credits,
        capacity: payload.capacity,
        instructor_id: payload.instructor_id,
        is_active: payload.is_active,
    };
    Ok(Json(state.academic.courses.update_course(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/academic/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course soft-deleted"),
        (status = 409, description = "Course has enrolled students")
    )
)]
pub async fn delete_course(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    state.academic.courses.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/academic/courses/{id}/restore",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses((status = 200, description = "Course restored", body = Course))
)]
pub async fn restore_course(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Course>> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    Ok(Json(state.academic.courses.restore_course(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/academic/courses/{id}/seats",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses((status = 200, description = "Seat availability", body = CourseSeats))
)]
pub async fn seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CourseSeats>> {
    Ok(Json(state.academic.courses.seats(id).await?))
}
