//! Student profile handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppResult, Paginated};
use domain::person::{EnrollmentEligibility, Student, StudentStatus};
use domain::PERM_PERSONS_MANAGE;
use person_service_lib::{NewStudent, StudentUpdate};

use super::PageQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_permission, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentRequest {
    pub person_id: Uuid,
    #[validate(length(min = 4, max = 20, message = "Student number must be 4 to 20 characters"))]
    #[schema(example = "S2025001")]
    pub student_number: String,
    #[validate(length(min = 1, max = 200, message = "Program is required"))]
    pub program: String,
    pub enrollment_date: NaiveDate,
    pub expected_graduation: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 200, message = "Program cannot be empty"))]
    pub program: Option<String>,
    pub expected_graduation: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    pub status: StudentStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StudentListQuery {
    pub status: Option<StudentStatus>,
}

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route(
            "/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/:id/status", post(change_status))
        .route("/:id/eligibility", get(enrollment_eligibility))
}

#[utoipa::path(
    get,
    path = "/api/person/students",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(PageQuery, StudentListQuery),
    responses((status = 200, description = "Paginated students"))
)]
pub async fn list_students(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<StudentListQuery>,
) -> AppResult<Json<Paginated<Student>>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let params = page.into();
    let students = state.persons.students.list_students(params, query.status).await?;
    Ok(Json(Paginated::from_page(students, params)))
}

#[utoipa::path(
    post,
    path = "/api/person/students",
    tag = "Students",
    security(("bearer_auth" = [])),
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Person already has a profile or number taken")
    )
)]
pub async fn create_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<Student>)> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let student = state
        .persons
        .students
        .create_student(NewStudent {
            person_id: payload.person_id,
            student_number: payload.student_number,
            program: payload.program,
            enrollment_date: payload.enrollment_date,
            expected_graduation: payload.expected_graduation,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/person/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Student>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    Ok(Json(state.persons.students.get_student(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/person/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentRequest,
    responses((status = 200, description = "Student updated", body = Student))
)]
pub async fn update_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStudentRequest>,
) -> AppResult<Json<Student>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let update = StudentUpdate {
        program: payload.program,
        expected_graduation: payload.expected_graduation,
    };
    Ok(Json(state.persons.students.update_student(id, update).await?))
}

#[utoipa::path(
    post,
    path = "/api/person/students/{id}/status",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Student),
        (status = 400, description = "Transition not allowed")
    )
)]
pub async fn change_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusRequest>,
) -> AppResult<Json<Student>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    Ok(Json(
        state.persons.students.change_status(id, payload.status).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/person/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses((status = 204, description = "Student soft-deleted"))
)]
pub async fn delete_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    state.persons.students.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/person/students/{id}/eligibility",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses((status = 200, description = "Enrollment eligibility", body = EnrollmentEligibility))
)]
pub async fn enrollment_eligibility(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EnrollmentEligibility>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    Ok(Json(
        state.persons.students.enrollment_eligibility(id).await?,
    ))
}
