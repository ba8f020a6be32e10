//! Integration tests for API endpoints.
//!
//! The real router runs against mocked services, a disconnected database
//! handle and no Redis.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use academic_service_lib::service::{
    MockCourseService, MockEnrollmentService, MockExamService, MockGradeService,
};
use academic_service_lib::AcademicServices;
use common::{AppError, Database, RateLimitConfig};
use domain::academic::{Enrollment, EnrollmentStatus};
use domain::identity::{TokenResponse, User};
use gateway_lib::{create_router, AppState};
use identity_service_lib::service::{
    MockAuthService, MockRoleService, MockTwoFactorService, MockUserService,
};
use identity_service_lib::{Claims, IdentityServices};
use person_service_lib::service::{MockPersonService, MockStaffService, MockStudentService};
use person_service_lib::PersonServices;

const TOKEN: &str = "valid-test-token";

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Default)]
struct TestServices {
    auth: MockAuthService,
    users: MockUserService,
    roles: MockRoleService,
    two_factor: MockTwoFactorService,
    persons: MockPersonService,
    students: MockStudentService,
    staff: MockStaffService,
    courses: MockCourseService,
    enrollments: MockEnrollmentService,
    exams: MockExamService,
    grades: MockGradeService,
}

impl TestServices {
    /// Accept [`TOKEN`] as a user holding `permissions`.
    fn authenticate(&mut self, user_id: Uuid, roles: &[&str], permissions: &[&str]) {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        self.auth.expect_verify_token().returning(move |token| {
            if token != TOKEN {
                return Err(AppError::Unauthorized);
            }
            Ok(Claims {
                sub: user_id,
                email: "clerk@university.test".to_string(),
                roles: roles.clone(),
                permissions: permissions.clone(),
                iss: "university-api".to_string(),
                iat: Utc::now().timestamp(),
                exp: Utc::now().timestamp() + 900,
            })
        });
    }

    fn router(self) -> Router {
        let identity = IdentityServices {
            auth: Arc::new(self.auth),
            users: Arc::new(self.users),
            roles: Arc::new(self.roles),
            two_factor: Arc::new(self.two_factor),
        };
        let persons = PersonServices {
            persons: Arc::new(self.persons),
            students: Arc::new(self.students),
            staff: Arc::new(self.staff),
        };
        let academic = AcademicServices {
            courses: Arc::new(self.courses),
            enrollments: Arc::new(self.enrollments),
            exams: Arc::new(self.exams),
            grades: Arc::new(self.grades),
        };
        let database = Database::from_connection(DatabaseConnection::Disconnected);

        create_router(AppState::new(
            identity,
            persons,
            academic,
            database,
            RateLimitConfig::default(),
        ))
    }
}

fn request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn enrollment(student_id: Uuid, course_id: Uuid) -> Enrollment {
    Enrollment {
        id: Uuid::new_v4(),
        student_id,
        course_id,
        status: EnrollmentStatus::Enrolled,
        enrolled_at: Utc::now(),
        dropped_at: None,
        completed_at: None,
    }
}

// =============================================================================
// Health & Docs
// =============================================================================

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let (status, body) = send(
        TestServices::default().router(),
        request(Method::GET, "/health", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
    assert_eq!(body["services"]["cache"]["status"], "disabled");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(
        TestServices::default().router(),
        request(Method::GET, "/api-docs/openapi.json", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/academic/enrollments/enroll"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_route_requires_token() {
    let (status, body) = send(
        TestServices::default().router(),
        request(Method::GET, "/api/v1/users/me", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let mut services = TestServices::default();
    services.authenticate(Uuid::new_v4(), &["user"], &[]);

    let (status, _) = send(
        services.router(),
        request(Method::GET, "/api/v1/users/me", None, Some("forged")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_profile() {
    let mut services = TestServices::default();
    let mut user =
        User::new("ada@university.edu", "ada", "hash".into(), "Ada", "Lovelace").unwrap();
    let user_id = user.id;
    user.last_login_at = Some(Utc::now() - Duration::hours(1));
    services.authenticate(user_id, &["user"], &[]);
    services
        .users
        .expect_get_user()
        .withf(move |id| *id == user_id)
        .returning(move |_| Ok(user.clone()));

    let (status, body) = send(
        services.router(),
        request(Method::GET, "/api/v1/users/me", None, Some(TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@university.edu");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_validation_error() {
    let (status, body) = send(
        TestServices::default().router(),
        request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "email": "not-an-email",
                "username": "ada",
                "password": "SecurePass123!",
                "first_name": "Ada",
                "last_name": "Lovelace"
            })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Invalid email format");
}

#[tokio::test]
async fn test_login_records_forwarded_client_address() {
    let mut services = TestServices::default();
    services
        .auth
        .expect_login()
        .withf(|credentials, client| {
            credentials.email == "ada@university.edu"
                && client.ip_address.as_deref() == Some("203.0.113.7")
        })
        .returning(|_, _| {
            Ok(TokenResponse {
                access_token: "access".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 900,
                refresh_token: "refresh".to_string(),
                refresh_expires_at: Utc::now() + Duration::days(7),
            })
        });

    let mut login = request(
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({ "email": "ada@university.edu", "password": "SecurePass123!" })),
        None,
    );
    login
        .headers_mut()
        .insert("X-Forwarded-For", "203.0.113.7, 10.0.0.1".parse().unwrap());

    let (status, body) = send(services.router(), login).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn test_locked_account_error_code() {
    let mut services = TestServices::default();
    services
        .auth
        .expect_login()
        .returning(|_, _| Err(AppError::AccountLocked));

    let (status, body) = send(
        services.router(),
        request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": "ada@university.edu", "password": "wrong-password" })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "ACCOUNT_LOCKED");
}

#[tokio::test]
async fn test_failed_login_without_cache_skips_profile_lookup() {
    let mut services = TestServices::default();
    services
        .auth
        .expect_login()
        .returning(|_, _| Err(AppError::InvalidCredentials));
    // Profile invalidation only looks the account up when Redis is configured
    services.users.expect_find_user_by_email().never();

    let (status, body) = send(
        services.router(),
        request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": "ada@university.edu", "password": "wrong-password" })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_two_factor_verify_for_current_user() {
    let mut services = TestServices::default();
    let user_id = Uuid::new_v4();
    services.authenticate(user_id, &["user"], &[]);
    services
        .two_factor
        .expect_verify()
        .withf(move |id, code| *id == user_id && code == "492039")
        .times(1)
        .returning(|_, _| Ok(()));

    let (status, _) = send(
        services.router(),
        request(
            Method::POST,
            "/api/v1/auth/two-factor/verify",
            Some(json!({ "code": "492039" })),
            Some(TOKEN),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_course_creation_requires_academic_manage() {
    let mut services = TestServices::default();
    services.authenticate(Uuid::new_v4(), &["user"], &["enrollments.write"]);

    let (status, body) = send(
        services.router(),
        request(
            Method::POST,
            "/api/academic/courses",
            Some(json!({
                "code": "CS101",
                "name": "Introduction to Programming",
                "credits": 6,
                "capacity": 100,
                "semester": "2025-FALL"
            })),
            Some(TOKEN),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_health_record_requires_health_manage() {
    let mut services = TestServices::default();
    services.authenticate(Uuid::new_v4(), &["registrar"], &["persons.manage"]);

    let uri = format!("/api/person/persons/{}/health", Uuid::new_v4());
    let (status, _) = send(services.router(), request(Method::GET, &uri, None, Some(TOKEN))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_transcript_hidden_from_plain_users() {
    let mut services = TestServices::default();
    services.authenticate(Uuid::new_v4(), &["user"], &[]);

    let uri = format!("/api/academic/transcripts/{}", Uuid::new_v4());
    let (status, _) = send(services.router(), request(Method::GET, &uri, None, Some(TOKEN))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Enrollment
// =============================================================================

#[tokio::test]
async fn test_enroll_created() {
    let mut services = TestServices::default();
    let (student_id, course_id) = (Uuid::new_v4(), Uuid::new_v4());
    services.authenticate(Uuid::new_v4(), &["user"], &["enrollments.write"]);
    services
        .enrollments
        .expect_enroll()
        .withf(move |s, c| *s == student_id && *c == course_id)
        .returning(|s, c| Ok(enrollment(s, c)));

    let (status, body) = send(
        services.router(),
        request(
            Method::POST,
            "/api/academic/enrollments/enroll",
            Some(json!({ "student_id": student_id, "course_id": course_id })),
            Some(TOKEN),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "enrolled");
}

#[tokio::test]
async fn test_enroll_full_course_conflicts() {
    let mut services = TestServices::default();
    services.authenticate(Uuid::new_v4(), &["admin"], &[]);
    services.enrollments.expect_enroll().returning(|_, _| {
        Err(AppError::conflict_msg(
            "Course is full; join the waiting list instead",
        ))
    });

    let (status, body) = send(
        services.router(),
        request(
            Method::POST,
            "/api/academic/enrollments/enroll",
            Some(json!({ "student_id": Uuid::new_v4(), "course_id": Uuid::new_v4() })),
            Some(TOKEN),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"]["message"],
        "Course is full; join the waiting list instead"
    );
}

#[tokio::test]
async fn test_promote_with_nobody_eligible_is_no_content() {
    let mut services = TestServices::default();
    services.authenticate(Uuid::new_v4(), &["user"], &["enrollments.write"]);
    services
        .enrollments
        .expect_promote_from_waiting_list()
        .returning(|_| Ok(None));

    let uri = format!("/api/academic/waiting-list/courses/{}/promote", Uuid::new_v4());
    let (status, body) = send(
        services.router(),
        request(Method::POST, &uri, None, Some(TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let mut services = TestServices::default();
    services.authenticate(Uuid::new_v4(), &["admin"], &[]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/academic/grades")
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"exam_id\": "))
        .unwrap();
    let (status, body) = send(services.router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
