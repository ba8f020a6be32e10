//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use domain::academic::{
    Course, CourseResult, CourseSeats, Enrollment, EnrollmentStatus, Exam, ExamKind,
    GradeObjection, GradeResponse, LetterGrade, ObjectionStatus, Transcript, WaitingListEntry,
};
use domain::identity::{
    LoginAttempt, LoginFailureReason, Permission, Role, RoleResponse, TokenResponse,
    TwoFactorSetup, UserResponse,
};
use domain::person::{
    Address, AddressKind, BloodType, EmergencyContact, EnrollmentEligibility, Gender,
    HealthRecord, Person, PersonRestriction, RestrictionKind, Staff, StaffStatus, Student,
    StudentStatus,
};

use crate::handlers::auth_handler::{
    ChangePasswordRequest, DisableTwoFactorRequest, LoginRequest, RefreshRequest,
    RegisterRequest, TwoFactorCodeRequest,
};
use crate::handlers::course_handler::{CreateCourseRequest, UpdateCourseRequest};
use crate::handlers::enrollment_handler::EnrollRequest;
use crate::handlers::exam_handler::{CreateExamRequest, UpdateExamRequest};
use crate::handlers::grade_handler::{
    ApproveObjectionRequest, FileObjectionRequest, RecordGradeRequest, RejectObjectionRequest,
    UpdateGradeRequest,
};
use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::person_handler::{
    AddressRequest, CreatePersonRequest, EmergencyContactRequest, HealthRecordRequest,
    LiftRestrictionRequest, RestrictionRequest, UpdatePersonRequest,
};
use crate::handlers::role_handler::{
    CreatePermissionRequest, CreateRoleRequest, RolePermissionRequest, UpdateRoleRequest,
};
use crate::handlers::staff_handler::{CreateStaffRequest, TerminateStaffRequest, UpdateStaffRequest};
use crate::handlers::student_handler::{
    ChangeStatusRequest, CreateStudentRequest, UpdateStudentRequest,
};
use crate::handlers::user_handler::{
    AssignRoleRequest, GrantPermissionRequest, LockUserRequest, UpdateUserRequest,
};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::auth_handler::register,
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::refresh,
        crate::handlers::auth_handler::logout,
        crate::handlers::auth_handler::change_password,
        crate::handlers::auth_handler::setup_two_factor,
        crate::handlers::auth_handler::verify_two_factor,
        crate::handlers::auth_handler::disable_two_factor,
        crate::handlers::user_handler::get_current_user,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::restore_user,
        crate::handlers::user_handler::lock_user,
        crate::handlers::user_handler::unlock_user,
        crate::handlers::user_handler::activate_user,
        crate::handlers::user_handler::deactivate_user,
        crate::handlers::user_handler::login_history,
        crate::handlers::user_handler::user_roles,
        crate::handlers::user_handler::assign_role,
        crate::handlers::user_handler::remove_role,
        crate::handlers::user_handler::user_permissions,
        crate::handlers::user_handler::grant_permission,
        crate::handlers::user_handler::revoke_permission,
        crate::handlers::role_handler::list_roles,
        crate::handlers::role_handler::get_role,
        crate::handlers::role_handler::create_role,
        crate::handlers::role_handler::update_role,
        crate::handlers::role_handler::delete_role,
        crate::handlers::role_handler::add_role_permission,
        crate::handlers::role_handler::remove_role_permission,
        crate::handlers::role_handler::list_permissions,
        crate::handlers::role_handler::create_permission,
        crate::handlers::role_handler::delete_permission,
        crate::handlers::person_handler::list_persons,
        crate::handlers::person_handler::create_person,
        crate::handlers::person_handler::get_person,
        crate::handlers::person_handler::update_person,
        crate::handlers::person_handler::delete_person,
        crate::handlers::person_handler::restore_person,
        crate::handlers::person_handler::list_addresses,
        crate::handlers::person_handler::add_address,
        crate::handlers::person_handler::update_address,
        crate::handlers::person_handler::remove_address,
        crate::handlers::person_handler::list_contacts,
        crate::handlers::person_handler::add_contact,
        crate::handlers::person_handler::remove_contact,
        crate::handlers::person_handler::list_restrictions,
        crate::handlers::person_handler::add_restriction,
        crate::handlers::person_handler::lift_restriction,
        crate::handlers::person_handler::get_health_record,
        crate::handlers::person_handler::upsert_health_record,
        crate::handlers::student_handler::list_students,
        crate::handlers::student_handler::create_student,
        crate::handlers::student_handler::get_student,
        crate::handlers::student_handler::update_student,
        crate::handlers::student_handler::change_status,
        crate::handlers::student_handler::delete_student,
        crate::handlers::student_handler::enrollment_eligibility,
        crate::handlers::staff_handler::list_staff,
        crate::handlers::staff_handler::create_staff,
        crate::handlers::staff_handler::get_staff,
        crate::handlers::staff_handler::update_staff,
        crate::handlers::staff_handler::terminate_staff,
        crate::handlers::staff_handler::delete_staff,
        crate::handlers::course_handler::list_courses,
        crate::handlers::course_handler::create_course,
        crate::handlers::course_handler::get_course,
        crate::handlers::course_handler::update_course,
        crate::handlers::course_handler::delete_course,
        crate::handlers::course_handler::restore_course,
        crate::handlers::course_handler::seats,
        crate::handlers::exam_handler::create_exam,
        crate::handlers::exam_handler::get_exam,
        crate::handlers::exam_handler::list_exams,
        crate::handlers::exam_handler::update_exam,
        crate::handlers::exam_handler::delete_exam,
        crate::handlers::enrollment_handler::enroll,
        crate::handlers::enrollment_handler::list_enrollments,
        crate::handlers::enrollment_handler::get_enrollment,
        crate::handlers::enrollment_handler::drop_enrollment,
        crate::handlers::enrollment_handler::complete_enrollment,
        crate::handlers::enrollment_handler::join_waiting_list,
        crate::handlers::enrollment_handler::leave_waiting_list,
        crate::handlers::enrollment_handler::waiting_list,
        crate::handlers::enrollment_handler::promote_from_waiting_list,
        crate::handlers::grade_handler::record_grade,
        crate::handlers::grade_handler::list_grades,
        crate::handlers::grade_handler::get_grade,
        crate::handlers::grade_handler::update_grade,
        crate::handlers::grade_handler::transcript,
        crate::handlers::grade_handler::file_objection,
        crate::handlers::grade_handler::list_objections,
        crate::handlers::grade_handler::get_objection,
        crate::handlers::grade_handler::approve_objection,
        crate::handlers::grade_handler::reject_objection,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            ChangePasswordRequest,
            TwoFactorCodeRequest,
            DisableTwoFactorRequest,
            TokenResponse,
            TwoFactorSetup,
            UserResponse,
            UpdateUserRequest,
            LockUserRequest,
            AssignRoleRequest,
            GrantPermissionRequest,
            LoginAttempt,
            LoginFailureReason,
            Role,
            RoleResponse,
            Permission,
            CreateRoleRequest,
            UpdateRoleRequest,
            RolePermissionRequest,
            CreatePermissionRequest,
            Person,
            Gender,
            CreatePersonRequest,
            UpdatePersonRequest,
            Address,
            AddressKind,
            AddressRequest,
            EmergencyContact,
            EmergencyContactRequest,
            PersonRestriction,
            RestrictionKind,
            RestrictionRequest,
            LiftRestrictionRequest,
            HealthRecord,
            BloodType,
            HealthRecordRequest,
            Student,
            StudentStatus,
            CreateStudentRequest,
            UpdateStudentRequest,
            ChangeStatusRequest,
            EnrollmentEligibility,
            Staff,
            StaffStatus,
            CreateStaffRequest,
            UpdateStaffRequest,
            TerminateStaffRequest,
            Course,
            CourseSeats,
            CreateCourseRequest,
            UpdateCourseRequest,
            Exam,
            ExamKind,
            CreateExamRequest,
            UpdateExamRequest,
            Enrollment,
            EnrollmentStatus,
            EnrollRequest,
            WaitingListEntry,
            GradeResponse,
            LetterGrade,
            RecordGradeRequest,
            UpdateGradeRequest,
            Transcript,
            CourseResult,
            GradeObjection,
            ObjectionStatus,
            FileObjectionRequest,
            ApproveObjectionRequest,
            RejectObjectionRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Dependency status"),
        (name = "Authentication", description = "Registration, login, tokens and two-factor"),
        (name = "Users", description = "User accounts, locks, roles and direct permissions"),
        (name = "Roles", description = "Roles and permissions"),
        (name = "Persons", description = "Person records, contacts, restrictions and health"),
        (name = "Students", description = "Student profiles"),
        (name = "Staff", description = "Staff employment records"),
        (name = "Courses", description = "Course catalogue"),
        (name = "Exams", description = "Exams and their weights"),
        (name = "Enrollments", description = "Course enrollments"),
        (name = "Waiting list", description = "Queues for full courses"),
        (name = "Grades", description = "Grades and transcripts"),
        (name = "Objections", description = "Grade objections"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
