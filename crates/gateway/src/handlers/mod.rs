//! HTTP request handlers.

pub mod auth_handler;
pub mod course_handler;
pub mod enrollment_handler;
pub mod exam_handler;
pub mod grade_handler;
pub mod health_handler;
pub mod person_handler;
pub mod role_handler;
pub mod staff_handler;
pub mod student_handler;
pub mod user_handler;

use serde::Deserialize;
use utoipa::IntoParams;

use common::PaginationParams;

pub use auth_handler::{account_routes, auth_routes};
pub use course_handler::course_routes;
pub use enrollment_handler::{enrollment_routes, waiting_list_routes};
pub use exam_handler::exam_routes;
pub use grade_handler::{grade_routes, objection_routes, transcript_routes};
pub use health_handler::health_routes;
pub use person_handler::person_routes;
pub use role_handler::{permission_routes, role_routes};
pub use staff_handler::staff_routes;
pub use student_handler::student_routes;
pub use user_handler::user_routes;

/// `?page=&per_page=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Items per page, at most 100
    pub per_page: Option<u64>,
}

impl From<PageQuery> for PaginationParams {
    fn from(query: PageQuery) -> Self {
        let defaults = PaginationParams::default();
        PaginationParams::new(
            query.page.unwrap_or(defaults.page),
            query.per_page.unwrap_or(defaults.per_page),
        )
    }
}
