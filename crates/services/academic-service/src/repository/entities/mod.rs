//! SeaORM entities for the academic schema.

pub mod course;
pub mod enrollment;
pub mod exam;
pub mod grade;
pub mod grade_objection;
pub mod waiting_list_entry;
