//! SeaORM entities for the person schema.

pub mod address;
pub mod emergency_contact;
pub mod health_record;
pub mod person;
pub mod restriction;
pub mod staff;
pub mod student;
