//! Person and HR aggregates.

mod contact;
mod eligibility;
mod entity;
mod health;
mod restriction;
mod staff;
mod student;

pub use contact::{Address, AddressData, AddressKind, EmergencyContact};
pub use eligibility::EnrollmentEligibility;
pub use entity::{Gender, NewPerson, Person, PersonUpdate};
pub use health::{BloodType, HealthRecord, HealthRecordData};
pub use restriction::{PersonRestriction, RestrictionKind};
pub use staff::{Staff, StaffStatus};
pub use student::{Student, StudentStatus};
