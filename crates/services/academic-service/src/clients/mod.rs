//! Clients for the services the academic context depends on.

mod person_client;

pub use person_client::{PersonClient, PersonDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use person_client::MockPersonDirectory;
