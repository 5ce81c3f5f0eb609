//! NiFi REST API contract types and validation
//!
//! This crate defines the request and response entities of the NiFi
//! management API that the client reads and writes. These types are shared
//! between the mock server and the REST client.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
pub use validation::*;
