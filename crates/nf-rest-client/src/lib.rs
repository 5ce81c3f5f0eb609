//! REST API client for the NiFi management API
//!
//! This crate provides an HTTP client that authenticates against a NiFi
//! instance and issues the component requests the CLI needs: processor
//! creation and run-status changes, connections, and a small sample flow.
//! Every call is a single request awaited in sequence; nothing is retried.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod processor;
pub mod tls;

pub use auth::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use flow::*;
pub use processor::*;
pub use tls::*;

pub use nf_rest_api_contract as contract;
