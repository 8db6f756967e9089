//! # stackforge-common
//!
//! Shared error taxonomy, project configuration model, managed dependency
//! catalogue, naming/label rules, and constants used across the entire
//! Stackforge workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate. Both the compose compiler and the cluster manifest
//! compiler derive every artifact name from the helpers in [`naming`], so
//! documents generated independently agree with each other.

pub mod config;
pub mod constants;
pub mod error;
pub mod naming;
pub mod types;
