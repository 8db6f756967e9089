//! # stackforge-cluster
//!
//! Compiles a validated project configuration into cluster resource
//! documents that agree with each other and with the compose output on
//! every name, label and store key.
//!
//! Handles:
//! - **Resources**: typed workload, endpoint, store, route, autoscaler and claim documents.
//! - **Connection**: the settings table every store and env reference is projected from.
//! - **Builders**: one module per resource family.
//! - **Compiler**: emission order, file names, and reference checking.
//! - **Readme**: the apply-order deployment guide.

pub mod compiler;
pub mod connection;
pub mod deployment;
pub mod hpa;
pub mod ingress;
pub mod pvc;
pub mod readme;
pub mod references;
pub mod resources;
pub mod service;
pub mod stores;
