//! # stackforge-compose
//!
//! Turns a validated [`ProjectConfig`](stackforge_common::config::ProjectConfig)
//! into a compose-style service graph.
//!
//! Handles:
//! - **Descriptor**: the abstract, pre-serialization model of one runnable unit.
//! - **Catalog**: maps a configuration to one descriptor per requested component.
//! - **Healthcheck** / **Network**: small factories for embedded sub-structures.
//! - **Graph**: dependency validation and deterministic topological ordering.
//! - **Compiler**: projects the ordered descriptors into a compose document.
//! - **Env**: environment file and build ignore list emission.

pub mod catalog;
pub mod compiler;
pub mod descriptor;
pub mod env;
pub mod graph;
pub mod healthcheck;
pub mod network;
