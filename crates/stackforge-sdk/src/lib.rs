//! # stackforge-sdk
//!
//! Public SDK for using Stackforge as a Rust library.
//!
//! Provides two entry points:
//! - [`Generator`](generator::Generator): compiles every enabled artifact, then writes it.
//! - [`ManifestWriter`](writer::ManifestWriter): where files go, on disk or in memory.
//!
//! # Example
//!
//! ```rust,no_run
//! use stackforge_common::config::ProjectConfig;
//! use stackforge_sdk::generator::Generator;
//! use stackforge_sdk::writer::DirectoryWriter;
//!
//! let mut writer = DirectoryWriter::new("./my-api");
//! let report = Generator::new(ProjectConfig::new("my-api")).generate(&mut writer);
//! ```

pub mod generator;
pub mod writer;
