//! Thin control facade over a Docker-compatible container engine.
//!
//! `dockhand` forwards container lifecycle, image and network operations to
//! the engine's REST API through `bollard`, adding only light pre- and
//! post-processing: default substitution, filter construction and exact-match
//! scans over listings.
//!
//! # Modules
//!
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Engine connection, client seam and the [`engine::RuntimeFacade`]
//! - [`error`]: Semantic error types for the library

pub mod config;
pub mod engine;
pub mod error;
