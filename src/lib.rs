//! Projecthub: project records for a multi-service project-management
//! backend.
//!
//! This crate manages projects (create, read, update, complete, soft delete)
//! on behalf of authenticated callers, and keeps a remote task service in
//! step when projects are completed or deleted.
//!
//! # Architecture
//!
//! Projecthub follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, memory)
//!
//! # Modules
//!
//! - [`project`]: Project lifecycle, access policy and task-service calls
//! - [`config`]: Environment-driven runtime configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod project;
pub mod telemetry;
