//! Adapter implementations for project lifecycle ports.

pub mod http;
pub mod memory;
pub mod postgres;

mod identity;

pub use identity::StaticIdentity;
