//! `bazaar-core` — shared marketplace primitives.
//!
//! This crate contains **pure** building blocks (no HTTP, no storage).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::EntityKind;
pub use error::{DomainError, DomainResult};
pub use id::{OfferId, PrincipalId, ReportId};
