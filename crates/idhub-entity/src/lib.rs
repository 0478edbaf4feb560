//! # idhub-entity
//!
//! Domain entity models for idhub. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.
//!
//! Persistence seams (`SessionStore`, `ApprovalStore`, `CredentialSource`,
//! ...) are defined next to the entities they move, so that consumers can
//! be tested against in-memory implementations.

pub mod actor;
pub mod audit;
pub mod directory;
pub mod license;
pub mod login_attempt;
pub mod mfa;
pub mod session;
pub mod tenant;
