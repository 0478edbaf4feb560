//! Collaborator traits consumed across idhub crates.
//!
//! Domain-shaped persistence traits live next to their entity models in
//! `idhub-entity`; this module only holds the seams with no domain types.

pub mod cache;
pub mod notifier;

pub use cache::CacheProvider;
pub use notifier::Notifier;
