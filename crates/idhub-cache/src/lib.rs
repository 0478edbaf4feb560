//! # idhub-cache
//!
//! Cache provider implementations for idhub. Supports three modes:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//! - **disabled**: No fast path at all — the database answers everything
//!
//! The provider is selected at runtime based on configuration. The cache
//! is never authoritative: every consumer treats absence and errors as
//! misses and falls back to the database.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
