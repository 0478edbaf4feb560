//! Login orchestration.

pub mod service;

pub use service::{AuthService, LoginOutcome, LoginSuccess};
