//! License approval workflow.

pub mod engine;

pub use engine::{DecisionOutcome, LicenseApprovalEngine};
