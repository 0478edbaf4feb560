//! License allocation and approval-workflow entities.

pub mod allocation;
pub mod approval;
pub mod level;
pub mod request;
pub mod store;

pub use allocation::{LicenseAllocation, ResourceType};
pub use approval::{LicenseUpdateApproval, StepDecision};
pub use level::ApprovalLevel;
pub use request::{ChangeDirection, LicenseUpdateRequest, NewLicenseRequest, RequestStatus};
pub use store::{ApprovalStore, DecisionApplied};
