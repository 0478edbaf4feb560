//! Actor entities: the three authenticatable identity kinds.

pub mod kind;
pub mod model;
pub mod source;
pub mod status;

pub use kind::ActorKind;
pub use model::{Credential, DepartmentRoleMapping, DepartmentUser, SuperAdmin, TenantUser};
pub use source::{CredentialRecord, CredentialSource};
pub use status::ActorStatus;
