//! Repository implementations for all idhub entities.

pub mod audit;
pub mod department_user;
pub mod directory;
pub mod license;
pub mod login_attempt;
pub mod session;
pub mod super_admin;
pub mod tenant_user;

pub use audit::AuditLogRepository;
pub use department_user::DepartmentUserRepository;
pub use directory::PgDirectory;
pub use license::PgApprovalStore;
pub use login_attempt::LoginAttemptRepository;
pub use session::PgSessionStore;
pub use super_admin::SuperAdminRepository;
pub use tenant_user::TenantUserRepository;
