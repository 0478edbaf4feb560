//! # idhub-auth
//!
//! Credential resolution, MFA policy, session lifecycle, and access-token
//! issuing for idhub.
//!
//! ## Modules
//!
//! - `password` — Argon2id password hashing and verification
//! - `resolver` — ordered credential probing across the three actor kinds
//! - `mfa` — MFA requirement resolution and out-of-band OTP challenges
//! - `session` — refresh-session lifecycle (issue, rotate, revoke, validate)
//! - `token` — signed access tokens embedding the session id

pub mod mfa;
pub mod password;
pub mod resolver;
pub mod session;
pub mod token;

pub use mfa::{MfaChallenger, MfaPolicyResolver};
pub use password::PasswordHasher;
pub use resolver::{AuthResolver, AuthSubject};
pub use session::{SessionCache, SessionManager};
pub use token::{AccessTokenIssuer, Claims, IssuedAccessToken, JwtIssuer};
