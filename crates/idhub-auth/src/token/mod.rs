//! Signed access tokens embedding the session id.

pub mod claims;
pub mod issuer;

pub use claims::Claims;
pub use issuer::{AccessTokenIssuer, IssuedAccessToken, JwtIssuer};
