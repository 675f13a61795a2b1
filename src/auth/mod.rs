//! Authentication and authorization
//!
//! - **password**: salted digests for stored credentials
//! - **token**: base64 JSON session tokens, optionally signed
//! - **session**: axum extractors reading the `auth_token` cookie
//! - **policy**: per-rank permissions

pub mod password;
pub mod policy;
pub mod session;
pub mod token;

pub use password::{hash_password, verify_password};
pub use policy::Permission;
pub use session::{OptionalSession, Session, AUTH_COOKIE};
pub use token::{SessionClaims, TokenCodec, TokenError};
