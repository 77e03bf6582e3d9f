//! Authentication primitives: JWT issuance/validation, password hashing and
//! the bearer-token guard used by protected routes.

pub mod error;
pub mod guard;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use guard::{AuthUser, Authenticator};
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use token::{Claims, TokenKind, TokenPair, TokenService, UserDirectory};
