//! Credential infrastructure: JWT tokens and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{JwtAuthority, generate_secret};
pub use password::Sha256PasswordHasher;
