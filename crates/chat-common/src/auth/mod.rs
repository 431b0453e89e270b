//! Token verification

mod jwt;
mod static_verifier;

pub use jwt::{Claims, JwtService};
pub use static_verifier::StaticTokenVerifier;
