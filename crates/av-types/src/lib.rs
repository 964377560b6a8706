//! Shared types and error types for the AuthVisage client SDK

pub mod errors;

pub use errors::{AuthError, AuthResult};
