//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! - **Role**: numeric account role carried in every access token

mod role;

pub use role::*;
