//! # Domain Layer
//!
//! The domain layer contains the core business rules of the platform.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities and their repository traits
//! - **value_objects**: Immutable value types (Role)
//! - **services**: Pure rules shared by several application services
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
