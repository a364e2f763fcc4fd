//! # Domain Services
//!
//! Pure business rules that don't belong to a single entity.
//!
//! - **username**: picking a free username for a new Telegram account
//! - **rating**: averaging comment ratings into a post rating

mod rating;
mod username;

pub use rating::*;
pub use username::*;
