//! HTTP Layer
//!
//! Routes, handlers, and request extractors for the JSON API.

pub mod extractors;
pub mod handlers;
pub mod multipart;
pub mod routes;
