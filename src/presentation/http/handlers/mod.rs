//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints. Handlers build their service
//! from the shared pool on each request.

pub mod health;
pub mod auth;
pub mod telegram;
pub mod user;
pub mod post;
pub mod comment;
pub mod event;
pub mod notification;
pub mod upload;
pub mod admin;
pub mod report;
