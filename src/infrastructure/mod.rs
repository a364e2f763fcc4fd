//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Telegram Bot API client
//! - Local upload storage and report rendering
//! - Background jobs and Prometheus metrics

pub mod database;
pub mod jobs;
pub mod metrics;
pub mod reports;
pub mod repositories;
pub mod storage;
pub mod telegram;
