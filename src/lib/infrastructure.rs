//! Adapters for external services

pub mod config;
pub mod sparkpost;
