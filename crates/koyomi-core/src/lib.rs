//! Koyomi availability engine - shared core types and configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
