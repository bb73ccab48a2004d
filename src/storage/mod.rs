//! Storage modules: config and the per-snapshot metadata cache

pub mod config;
pub mod metadata;
