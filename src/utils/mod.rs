//! Utilities: archive paths and file hashing

pub mod hash;
pub mod paths;
