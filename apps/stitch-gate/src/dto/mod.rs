//! Data transfer objects

pub mod upload;
