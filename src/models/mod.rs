//! Data models.

pub mod config;
pub mod decision;
pub mod media;
pub mod report;
