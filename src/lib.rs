//! plex-leon library
//!
//! Reconciles and normalizes media libraries whose titles carry an embedded
//! `{tvdb-<digits>}` identifier.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
