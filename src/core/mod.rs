//! Core business logic modules.

pub mod episode_renamer;
pub mod identifier;
pub mod indexer;
pub mod parser;
pub mod prepare;
pub mod reconcile;
pub mod relocate;
pub mod season_renamer;
pub mod validate;
