//! Atlasq - parse texture atlas descriptions into a queryable object graph
//!
//! This library provides functionality to:
//! - Parse the line-oriented atlas format emitted by sprite packers
//! - Group regions by page while preserving file order
//! - Navigate the parsed graph by attribute path and render it as JSON

pub mod atlas;
pub mod cli;
pub mod models;
pub mod output;
pub mod parser;
pub mod query;
