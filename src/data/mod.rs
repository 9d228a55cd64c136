//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Relationship edges (the follow graph)
//! - Follower/following projections derived from the edges
//! - Communities, their posts, likes and comments

mod community;
mod database;
pub mod edges;
pub mod likes;
mod models;
pub mod projections;

pub use database::{Database, DbTransaction};
pub use models::*;
pub use projections::ProjectionRefresh;

#[cfg(test)]
mod database_test;
