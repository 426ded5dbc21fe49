//! Game Reviews API
//!
//! A REST service over users, games and the reviews that link them:
//! - CRUD endpoints for each record type, form-encoded in and JSON out
//! - a users-by-game view through the review association
//! - per-request control over which relations a response embeds

pub mod app;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod fields;
pub mod routes;
pub mod serializer;
pub mod state;
