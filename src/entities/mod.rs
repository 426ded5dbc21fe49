//! SeaORM entities for the three stored record types.
//!
//! `review` is the association table: each row belongs to exactly one user and
//! one game, which gives users and games a many-to-many relation through it.

pub mod game;
pub mod review;
pub mod user;
