//! Vetrina: a product catalog service backed by Postgres with an optional
//! Redis look-aside cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
