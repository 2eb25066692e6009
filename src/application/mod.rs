//! Application services layer scaffolding.

pub mod catalog;
pub mod error;
pub mod repos;
