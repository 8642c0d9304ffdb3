//! Caching proxy that serves the current best Hacker News stories, highest
//! score first.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
