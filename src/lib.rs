//! Garland LED relay hub library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod config;
pub mod lights;
pub mod routes;
pub mod state;
pub mod weather;
pub mod ws;
