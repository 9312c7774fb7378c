//! LED installation state and the command boundary that mutates it.

pub mod commands;
pub mod state;
