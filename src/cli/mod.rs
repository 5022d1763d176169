//! Command line interface for the Verbena recommendation engine.

pub mod args;
pub mod commands;
pub mod output;
