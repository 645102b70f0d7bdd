//! CLI commands

pub mod functions;
pub mod run;
pub mod schema;
