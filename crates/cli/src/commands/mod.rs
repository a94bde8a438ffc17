//! CLI commands

pub mod score;
