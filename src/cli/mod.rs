//! CLI module for variantgen - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
