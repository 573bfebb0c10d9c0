//! CLI module for autodeliver - command-line interface and subcommands.
//!
//! One binary, two daemons: `processor` and `relay`, plus a `classify` debug aid.

pub mod commands;

pub use commands::Cli;
