//! Route network CLI library.
//!
//! Command handlers, output rendering and terminal styling behind the
//! `routenet-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
