//! Command implementations for the nmsa CLI

pub mod align;
pub mod config;
pub mod evaluate;
