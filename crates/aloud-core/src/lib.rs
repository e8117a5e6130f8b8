//! Core types, config, and errors for aloud.

pub mod config;
pub mod error;
