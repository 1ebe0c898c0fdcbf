//! Integration test utilities for the client pipeline
//!
//! This crate provides helpers for driving packets end to end through
//! handlers, the listener registry and the dispatcher.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
