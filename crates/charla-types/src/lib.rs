//! Shared domain types for charla.
//!
//! This crate contains the types used across the charla digest bot:
//! conversations, stored messages, configuration, and error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
