//! Infrastructure implementations for charla.
//!
//! Concrete adapters behind the seams `charla-core` defines:
//! - [`snapshot::JsonSnapshot`] -- the on-disk store snapshot
//! - [`llm::OpenAiSummaryModel`] -- the text-generation collaborator
//! - [`telegram::TelegramApi`] -- the chat transport collaborator
//! - [`config`] -- config file loading, data dir, env secrets

pub mod config;
pub mod llm;
pub mod snapshot;
pub mod telegram;
