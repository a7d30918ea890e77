//! Business logic for the charla digest bot.
//!
//! The pipeline: inbound messages land in the [`store::ConversationStore`]
//! (count-capped on append), periodic jobs in [`jobs`] trim by age, select
//! the recent window, and hand it to the [`summary::Summarizer`], publishing
//! the result through the [`transport::Transport`] seam.
//!
//! This crate defines the traits ([`summary::SummaryModel`],
//! [`transport::Transport`], [`snapshot::SnapshotStore`]) that
//! `charla-infra` implements; core never depends on infra.

pub mod command;
pub mod jobs;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod transport;
