//! Bot configuration tree.
//!
//! Deserialized from `{data_dir}/config.toml` by `charla-infra`. Every field
//! has a serde default so a missing or partial file still yields a usable
//! configuration. Credentials are never part of this file -- they come from
//! the environment (`TELEGRAM_BOT_TOKEN`, `OPENAI_API_KEY`).

use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// User ids allowed to run gated commands (`/stop`, `/activar_resumenes`).
    pub admin_user_ids: Vec<i64>,
    pub summary: SummaryConfig,
    pub retention: RetentionConfig,
    pub snapshot: SnapshotConfig,
    pub jobs: JobsConfig,
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Trailing window of messages fed to the model, in hours.
    pub window_hours: u32,
    /// Model identifier passed to the OpenAI-compatible endpoint.
    pub model: String,
    /// Completion token budget for one summary.
    pub max_tokens: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            window_hours: 6,
            model: "gpt-4o".to_string(),
            max_tokens: 800,
        }
    }
}

/// Message retention limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Messages older than this are dropped by the cleanup tick, in hours.
    pub max_age_hours: u32,
    /// Hard cap on retained messages per conversation, enforced on append.
    pub max_messages: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: 24,
            max_messages: 5000,
        }
    }
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Minutes between periodic snapshot writes.
    pub interval_minutes: u32,
    /// Write one final snapshot when the process receives a shutdown signal.
    pub flush_on_shutdown: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
            flush_on_shutdown: true,
        }
    }
}

/// Intervals for the periodic jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Hours between auto-summary passes.
    pub summary_interval_hours: u32,
    /// Hours between cleanup passes (one also runs right after startup).
    pub cleanup_interval_hours: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            summary_interval_hours: 6,
            cleanup_interval_hours: 6,
        }
    }
}
