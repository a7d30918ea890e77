//! Configuration and secret loading.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`BotConfig`]. Falls back to defaults when the file is missing or
//! malformed. Credentials come from the environment only and are wrapped in
//! [`SecretString`] as early as possible.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, warn};

use charla_types::config::BotConfig;

/// Environment variable naming the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable naming the model provider API key.
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`BotConfig::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the default.
/// - Otherwise: the parsed config (missing fields filled by serde defaults).
pub async fn load_config(data_dir: &Path) -> BotConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config.toml at {}, using defaults", config_path.display());
            return BotConfig::default();
        }
        Err(err) => {
            warn!("failed to read {}: {err}, using defaults", config_path.display());
            return BotConfig::default();
        }
    };

    match toml::from_str::<BotConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(
                "failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BotConfig::default()
        }
    }
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `CHARLA_DATA_DIR` environment variable
/// 2. `~/.charla`
/// 3. `./.charla` when no home directory can be determined
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHARLA_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".charla");
    }
    PathBuf::from(".charla")
}

/// Snapshot file location inside the data directory.
pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join("snapshot.json")
}

/// A required credential is not set in the environment.
#[derive(Debug, Error)]
#[error("missing required environment variable {0}")]
pub struct MissingSecret(pub &'static str);

/// Credentials for the two external collaborators.
pub struct Secrets {
    pub telegram_token: SecretString,
    pub openai_api_key: SecretString,
}

impl Secrets {
    /// Read both credentials from the environment.
    pub fn from_env() -> Result<Self, MissingSecret> {
        Ok(Self {
            telegram_token: require_env(TELEGRAM_TOKEN_VAR)?,
            openai_api_key: require_env(OPENAI_KEY_VAR)?,
        })
    }
}

fn require_env(name: &'static str) -> Result<SecretString, MissingSecret> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(MissingSecret(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.summary.window_hours, 6);
        assert_eq!(config.retention.max_messages, 5000);
    }

    #[tokio::test]
    async fn test_load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
admin_user_ids = [702356304]

[summary]
model = "gpt-4o-mini"
max_tokens = 400

[snapshot]
flush_on_shutdown = false
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.admin_user_ids, vec![702356304]);
        assert_eq!(config.summary.model, "gpt-4o-mini");
        assert_eq!(config.summary.max_tokens, 400);
        assert!(!config.snapshot.flush_on_shutdown);
        // Unmentioned sections keep defaults
        assert_eq!(config.retention.max_age_hours, 24);
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.summary.window_hours, 6);
    }

    #[test]
    fn test_require_env_missing_and_empty() {
        // SAFETY: test-local variable names, cleaned up below.
        unsafe { std::env::remove_var("CHARLA_TEST_SECRET") };
        assert!(require_env("CHARLA_TEST_SECRET").is_err());

        unsafe { std::env::set_var("CHARLA_TEST_SECRET", "   ") };
        assert!(require_env("CHARLA_TEST_SECRET").is_err());

        unsafe { std::env::set_var("CHARLA_TEST_SECRET", "token-value") };
        assert!(require_env("CHARLA_TEST_SECRET").is_ok());

        unsafe { std::env::remove_var("CHARLA_TEST_SECRET") };
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("/tmp/data")),
            PathBuf::from("/tmp/data/snapshot.json")
        );
    }
}
