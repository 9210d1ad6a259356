//! Archiver configuration: defaults, optional TOML file, environment, CLI.
//!
//! Layers are applied in that order; later layers win. The access token is
//! only ever read from the environment so it never lands in a config file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_STALE_MONTHS: u32 = 2;
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TABLE_PATH: &str = "ARCHIVED_REPOS.md";
pub const DEFAULT_RECORDS_PATH: &str = "archive_log.json";

pub const ENV_USERNAME: &str = "MY_GITHUB_USERNAME";
pub const ENV_TOKEN: &str = "MY_GITHUB_TOKEN";
pub const ENV_STALE_MONTHS: &str = "STALE_MONTHS";
pub const ENV_API_URL: &str = "GITHUB_API_URL";
pub const ENV_SLACK_WEBHOOK: &str = "SLACK_WEBHOOK_URL";
pub const ENV_DISCORD_WEBHOOK: &str = "DISCORD_WEBHOOK_URL";

/// Fatal configuration problems, reported before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0} (set it in the environment)")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Optional settings file (TOML). Every field may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub username: Option<String>,
    pub stale_months: Option<u32>,
    pub api_url: Option<String>,
    pub table_path: Option<PathBuf>,
    pub records_path: Option<PathBuf>,
    pub slack_webhook_url: Option<String>,
    pub discord_webhook_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub stale_months: Option<u32>,
}

/// Outbound notification targets. Both may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookConfig {
    pub slack: Option<Url>,
    pub discord: Option<Url>,
}

impl WebhookConfig {
    pub fn is_empty(&self) -> bool {
        self.slack.is_none() && self.discord.is_none()
    }
}

/// Fully resolved and validated configuration for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub username: String,
    pub token: String,
    pub stale_months: u32,
    pub api_url: Url,
    pub table_path: PathBuf,
    pub records_path: PathBuf,
    pub webhooks: WebhookConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("stale_months", &self.stale_months)
            .field("api_url", &self.api_url.as_str())
            .field("table_path", &self.table_path)
            .field("records_path", &self.records_path)
            .field("webhooks", &self.webhooks)
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env(
        config_path: Option<&Path>,
        overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        Self::load(config_path, |key| std::env::var(key).ok(), overrides)
    }

    /// Resolve configuration using `lookup` for environment variables.
    ///
    /// Blank environment values count as unset.
    pub fn load<F>(
        config_path: Option<&Path>,
        lookup: F,
        overrides: &CliOverrides,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match config_path {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let username = env(ENV_USERNAME)
            .or(file.username)
            .ok_or(ConfigError::Missing(ENV_USERNAME))?;
        let token = env(ENV_TOKEN).ok_or(ConfigError::Missing(ENV_TOKEN))?;

        let env_stale_months = env(ENV_STALE_MONTHS)
            .map(|raw| parse_stale_months(&raw))
            .transpose()?;
        let stale_months = overrides
            .stale_months
            .or(env_stale_months)
            .or(file.stale_months)
            .unwrap_or(DEFAULT_STALE_MONTHS);

        let api_url = env(ENV_API_URL)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_http_url(ENV_API_URL, &api_url)?;

        let slack = env(ENV_SLACK_WEBHOOK)
            .or(file.slack_webhook_url)
            .and_then(|raw| parse_webhook(ENV_SLACK_WEBHOOK, &raw));
        let discord = env(ENV_DISCORD_WEBHOOK)
            .or(file.discord_webhook_url)
            .and_then(|raw| parse_webhook(ENV_DISCORD_WEBHOOK, &raw));

        let cfg = Self {
            username: username.trim().to_string(),
            token: token.trim().to_string(),
            stale_months,
            api_url,
            table_path: file
                .table_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE_PATH)),
            records_path: file
                .records_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RECORDS_PATH)),
            webhooks: WebhookConfig { slack, discord },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::Missing(ENV_USERNAME));
        }
        if self.username.contains('/') {
            return Err(ConfigError::Invalid {
                key: ENV_USERNAME,
                message: "must be a single account name".to_string(),
            });
        }
        if self.token.is_empty() {
            return Err(ConfigError::Missing(ENV_TOKEN));
        }
        if self.table_path.as_os_str().is_empty() || self.records_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "table_path/records_path",
                message: "log file paths must be non-empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_stale_months(raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|err| ConfigError::Invalid {
            key: ENV_STALE_MONTHS,
            message: format!("expected a non-negative whole number of months, got {raw:?} ({err})"),
        })
}

fn parse_http_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::Invalid {
        key,
        message: format!("{raw:?} is not a URL ({err})"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key,
            message: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    Ok(url)
}

/// Notifications never fail a run, so a bad webhook only disables its target.
fn parse_webhook(key: &'static str, raw: &str) -> Option<Url> {
    match parse_http_url(key, raw) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(error = %err, "ignoring webhook target");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![(ENV_USERNAME, "octo"), (ENV_TOKEN, "secret")]
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let cfg = AppConfig::load(None, env_of(&credentials()), &CliOverrides::default())
            .expect("load");
        assert_eq!(cfg.username, "octo");
        assert_eq!(cfg.stale_months, DEFAULT_STALE_MONTHS);
        assert_eq!(cfg.api_url.as_str(), "https://api.github.com/");
        assert_eq!(cfg.table_path, PathBuf::from(DEFAULT_TABLE_PATH));
        assert_eq!(cfg.records_path, PathBuf::from(DEFAULT_RECORDS_PATH));
        assert!(cfg.webhooks.is_empty());
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = AppConfig::load(
            None,
            env_of(&[(ENV_USERNAME, "octo"), (ENV_TOKEN, "  ")]),
            &CliOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_TOKEN)));
    }

    #[test]
    fn missing_username_is_a_config_error() {
        let err = AppConfig::load(None, env_of(&[(ENV_TOKEN, "t")]), &CliOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_USERNAME)));
    }

    #[test]
    fn malformed_stale_months_fails_fast() {
        for raw in ["abc", "-3", "1.5"] {
            let mut pairs = credentials();
            pairs.push((ENV_STALE_MONTHS, raw));
            let err =
                AppConfig::load(None, env_of(&pairs), &CliOverrides::default()).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: ENV_STALE_MONTHS, .. }),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn layers_resolve_file_then_env_then_cli() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("archiver.toml");
        fs::write(
            &path,
            "username = \"from-file\"\nstale_months = 6\ntable_path = \"logs/table.md\"\n\
             discord_webhook_url = \"https://discord.example/hook\"\n",
        )
        .expect("write");

        let file_only =
            AppConfig::load(Some(path.as_path()), env_of(&[(ENV_TOKEN, "t")]), &CliOverrides::default())
                .expect("load");
        assert_eq!(file_only.username, "from-file");
        assert_eq!(file_only.stale_months, 6);
        assert_eq!(file_only.table_path, PathBuf::from("logs/table.md"));
        assert_eq!(
            file_only.webhooks.discord.as_ref().map(Url::as_str),
            Some("https://discord.example/hook")
        );

        let mut pairs = credentials();
        pairs.push((ENV_STALE_MONTHS, "4"));
        let with_env =
            AppConfig::load(Some(path.as_path()), env_of(&pairs), &CliOverrides::default()).expect("load");
        assert_eq!(with_env.username, "octo");
        assert_eq!(with_env.stale_months, 4);

        let with_cli = AppConfig::load(
            Some(path.as_path()),
            env_of(&pairs),
            &CliOverrides {
                stale_months: Some(9),
            },
        )
        .expect("load");
        assert_eq!(with_cli.stale_months, 9);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("archiver.toml");
        fs::write(&path, "stale_month = 3\n").expect("write");

        let err = AppConfig::load(Some(path.as_path()), env_of(&credentials()), &CliOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = AppConfig::load(
            Some(temp.path().join("absent.toml").as_path()),
            env_of(&credentials()),
            &CliOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_webhook_drops_only_that_target() {
        let mut pairs = credentials();
        pairs.push((ENV_SLACK_WEBHOOK, "hooks.slack.com/services/X"));
        pairs.push((ENV_DISCORD_WEBHOOK, "https://discord.example/hook"));

        let cfg = AppConfig::load(None, env_of(&pairs), &CliOverrides::default()).expect("load");

        assert_eq!(cfg.webhooks.slack, None);
        assert_eq!(
            cfg.webhooks.discord.as_ref().map(Url::as_str),
            Some("https://discord.example/hook")
        );
    }

    #[test]
    fn non_http_webhook_is_ignored() {
        let mut pairs = credentials();
        pairs.push((ENV_DISCORD_WEBHOOK, "ftp://hooks.example/x"));

        let cfg = AppConfig::load(None, env_of(&pairs), &CliOverrides::default()).expect("load");

        assert!(cfg.webhooks.is_empty());
    }

    #[test]
    fn debug_output_redacts_token() {
        let cfg = AppConfig::load(None, env_of(&credentials()), &CliOverrides::default())
            .expect("load");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
