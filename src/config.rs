use poise::serenity_prelude as serenity;
use serde::Deserialize;
use serenity::{ChannelId, GuildId, UserId};
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    NotFound(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("config field `{field}` is not a valid id: {value}")]
    InvalidId { field: &'static str, value: String },
}

/// Settings the bot reads once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub token_testing: Option<String>,
    pub debug_prefix: String,
    pub testing: bool,
    pub testing_guild_id: Option<GuildId>,
    pub bot_test_channel_id: Option<ChannelId>,
    pub mod_help_channel_id: Option<ChannelId>,
    pub alert_channel_id: Option<ChannelId>,
    pub alert_user_id: Option<UserId>,
}

impl BotConfig {
    /// The token to log in with; test deployments use the test bot when one is configured.
    pub fn active_token(&self) -> &str {
        match (&self.token_testing, self.testing) {
            (Some(token), true) => token,
            _ => &self.token,
        }
    }
}

// Ids show up both as strings and as bare numbers in existing config files.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct RawConfig {
    token: Option<String>,
    token_testing: Option<String>,
    debug_prefix: Option<String>,
    #[serde(default)]
    testing: bool,
    testing_guild_id: Option<RawId>,
    bot_test_channel_id: Option<RawId>,
    mod_help_channel_id: Option<RawId>,
    alert_channel_id: Option<RawId>,
    alert_user_id: Option<RawId>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingField(field)),
    }
}

fn optional_id(raw: Option<RawId>, field: &'static str) -> Result<Option<u64>, ConfigError> {
    let value = match raw {
        Some(RawId::Number(0)) => {
            return Err(ConfigError::InvalidId {
                field,
                value: "0".to_string(),
            })
        }
        Some(RawId::Number(id)) => return Ok(Some(id)),
        Some(RawId::Text(text)) if !text.trim().is_empty() => text,
        _ => {
            log::warn!("Config field `{field}` is not set, features that need it are disabled");
            return Ok(None);
        }
    };

    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(Some(id)),
        _ => Err(ConfigError::InvalidId { field, value }),
    }
}

fn parse(content: &str) -> Result<BotConfig, ConfigError> {
    let raw: RawConfig = serde_json::from_str(content)?;

    let token = required(raw.token, "token")?;
    let debug_prefix = required(raw.debug_prefix, "debug_prefix")?;

    let bot_test_channel_id = optional_id(raw.bot_test_channel_id, "bot_test_channel_id")?
        .map(ChannelId::new);

    // The alert channel is a newer setting; older configs alert into the bot test channel.
    let alert_channel_id = match raw.alert_channel_id {
        Some(raw_id) => optional_id(Some(raw_id), "alert_channel_id")?.map(ChannelId::new),
        None => bot_test_channel_id,
    };

    Ok(BotConfig {
        token,
        token_testing: raw.token_testing.filter(|token| !token.trim().is_empty()),
        debug_prefix,
        testing: raw.testing,
        testing_guild_id: optional_id(raw.testing_guild_id, "testing_guild_id")?
            .map(GuildId::new),
        bot_test_channel_id,
        mod_help_channel_id: optional_id(raw.mod_help_channel_id, "mod_help_channel_id")?
            .map(ChannelId::new),
        alert_channel_id,
        alert_user_id: optional_id(raw.alert_user_id, "alert_user_id")?.map(UserId::new),
    })
}

/// Read and validate the bot configuration at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<BotConfig, ConfigError> {
    let path = path.as_ref();
    log::info!("Grabbing {} information...", path.display());

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_testing_config() {
        let config = parse(r#"{"token": "x", "debug_prefix": "!", "testing": true}"#).unwrap();

        assert_eq!(config.token, "x");
        assert_eq!(config.debug_prefix, "!");
        assert!(config.testing);
        assert!(config.mod_help_channel_id.is_none());
        assert!(config.bot_test_channel_id.is_none());
        assert!(config.testing_guild_id.is_none());
        assert!(config.alert_channel_id.is_none());
    }

    #[test]
    fn test_unset_ids_are_warned_about() {
        crate::logging::capture::start();

        parse(r#"{"token": "x", "debug_prefix": "!", "testing": true}"#).unwrap();

        let warnings: Vec<String> = crate::logging::capture::take()
            .into_iter()
            .filter(|line| line.level == log::Level::Warn)
            .map(|line| line.message)
            .collect();
        for field in [
            "mod_help_channel_id",
            "bot_test_channel_id",
            "testing_guild_id",
            "alert_user_id",
        ] {
            assert!(
                warnings.iter().any(|warning| warning.contains(field)),
                "no warning about {field} in {warnings:?}"
            );
        }
    }

    #[test]
    fn test_set_ids_are_not_warned_about() {
        crate::logging::capture::start();

        parse(
            r#"{"token": "x", "debug_prefix": "!", "mod_help_channel_id": "839751998445846568"}"#,
        )
        .unwrap();

        let warnings = crate::logging::capture::take();
        assert!(!warnings
            .iter()
            .any(|line| line.message.contains("mod_help_channel_id")));
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"{
                "token": "prod",
                "token_testing": "test",
                "debug_prefix": "!",
                "testing": false,
                "testing_guild_id": "839651379034193920",
                "bot_test_channel_id": "1062430492558888980",
                "mod_help_channel_id": 839751998445846568
            }"#,
        )
        .unwrap();

        assert_eq!(config.testing_guild_id, Some(GuildId::new(839651379034193920)));
        assert_eq!(
            config.mod_help_channel_id,
            Some(ChannelId::new(839751998445846568))
        );
        // Falls back to the bot test channel
        assert_eq!(
            config.alert_channel_id,
            Some(ChannelId::new(1062430492558888980))
        );
        assert_eq!(config.active_token(), "prod");
    }

    #[test]
    fn test_active_token_switches_when_testing() {
        let config = parse(
            r#"{"token": "prod", "token_testing": "test", "debug_prefix": "!", "testing": true}"#,
        )
        .unwrap();
        assert_eq!(config.active_token(), "test");

        let config = parse(r#"{"token": "prod", "debug_prefix": "!", "testing": true}"#).unwrap();
        assert_eq!(config.active_token(), "prod");
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(matches!(
            parse(r#"{"debug_prefix": "!"}"#),
            Err(ConfigError::MissingField("token"))
        ));
        assert!(matches!(
            parse(r#"{"token": "x", "debug_prefix": ""}"#),
            Err(ConfigError::MissingField("debug_prefix"))
        ));
    }

    #[test]
    fn test_invalid_ids_are_rejected() {
        assert!(matches!(
            parse(r#"{"token": "x", "debug_prefix": "!", "mod_help_channel_id": "general"}"#),
            Err(ConfigError::InvalidId {
                field: "mod_help_channel_id",
                ..
            })
        ));
        assert!(matches!(
            parse(r#"{"token": "x", "debug_prefix": "!", "alert_user_id": 0}"#),
            Err(ConfigError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_empty_id_is_unset() {
        let config =
            parse(r#"{"token": "x", "debug_prefix": "!", "bot_test_channel_id": ""}"#).unwrap();
        assert!(config.bot_test_channel_id.is_none());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse("{ token: "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(dir.path().join("config.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token": "x", "debug_prefix": "!", "testing": true}}"#).unwrap();

        let config = load(file.path()).unwrap();
        assert!(config.testing);
    }
}
