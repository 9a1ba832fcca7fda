use std::{env, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::plugin::drift_bottle::command::CommandMatcher;

const DEFAULT_CONFIG_PATH: &str = "drift_bottle.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub plugin: PluginConfig,
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub command: CommandConfig,
    pub identity: IdentityConfig,
    pub template: TemplateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub enabled: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// OneBot 正向 WebSocket 地址
    pub address: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            address: "ws://127.0.0.1:3001".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./bottles.native_db".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    pub throw_regex: String,
    pub pick_regex: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            throw_regex: "^扔漂流瓶.+$".to_owned(),
            pick_regex: "^捡漂流瓶$".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// OneBot HTTP 接口地址，不填写时复用 WebSocket 连接查询
    pub endpoint: Option<String>,
}

/// 回复模板，可用的占位符见各字段说明
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// `{content}`
    pub throw_success: String,
    pub empty_content: String,
    pub not_in_group: String,
    /// `{content}` `{sender_name}` `{sender_id}` `{group_name}` `{group_id}`
    pub pick_success: String,
    pub pick_empty: String,
    pub user_info_unavailable: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            throw_success: "你将一个写着【{content}】的纸条塞入瓶中扔进大海，希望有人捞到吧~".to_owned(),
            empty_content: "漂流瓶内容不能为空哦~".to_owned(),
            not_in_group: "漂流瓶只能在群聊中使用哦~".to_owned(),
            pick_success: "你在海边捡到了一个漂流瓶，瓶中的纸条上写着：\n{content}\nBY：{sender_name} ({sender_id})\nFrom：{group_name} ({group_id})"
                .to_owned(),
            pick_empty: "大海里暂时没有漂流瓶，试试自己扔一个吧~".to_owned(),
            user_info_unavailable: "无法获取用户信息".to_owned(),
        }
    }
}

impl Config {
    /// 读取 `DRIFT_BOTTLE_CONFIG` 指向的配置文件（默认 `drift_bottle.toml`），文件不存在时使用默认配置，
    /// 之后再应用环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("DRIFT_BOTTLE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            warn!("Config file {path} not found, using default config");
            Self::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(address) = var("DRIFT_BOTTLE_ADDRESS") {
            self.bot.address = address;
        }
        if let Some(path) = var("DRIFT_BOTTLE_DATABASE") {
            self.database.path = path;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "database.path",
                reason: "database path cannot be empty".to_owned(),
            });
        }
        if self.bot.address.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "bot.address",
                reason: "OneBot address cannot be empty".to_owned(),
            });
        }
        self.command_matcher().map(|_| ())
    }

    pub fn command_matcher(&self) -> Result<CommandMatcher, ConfigError> {
        CommandMatcher::new(&self.command.throw_regex, &self.command.pick_regex).map_err(|e| ConfigError::Invalid {
            field: "command",
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::plugin::drift_bottle::command::Command;

    #[test]
    fn test_default_config() {
        let config = Config::from_toml("").unwrap();
        assert!(config.plugin.enabled);
        assert_eq!(config.bot.address, "ws://127.0.0.1:3001");
        assert_eq!(config.identity.endpoint, None);
        assert!(config.validate().is_ok());
        let matcher = config.command_matcher().unwrap();
        assert_eq!(matcher.classify("捡漂流瓶"), Some(Command::Pick));
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
            [plugin]
            enabled = false

            [command]
            throw_regex = "^/throw (?<content>.+)$"

            [identity]
            endpoint = "http://napcat:3000"

            [template]
            pick_empty = "海里空空如也"
            "#,
        )
        .unwrap();
        assert!(!config.plugin.enabled);
        assert_eq!(config.command.pick_regex, "^捡漂流瓶$");
        assert_eq!(config.identity.endpoint.as_deref(), Some("http://napcat:3000"));
        assert_eq!(config.template.pick_empty, "海里空空如也");
        assert_eq!(config.template.not_in_group, TemplateConfig::default().not_in_group);
        let matcher = config.command_matcher().unwrap();
        assert_eq!(
            matcher.classify("/throw hi"),
            Some(Command::Throw {
                content: "hi".to_owned()
            })
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(Config::from_toml("[bot]\naddress = 1"), Err(ConfigError::Parse(_))));

        let mut config = Config::default();
        config.command.throw_regex = "^扔漂流瓶(".to_owned();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "command", .. })
        ));

        let mut config = Config::default();
        config.database.path = " ".to_owned();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "database.path",
                ..
            })
        ));
        assert!(matches!(
            Config::from_file("/nonexistent/drift_bottle.toml"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([("DRIFT_BOTTLE_DATABASE", "/data/bottles.native_db")]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.database.path, "/data/bottles.native_db");
        assert_eq!(config.bot.address, BotConfig::default().address);
    }
}
