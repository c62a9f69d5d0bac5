//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub startup: StartupConfig,
    pub broadcasts: Vec<BroadcastConfig>,
    pub auto_responses: Vec<AutoResponseConfig>,
    pub whatsapp: WhatsAppConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    /// Display name of the group broadcasts and announcements go to
    pub group_name: String,
    /// Admin contact that receives flight inquiries
    pub admin_number: Option<String>,
    /// Domain appended to a bare admin number
    #[serde(default = "default_contact_domain")]
    pub contact_domain: String,
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
    /// Drop sessions idle for this long; unset keeps them until the flow ends
    #[serde(default)]
    pub session_idle_minutes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StartupConfig {
    pub enabled: bool,
    pub admin_delay_secs: u64,
    pub group_delay_secs: u64,
}

/// One scheduled broadcast; both fields are required for the job to run
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BroadcastConfig {
    pub schedule: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutoResponseConfig {
    pub keyword: String,
    pub reply: String,
}

/// Evolution API gateway settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WhatsAppConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: Option<String>,
    pub instance: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    pub enabled: bool,
    pub bind: String,
}

fn default_contact_domain() -> String {
    "c.us".to_string()
}

fn default_dedup_capacity() -> usize {
    1000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "B6 Bot".to_string(),
            group_name: "B6 Pass Riders".to_string(),
            admin_number: None,
            contact_domain: default_contact_domain(),
            dedup_capacity: default_dedup_capacity(),
            session_idle_minutes: None,
        }
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin_delay_secs: 5,
            group_delay_secs: 7,
        }
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "http://127.0.0.1:8080".to_string(),
            api_key: None,
            instance: "b6-bot".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            startup: StartupConfig::default(),
            broadcasts: vec![
                BroadcastConfig {
                    schedule: Some("0 9 * * *".to_string()),
                    message: Some("Good morning B6 Pass Riders! ☀️\nHope everyone has safe travels today.".to_string()),
                },
                BroadcastConfig {
                    schedule: Some("0 18 * * 5".to_string()),
                    message: Some("Happy Friday! ✈️\nPlanning a weekend trip? Check the loads!".to_string()),
                },
            ],
            auto_responses: [
                ("price", "Our membership price is $50/month."),
                ("location", "We are located at 123 B6 Rider Lane."),
                ("hours", "We are open 9 AM - 5 PM, Mon-Fri."),
                ("website", "Visit us at www.b6riders.com"),
            ]
            .into_iter()
            .map(|(keyword, reply)| AutoResponseConfig {
                keyword: keyword.to_string(),
                reply: reply.to_string(),
            })
            .collect(),
            whatsapp: WhatsAppConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Self {
        Config::default().with_env()
    }

    /// Overlay environment variables on top of file or default values
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(group) = var("GROUP_NAME") {
            self.bot.group_name = group;
        }
        if let Some(admin) = var("ADMIN_NUMBER") {
            self.bot.admin_number = Some(admin);
        }
        if let Some(url) = var("WHATSAPP_API_URL") {
            self.whatsapp.api_url = url;
            self.whatsapp.enabled = true;
        }
        if let Some(key) = var("WHATSAPP_API_KEY") {
            self.whatsapp.api_key = Some(key);
        }
        if let Some(instance) = var("WHATSAPP_INSTANCE") {
            self.whatsapp.instance = instance;
        }
        if let Some(bind) = var("STATUS_BIND") {
            self.server.bind = bind;
        } else if let Some(port) = var("PORT") {
            self.server.bind = format!("0.0.0.0:{}", port.trim());
        }

        self
    }

    /// Admin chat id, with the contact domain appended when the number has none
    pub fn admin_chat_id(&self) -> Option<String> {
        let number = self.bot.admin_number.as_deref()?.trim();
        if number.is_empty() {
            return None;
        }
        if number.contains('@') {
            Some(number.to_string())
        } else {
            Some(format!("{}@{}", number, self.bot.contact_domain))
        }
    }

    /// Problems that disable a feature without stopping the bot
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut warnings = Vec::new();

        if self.admin_chat_id().is_none() {
            warnings.push(ConfigError::MissingField(
                "bot.admin-number (flight inquiries will not be forwarded)".to_string(),
            ));
        }
        if self.bot.group_name.trim().is_empty() {
            warnings.push(ConfigError::MissingField(
                "bot.group-name (broadcasts have no target)".to_string(),
            ));
        }
        for (index, broadcast) in self.broadcasts.iter().enumerate() {
            if broadcast.schedule.as_deref().map_or(true, |s| s.trim().is_empty())
                || broadcast.message.as_deref().map_or(true, |m| m.trim().is_empty())
            {
                warnings.push(ConfigError::InvalidValue(format!(
                    "broadcasts[{}] needs both a schedule and a message",
                    index
                )));
            }
        }
        if self.whatsapp.enabled && self.whatsapp.api_key.is_none() {
            warnings.push(ConfigError::MissingField("whatsapp.api-key".to_string()));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_cover_group_and_jobs() {
        let config = Config::default();
        assert_eq!(config.bot.group_name, "B6 Pass Riders");
        assert_eq!(config.bot.dedup_capacity, 1000);
        assert_eq!(config.broadcasts.len(), 2);
        assert_eq!(config.auto_responses[0].keyword, "price");
        assert!(config.bot.session_idle_minutes.is_none());
    }

    #[test]
    fn test_env_overlay() {
        let config = Config::default().with_vars(vars(&[
            ("GROUP_NAME", "Test Riders"),
            ("ADMIN_NUMBER", "15551234567"),
            ("WHATSAPP_API_URL", "http://gateway:8080"),
            ("PORT", "8088"),
        ]));

        assert_eq!(config.bot.group_name, "Test Riders");
        assert_eq!(config.admin_chat_id().as_deref(), Some("15551234567@c.us"));
        assert!(config.whatsapp.enabled);
        assert_eq!(config.whatsapp.api_url, "http://gateway:8080");
        assert_eq!(config.server.bind, "0.0.0.0:8088");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let config = Config::default().with_vars(vars(&[("GROUP_NAME", "  "), ("ADMIN_NUMBER", "")]));
        assert_eq!(config.bot.group_name, "B6 Pass Riders");
        assert!(config.admin_chat_id().is_none());
    }

    #[test]
    fn test_admin_id_keeps_existing_domain() {
        let mut config = Config::default();
        config.bot.admin_number = Some("15551234567@s.whatsapp.net".to_string());
        assert_eq!(config.admin_chat_id().as_deref(), Some("15551234567@s.whatsapp.net"));

        config.bot.admin_number = Some("15551234567".to_string());
        config.bot.contact_domain = "s.whatsapp.net".to_string();
        assert_eq!(config.admin_chat_id().as_deref(), Some("15551234567@s.whatsapp.net"));
    }

    #[test]
    fn test_validate_flags_missing_admin_and_broken_broadcasts() {
        let mut config = Config::default();
        config.broadcasts.push(BroadcastConfig {
            schedule: Some("0 12 * * *".to_string()),
            message: None,
        });

        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], ConfigError::MissingField(_)));
        assert!(warnings[1].to_string().contains("broadcasts[2]"));
    }

    #[test]
    fn test_load_partial_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "bot:\n  name: Test Bot\n  group-name: Riders\n  admin-number: \"1555\"\n\
             broadcasts:\n  - schedule: \"*/5 * * * *\"\n    message: hello\n  - message: orphan\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bot.name, "Test Bot");
        assert_eq!(config.bot.contact_domain, "c.us");
        assert_eq!(config.bot.dedup_capacity, 1000);
        assert_eq!(config.broadcasts.len(), 2);
        assert!(config.broadcasts[1].schedule.is_none());
        assert_eq!(config.auto_responses.len(), 4);
        assert!(config.server.enabled);
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = Config::default().to_yaml().unwrap();
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.bot.group_name, "B6 Pass Riders");
        assert_eq!(config.broadcasts[1].schedule.as_deref(), Some("0 18 * * 5"));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let err = Config::from_yaml("bot: [not, a, map").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
