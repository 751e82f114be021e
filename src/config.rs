use chrono_tz::Tz;
use serde::Deserialize;
use std::time::Duration;

/// Значения-заглушки из шаблона настройки бота
pub const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";
pub const CHAT_ID_PLACEHOLDER: &str = "YOUR_CHAT_ID_HERE";

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_TIMEZONE: &str = "Europe/Kyiv";
const DEFAULT_FALLBACK_PHONE: &str = "+380 50 123 45 67";
const DEFAULT_DEV_DELAY_MS: u64 = 900;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: Option<String>,
    pub timezone: Option<String>,
    pub dev_delay_ms: Option<u64>,
    pub fallback_phone: Option<String>,
    pub static_dir: Option<String>,
    pub allowed_origin: Option<String>,
}

/// Учётные данные бота. `Unconfigured` включает режим разработчика.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramCredentials {
    Configured { bot_token: String, chat_id: String },
    Unconfigured,
}

impl TelegramCredentials {
    pub fn is_configured(&self) -> bool {
        matches!(self, TelegramCredentials::Configured { .. })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_base: None,
            timezone: None,
            dev_delay_ms: None,
            fallback_phone: None,
            static_dir: None,
            allowed_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .add_source(config::Environment::default())
            .build()?;

        let mut config: Config = cfg.try_deserialize()?;

        if config.timezone.is_none() {
            config.timezone = Some(DEFAULT_TIMEZONE.to_string());
        }

        config.validate()?;

        Ok(config)
    }

    /// Получает временную зону для отметки времени в заявке
    pub fn get_timezone(&self) -> Result<Tz, chrono_tz::ParseError> {
        let tz_str = self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
        tz_str.parse::<Tz>()
    }

    /// Заглушки и пустые значения считаются отсутствующими
    pub fn telegram_credentials(&self) -> TelegramCredentials {
        let token = meaningful(self.telegram_bot_token.as_deref(), TOKEN_PLACEHOLDER);
        let chat_id = meaningful(self.telegram_chat_id.as_deref(), CHAT_ID_PLACEHOLDER);
        match (token, chat_id) {
            (Some(bot_token), Some(chat_id)) => TelegramCredentials::Configured {
                bot_token: bot_token.to_string(),
                chat_id: chat_id.to_string(),
            },
            _ => TelegramCredentials::Unconfigured,
        }
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || ".:-_".contains(c))
        {
            return Err(config::ConfigError::Message(
                "Invalid host format".to_string(),
            ));
        }

        if self.port < 1024 {
            return Err(config::ConfigError::Message(
                "Port must be 1024 or higher for security reasons".to_string(),
            ));
        }

        if let Some(tz_str) = &self.timezone {
            if tz_str.parse::<Tz>().is_err() {
                return Err(config::ConfigError::Message(format!(
                    "Invalid timezone: {}",
                    tz_str
                )));
            }
        }

        if let Some(base) = &self.telegram_api_base {
            if url::Url::parse(base).is_err() {
                return Err(config::ConfigError::Message(format!(
                    "Invalid telegram_api_base: {}",
                    base
                )));
            }
        }

        Ok(())
    }
}

impl Config {
    pub fn effective_api_base(&self) -> String {
        self.telegram_api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn effective_dev_delay(&self) -> Duration {
        Duration::from_millis(self.dev_delay_ms.unwrap_or(DEFAULT_DEV_DELAY_MS))
    }

    pub fn effective_fallback_phone(&self) -> &str {
        self.fallback_phone.as_deref().unwrap_or(DEFAULT_FALLBACK_PHONE)
    }
}

fn meaningful<'a>(value: Option<&'a str>, placeholder: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_mean_unconfigured() {
        let config = Config {
            telegram_bot_token: Some(TOKEN_PLACEHOLDER.into()),
            telegram_chat_id: Some("123456789".into()),
            ..Config::default()
        };
        assert_eq!(config.telegram_credentials(), TelegramCredentials::Unconfigured);

        let config = Config {
            telegram_bot_token: Some("7123456789:AAH".into()),
            telegram_chat_id: Some("  ".into()),
            ..Config::default()
        };
        assert!(!config.telegram_credentials().is_configured());
    }

    #[test]
    fn real_values_are_configured() {
        let config = Config {
            telegram_bot_token: Some("7123456789:AAH".into()),
            telegram_chat_id: Some("-1001234567890".into()),
            ..Config::default()
        };
        assert_eq!(
            config.telegram_credentials(),
            TelegramCredentials::Configured {
                bot_token: "7123456789:AAH".into(),
                chat_id: "-1001234567890".into(),
            }
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        let low_port = Config { port: 80, ..Config::default() };
        assert!(low_port.validate().is_err());

        let bad_tz = Config { timezone: Some("Mars/Olympus".into()), ..Config::default() };
        assert!(bad_tz.validate().is_err());

        let bad_base = Config { telegram_api_base: Some("not a url".into()), ..Config::default() };
        assert!(bad_base.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn defaults_apply() {
        let config = Config {
            telegram_api_base: Some("http://127.0.0.1:9000/".into()),
            ..Config::default()
        };
        assert_eq!(config.effective_api_base(), "http://127.0.0.1:9000");
        assert_eq!(config.effective_dev_delay(), Duration::from_millis(900));
        assert_eq!(config.effective_fallback_phone(), "+380 50 123 45 67");
        assert_eq!(config.get_timezone().unwrap(), chrono_tz::Europe::Kyiv);
    }
}
