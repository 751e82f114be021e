use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::{Config, TelegramCredentials};
use crate::errors::AppError;
use crate::leads::models::{LeadRecord, SubmissionResult};
use crate::services::message_builder::build_message;

const PARSE_MODE: &str = "MarkdownV2";

/// Отправитель заявки во внешний мессенджер. Одна попытка на вызов.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, lead: &LeadRecord) -> Result<SubmissionResult, AppError>;
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: String,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
}

#[derive(Clone)]
pub struct TelegramApiService {
    client: Client,
    base_url: String,
    credentials: TelegramCredentials,
    timezone: Tz,
    dev_delay: Duration,
}

impl TelegramApiService {
    pub fn new(
        base_url: String,
        credentials: TelegramCredentials,
        timezone: Tz,
        dev_delay: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url,
            credentials,
            timezone,
            dev_delay,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let timezone = config
            .get_timezone()
            .map_err(|e| AppError::Config(format!("Invalid timezone: {}", e)))?;
        Ok(Self::new(
            config.effective_api_base(),
            config.telegram_credentials(),
            timezone,
            config.effective_dev_delay(),
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    async fn post_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        lead: &LeadRecord,
    ) -> Result<SubmissionResult, AppError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, bot_token);
        let body = SendMessageRequest {
            chat_id,
            text: build_message(lead, Utc::now().with_timezone(&self.timezone)),
            parse_mode: PARSE_MODE,
            disable_web_page_preview: true,
        };

        // Токен входит в URL: у ошибок reqwest URL вырезаем
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::from(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error reading response body".to_string());
            log::error!("Telegram API error: {} - {}", status, error_text);
            return Err(AppError::TelegramHttp {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let result = response
            .json::<SubmissionResult>()
            .await
            .map_err(|e| AppError::from(e.without_url()))?;
        Ok(result)
    }
}

#[async_trait]
impl MessageSender for TelegramApiService {
    async fn send(&self, lead: &LeadRecord) -> Result<SubmissionResult, AppError> {
        match &self.credentials {
            TelegramCredentials::Configured { bot_token, chat_id } => {
                self.post_message(bot_token, chat_id, lead).await
            }
            TelegramCredentials::Unconfigured => {
                log::warn!(
                    "Telegram is not configured: set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID. \
                     Simulating a successful send (developer mode)."
                );
                tokio::time::sleep(self.dev_delay).await;
                Ok(SubmissionResult::simulated())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Metadata, Record};
    use std::sync::{Mutex, Once};
    use std::time::Instant;

    /// Логгер, запоминающий записи для проверки в тестах
    struct CaptureLogger {
        // (target, level, message)
        records: Mutex<Vec<(String, Level, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.target().to_string(), record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLogger = CaptureLogger { records: Mutex::new(Vec::new()) };
    static INIT: Once = Once::new();

    fn capture_logs() -> &'static CaptureLogger {
        INIT.call_once(|| {
            log::set_logger(&CAPTURE).expect("logger already set");
            log::set_max_level(log::LevelFilter::Trace);
        });
        &CAPTURE
    }

    fn lead() -> LeadRecord {
        LeadRecord {
            name: "Ivan".into(),
            phone: "+380501234567".into(),
            service: "не вказано".into(),
            area: None,
            message: None,
            consent_given: true,
        }
    }

    #[tokio::test]
    async fn unconfigured_sender_simulates_success() {
        // Адрес недоступен: любой сетевой вызов закончился бы ошибкой
        let sender = TelegramApiService::new(
            "http://127.0.0.1:9".into(),
            TelegramCredentials::Unconfigured,
            chrono_tz::Europe::Kyiv,
            Duration::from_millis(20),
        );
        assert!(!sender.is_configured());

        let started = Instant::now();
        let result = sender.send(&lead()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(result, SubmissionResult::simulated());
    }

    #[tokio::test]
    async fn developer_mode_emits_warning() {
        let logs = capture_logs();
        let sender = TelegramApiService::new(
            "http://127.0.0.1:9".into(),
            TelegramCredentials::Unconfigured,
            chrono_tz::Europe::Kyiv,
            Duration::from_millis(1),
        );

        sender.send(&lead()).await.unwrap();

        let records = logs.records.lock().unwrap();
        assert!(records.iter().any(|(_, level, msg)| {
            *level == Level::Warn && msg.contains("Telegram is not configured")
        }));
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_token() {
        let logs = capture_logs();
        // На порту 9 никто не слушает
        let sender = TelegramApiService::new(
            "http://127.0.0.1:9".into(),
            TelegramCredentials::Configured {
                bot_token: "SECRET123:TOKEN".into(),
                chat_id: "-100123".into(),
            },
            chrono_tz::Europe::Kyiv,
            Duration::from_millis(1),
        );

        let err = sender.send(&lead()).await.unwrap_err();

        assert!(matches!(err, AppError::ReqwestError(_)));
        assert!(!err.to_string().contains("SECRET123"));
        assert!(!format!("{:?}", err).contains("SECRET123"));
        let records = logs.records.lock().unwrap();
        assert!(records
            .iter()
            .filter(|(target, _, _)| target.starts_with("remontpro_leads"))
            .all(|(_, _, msg)| !msg.contains("SECRET123")));
    }

    #[test]
    fn request_body_shape() {
        let body = SendMessageRequest {
            chat_id: "-100123",
            text: "hi".into(),
            parse_mode: PARSE_MODE,
            disable_web_page_preview: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "chat_id": "-100123",
                "text": "hi",
                "parse_mode": "MarkdownV2",
                "disable_web_page_preview": true
            })
        );
    }
}
