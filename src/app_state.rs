use std::sync::Arc;

use crate::api::in_flight::InFlightRegistry;
use crate::config::Config;
use crate::errors::AppError;
use crate::leads::Feedback;
use crate::services::telegram_api::{MessageSender, TelegramApiService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sender: Arc<dyn MessageSender>,
    pub feedback: Feedback,
    pub in_flight: InFlightRegistry,
}

impl AppState {
    pub fn new(config: Config, sender: Arc<dyn MessageSender>) -> Self {
        let feedback = Feedback::with_fallback_phone(config.effective_fallback_phone());
        Self {
            config,
            sender,
            feedback,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Состояние с отправителем в Telegram по конфигурации
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let telegram = TelegramApiService::from_config(&config)?;
        if !telegram.is_configured() {
            log::warn!("Telegram credentials missing: running in developer mode");
        }
        Ok(Self::new(config, Arc::new(telegram)))
    }
}
