use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Значение по умолчанию для незаполненных полей заявки
pub const NOT_SPECIFIED: &str = "не вказано";

/// Проверенная заявка. Создаётся оркестратором на каждую попытку отправки
/// и дальше не меняется.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub name: String,
    pub phone: String,
    pub service: String,
    pub area: Option<String>,
    pub message: Option<String>,
    pub consent_given: bool,
}

/// Результат одной попытки отправки.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Отправка симулирована: бот не настроен
    #[serde(rename = "_dev", default, skip_serializing_if = "is_false")]
    pub dev: bool,
}

impl SubmissionResult {
    pub fn simulated() -> Self {
        Self { ok: true, description: None, dev: true }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Текущие значения полей формы
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub phone: String,
    pub service: String,
    pub area: String,
    pub message: String,
    pub consent: bool,
}

impl FormValues {
    /// Собирает заявку из текущих значений. Валидность проверяет вызывающий.
    pub fn to_record(&self) -> LeadRecord {
        LeadRecord {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            service: non_blank(&self.service).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            // Площадь из одних пробелов считаем незаполненной, в сообщении будет «не вказано»
            area: non_blank(&self.area),
            message: non_blank(&self.message),
            consent_given: self.consent,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
