//! Правила проверки обязательных полей формы заявки.
//! Проверки чистые и синхронные: значение на входе, pass/fail на выходе.

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::models::FormValues;

lazy_static::lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9\s\-()]{10,15}$").unwrap();
    static ref PHONE_KEY_RE: Regex = Regex::new(r"^\+?[0-9]{6,20}$").unwrap();
}

pub const NAME_MIN_CHARS: usize = 2;

pub const NAME_ERROR: &str = "Введіть ім'я (мінімум 2 символи)";
pub const PHONE_ERROR: &str = "Введіть коректний номер телефону";
pub const CONSENT_ERROR: &str = "Необхідно дати згоду на обробку даних";

/// Поля, которые проверяются перед отправкой
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidatedField {
    Name,
    Phone,
    Consent,
}

impl ValidatedField {
    pub const ALL: [ValidatedField; 3] =
        [ValidatedField::Name, ValidatedField::Phone, ValidatedField::Consent];

    pub fn error_message(self) -> &'static str {
        match self {
            ValidatedField::Name => NAME_ERROR,
            ValidatedField::Phone => PHONE_ERROR,
            ValidatedField::Consent => CONSENT_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: ValidatedField,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        self.field.error_message()
    }
}

pub fn validate_name(value: &str) -> bool {
    value.trim().chars().count() >= NAME_MIN_CHARS
}

pub fn validate_phone(value: &str) -> bool {
    PHONE_RE.is_match(value.trim())
}

pub fn validate_consent(checked: bool) -> bool {
    checked
}

pub fn validate_field(field: ValidatedField, values: &FormValues) -> Result<(), FieldError> {
    let ok = match field {
        ValidatedField::Name => validate_name(&values.name),
        ValidatedField::Phone => validate_phone(&values.phone),
        ValidatedField::Consent => validate_consent(values.consent),
    };
    if ok { Ok(()) } else { Err(FieldError { field }) }
}

/// Состояние ошибок по каждому проверяемому полю
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValidationState {
    pub name: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub consent: Option<&'static str>,
}

impl FieldValidationState {
    pub fn get(&self, field: ValidatedField) -> Option<&'static str> {
        match field {
            ValidatedField::Name => self.name,
            ValidatedField::Phone => self.phone,
            ValidatedField::Consent => self.consent,
        }
    }

    pub fn set(&mut self, field: ValidatedField, error: Option<&'static str>) {
        let slot = match field {
            ValidatedField::Name => &mut self.name,
            ValidatedField::Phone => &mut self.phone,
            ValidatedField::Consent => &mut self.consent,
        };
        *slot = error;
    }

    pub fn apply(&mut self, result: Result<(), FieldError>, field: ValidatedField) {
        self.set(field, result.err().map(|e| e.message()));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_clean(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.consent.is_none()
    }

    /// Пары (поле, сообщение) для отображения рядом с полями
    pub fn errors(&self) -> Vec<(ValidatedField, &'static str)> {
        ValidatedField::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|msg| (*f, msg)))
            .collect()
    }
}

pub fn validate_form(values: &FormValues) -> FieldValidationState {
    let mut state = FieldValidationState::default();
    for field in ValidatedField::ALL {
        state.apply(validate_field(field, values), field);
    }
    state
}

/// Нормализует телефон до цифр и `+`, чтобы сравнивать одинаковые номера
/// в разном написании.
pub fn sanitize_phone(phone: &str) -> Option<String> {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if PHONE_KEY_RE.is_match(&digits) {
        Some(digits)
    } else {
        None
    }
}
