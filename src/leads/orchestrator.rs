//! Жизненный цикл отправки формы заявки:
//! `Idle → Validating → Submitting → Succeeded | Failed`.
//!
//! Оркестратор получает отправителя и нотификатор при создании и
//! управляется событиями формы, поэтому его можно прогонять без UI.

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::models::{FormValues, LeadRecord, SubmissionResult};
use super::validation::{validate_field, FieldValidationState, ValidatedField};
use crate::errors::AppError;
use crate::services::notifier::{NotificationKind, Notifier};
use crate::services::telegram_api::MessageSender;

pub const SUCCESS_MESSAGE: &str = "Дякуємо! Заявку отримано. Зв'яжемося протягом 30 хв.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Изменение значения поля (input/change)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Name(String),
    Phone(String),
    Service(String),
    Area(String),
    Message(String),
    Consent(bool),
}

impl FieldEdit {
    fn validated_field(&self) -> Option<ValidatedField> {
        match self {
            FieldEdit::Name(_) => Some(ValidatedField::Name),
            FieldEdit::Phone(_) => Some(ValidatedField::Phone),
            FieldEdit::Consent(_) => Some(ValidatedField::Consent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Edit(FieldEdit),
    Blur(ValidatedField),
    Submit,
}

/// Состояние кнопки отправки
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubmitButton {
    pub disabled: bool,
    pub loading: bool,
}

impl SubmitButton {
    pub fn label_visible(&self) -> bool {
        !self.loading
    }

    fn engage(&mut self) {
        self.disabled = true;
        self.loading = true;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Тексты уведомлений об исходе отправки
#[derive(Debug, Clone)]
pub struct Feedback {
    pub success: String,
    pub failure: String,
}

impl Feedback {
    pub fn with_fallback_phone(phone: &str) -> Self {
        Self {
            success: SUCCESS_MESSAGE.to_string(),
            failure: format!("Сталася помилка. Будь ласка, зателефонуйте нам: {}", phone),
        }
    }
}

/// Держит кнопку в состоянии загрузки, пока жив. Снимает его на любом
/// выходе, в том числе при отмене future посреди отправки.
struct BusyGuard<'a> {
    button: &'a mut SubmitButton,
    phase: &'a mut SubmitPhase,
}

impl<'a> BusyGuard<'a> {
    fn engage(button: &'a mut SubmitButton, phase: &'a mut SubmitPhase) -> Self {
        button.engage();
        *phase = SubmitPhase::Submitting;
        Self { button, phase }
    }

    fn settle(self, phase: SubmitPhase) {
        *self.phase = phase;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.button.reset();
        if *self.phase == SubmitPhase::Submitting {
            *self.phase = SubmitPhase::Idle;
        }
    }
}

pub struct Orchestrator {
    sender: Arc<dyn MessageSender>,
    notifier: Arc<dyn Notifier>,
    feedback: Feedback,
    values: FormValues,
    errors: FieldValidationState,
    button: SubmitButton,
    phase: SubmitPhase,
}

impl Orchestrator {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        notifier: Arc<dyn Notifier>,
        feedback: Feedback,
    ) -> Self {
        Self {
            sender,
            notifier,
            feedback,
            values: FormValues::default(),
            errors: FieldValidationState::default(),
            button: SubmitButton::default(),
            phase: SubmitPhase::Idle,
        }
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldValidationState {
        &self.errors
    }

    pub fn button(&self) -> SubmitButton {
        self.button
    }

    pub async fn handle(&mut self, event: FormEvent) -> SubmitPhase {
        match event {
            FormEvent::Edit(edit) => self.edit(edit),
            FormEvent::Blur(field) => self.blur(field),
            FormEvent::Submit => self.submit().await,
        }
        self.phase
    }

    fn edit(&mut self, edit: FieldEdit) {
        if let Some(field) = edit.validated_field() {
            self.errors.set(field, None);
        }
        match edit {
            FieldEdit::Name(v) => self.values.name = v,
            FieldEdit::Phone(v) => self.values.phone = v,
            FieldEdit::Service(v) => self.values.service = v,
            FieldEdit::Area(v) => self.values.area = v,
            FieldEdit::Message(v) => self.values.message = v,
            FieldEdit::Consent(v) => self.values.consent = v,
        }
        self.settle_finished();
    }

    fn blur(&mut self, field: ValidatedField) {
        self.errors.apply(validate_field(field, &self.values), field);
        self.settle_finished();
    }

    // После завершённой попытки любое действие с формой возвращает в Idle
    fn settle_finished(&mut self) {
        if matches!(self.phase, SubmitPhase::Succeeded | SubmitPhase::Failed) {
            self.phase = SubmitPhase::Idle;
        }
    }

    fn validate_all(&mut self) -> Option<LeadRecord> {
        self.phase = SubmitPhase::Validating;
        let mut valid = true;
        for field in ValidatedField::ALL {
            let result = validate_field(field, &self.values);
            valid &= result.is_ok();
            self.errors.apply(result, field);
        }
        if valid {
            Some(self.values.to_record())
        } else {
            self.phase = SubmitPhase::Idle;
            None
        }
    }

    async fn submit(&mut self) {
        let Some(record) = self.validate_all() else {
            log::debug!("Submit blocked by validation: {:?}", self.errors.errors());
            return;
        };

        let attempt = Uuid::new_v4();
        log::info!("Submitting lead attempt={}", attempt);

        let guard = BusyGuard::engage(&mut self.button, &mut self.phase);
        let outcome = self.sender.send(&record).await.and_then(accepted);

        match outcome {
            Ok(result) => {
                if result.dev {
                    log::warn!("Lead attempt={} accepted in developer mode", attempt);
                } else {
                    log::info!("Lead attempt={} delivered", attempt);
                }
                guard.settle(SubmitPhase::Succeeded);
                self.notifier.notify(&self.feedback.success, NotificationKind::Success);
                self.values = FormValues::default();
                self.errors.clear();
            }
            Err(err) => {
                log::error!("Form submit error (attempt={}): {}", attempt, err);
                guard.settle(SubmitPhase::Failed);
                self.notifier.notify(&self.feedback.failure, NotificationKind::Error);
            }
        }
    }
}

/// Ответ `ok: false` от API считается такой же ошибкой, как сбой транспорта
fn accepted(result: SubmissionResult) -> Result<SubmissionResult, AppError> {
    if result.ok {
        Ok(result)
    } else {
        Err(AppError::Rejected(
            result.description.unwrap_or_else(|| "API error".to_string()),
        ))
    }
}
