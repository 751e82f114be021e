use actix_web::{http::StatusCode, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    app_state::AppState,
    errors::AppError,
    leads::{
        models::FormValues,
        validation::{sanitize_phone, validate_field, ValidatedField},
        FieldEdit, FormEvent, Orchestrator, SubmitPhase,
    },
    services::notifier::{Notification, RecordingNotifier},
};

// --- API Structures ---

/// Поля контактной формы в том виде, как их отправляет страница
#[derive(Debug, Deserialize, ToSchema)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
    pub service: Option<String>,
    pub area: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

impl LeadForm {
    fn into_edits(self) -> Vec<FieldEdit> {
        let mut edits = vec![
            FieldEdit::Name(self.name),
            FieldEdit::Phone(self.phone),
            FieldEdit::Consent(self.consent),
        ];
        if let Some(service) = self.service {
            edits.push(FieldEdit::Service(service));
        }
        if let Some(area) = self.area {
            edits.push(FieldEdit::Area(area));
        }
        if let Some(message) = self.message {
            edits.push(FieldEdit::Message(message));
        }
        edits
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorDto {
    #[schema(inline)]
    pub field: ValidatedField,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    #[schema(inline)]
    pub phase: SubmitPhase,
    pub notification: Option<Notification>,
    pub field_errors: Vec<FieldErrorDto>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateFieldRequest {
    #[schema(inline)]
    pub field: ValidatedField,
    pub value: FieldValue,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateFieldResponse {
    #[schema(inline)]
    pub field: ValidatedField,
    pub valid: bool,
    pub message: Option<String>,
}

fn values_for(field: ValidatedField, value: FieldValue) -> Result<FormValues, AppError> {
    let mut values = FormValues::default();
    match (field, value) {
        (ValidatedField::Consent, FieldValue::Flag(flag)) => values.consent = flag,
        // Чекбокс в HTML-форме приходит как "on"
        (ValidatedField::Consent, FieldValue::Text(text)) => {
            values.consent = matches!(text.trim(), "on" | "true" | "1")
        }
        (ValidatedField::Name, FieldValue::Text(text)) => values.name = text,
        (ValidatedField::Phone, FieldValue::Text(text)) => values.phone = text,
        (field, FieldValue::Flag(_)) => {
            return Err(AppError::InvalidInput(format!(
                "Field {:?} expects a text value",
                field
            )));
        }
    }
    Ok(values)
}

// --- Route Handlers ---

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = LeadForm,
    responses(
        (status = 200, description = "Lead accepted and delivered", body = SubmitResponse),
        (status = 409, description = "Same lead is already being sent"),
        (status = 422, description = "Field validation failed", body = SubmitResponse),
        (status = 502, description = "Messaging API failed", body = SubmitResponse)
    )
)]
#[post("")]
pub async fn submit_lead(
    app_state: web::Data<AppState>,
    body: web::Json<LeadForm>,
) -> Result<HttpResponse, AppError> {
    let form = body.into_inner();

    // Невалидный телефон до отправки не дойдёт, блокировка ему не нужна
    let _ticket = match sanitize_phone(&form.phone) {
        Some(key) => Some(app_state.in_flight.try_acquire(&key).ok_or_else(|| {
            AppError::Conflict("A submission for this phone is already in progress".to_string())
        })?),
        None => None,
    };

    let notifier = Arc::new(RecordingNotifier::new());
    let mut orchestrator = Orchestrator::new(
        app_state.sender.clone(),
        notifier.clone(),
        app_state.feedback.clone(),
    );

    for edit in form.into_edits() {
        orchestrator.handle(FormEvent::Edit(edit)).await;
    }
    let phase = orchestrator.handle(FormEvent::Submit).await;

    let field_errors = orchestrator
        .errors()
        .errors()
        .into_iter()
        .map(|(field, message)| FieldErrorDto { field, message: message.to_string() })
        .collect();

    let status = match phase {
        SubmitPhase::Succeeded => StatusCode::OK,
        SubmitPhase::Failed => StatusCode::BAD_GATEWAY,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };

    Ok(HttpResponse::build(status).json(SubmitResponse {
        phase,
        notification: notifier.last(),
        field_errors,
    }))
}

#[utoipa::path(
    post,
    path = "/api/leads/validate",
    tag = "Leads",
    request_body = ValidateFieldRequest,
    responses(
        (status = 200, description = "Validation result for a single field", body = ValidateFieldResponse),
        (status = 400, description = "Value type does not match the field")
    )
)]
#[post("/validate")]
pub async fn validate_lead_field(
    body: web::Json<ValidateFieldRequest>,
) -> Result<HttpResponse, AppError> {
    let ValidateFieldRequest { field, value } = body.into_inner();
    let values = values_for(field, value)?;
    let result = validate_field(field, &values);

    Ok(HttpResponse::Ok().json(ValidateFieldResponse {
        field,
        valid: result.is_ok(),
        message: result.err().map(|e| e.message().to_string()),
    }))
}

// Функция для регистрации всех маршрутов этого модуля
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leads")
            .service(validate_lead_field)
            .service(submit_lead),
    );
}
