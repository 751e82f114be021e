//! Отправитель против локального HTTP-сервера, изображающего Bot API.

use actix_web::{dev::ServerHandle, test, web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use remontpro_leads::api::leads;
use remontpro_leads::app_state::AppState;
use remontpro_leads::config::{Config, TelegramCredentials};
use remontpro_leads::errors::AppError;
use remontpro_leads::leads::{LeadRecord, SubmissionResult};
use remontpro_leads::services::telegram_api::{MessageSender, TelegramApiService};

type Seen = web::Data<Mutex<Vec<(String, Value)>>>;

async fn fake_send_message(
    path: web::Path<String>,
    body: web::Json<Value>,
    seen: Seen,
) -> HttpResponse {
    let bot = path.into_inner();
    seen.lock().unwrap().push((bot.clone(), body.into_inner()));

    match bot.as_str() {
        "botgood" => HttpResponse::Ok().json(json!({
            "ok": true,
            "result": { "message_id": 7, "chat": { "id": -100123 } }
        })),
        "botrejected" => HttpResponse::Ok().json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })),
        _ => HttpResponse::Unauthorized().json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })),
    }
}

struct FakeTelegram {
    base_url: String,
    seen: Seen,
    handle: ServerHandle,
}

impl FakeTelegram {
    fn start() -> FakeTelegram {
        let seen: Seen = web::Data::new(Mutex::new(Vec::new()));
        let data = seen.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/{bot}/sendMessage", web::post().to(fake_send_message))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        FakeTelegram { base_url: format!("http://{}", addr), seen, handle }
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.seen.lock().unwrap().clone()
    }

    fn sender(&self, credentials: TelegramCredentials) -> TelegramApiService {
        TelegramApiService::new(
            self.base_url.clone(),
            credentials,
            chrono_tz::Europe::Kyiv,
            Duration::from_millis(10),
        )
    }

    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn configured(token: &str) -> TelegramCredentials {
    TelegramCredentials::Configured {
        bot_token: token.to_string(),
        chat_id: "-100123".to_string(),
    }
}

fn lead() -> LeadRecord {
    LeadRecord {
        name: "Anna-Maria".into(),
        phone: "+380501234567".into(),
        service: "не вказано".into(),
        area: Some("42.5".into()),
        message: None,
        consent_given: true,
    }
}

#[actix_web::test]
async fn posts_markdown_message_to_chat() {
    let fake = FakeTelegram::start();
    let sender = fake.sender(configured("good"));

    let result = sender.send(&lead()).await.unwrap();
    assert_eq!(result, SubmissionResult { ok: true, description: None, dev: false });

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let (bot, body) = &requests[0];
    assert_eq!(bot, "botgood");
    assert_eq!(body["chat_id"], "-100123");
    assert_eq!(body["parse_mode"], "MarkdownV2");
    assert_eq!(body["disable_web_page_preview"], true);
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("🏗 *Нова заявка з сайту РемПро\\!*"));
    assert!(text.contains("Anna\\-Maria"));
    assert!(text.contains("\\+380501234567"));
    assert!(text.contains("42\\.5 м²"));
    assert!(text.contains("_не вказано_"));

    fake.stop().await;
}

#[actix_web::test]
async fn non_success_status_is_a_transmission_error() {
    let fake = FakeTelegram::start();
    let sender = fake.sender(configured("revoked"));

    let err = sender.send(&lead()).await.unwrap_err();
    match err {
        AppError::TelegramHttp { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fake.requests().len(), 1);

    fake.stop().await;
}

#[actix_web::test]
async fn api_level_rejection_is_returned_as_result() {
    let fake = FakeTelegram::start();
    let sender = fake.sender(configured("rejected"));

    let result = sender.send(&lead()).await.unwrap();
    assert!(!result.ok);
    assert_eq!(result.description.as_deref(), Some("Bad Request: chat not found"));

    fake.stop().await;
}

#[actix_web::test]
async fn developer_mode_makes_no_request() {
    let fake = FakeTelegram::start();
    let sender = fake.sender(TelegramCredentials::Unconfigured);

    let result = sender.send(&lead()).await.unwrap();
    assert_eq!(result, SubmissionResult::simulated());
    assert!(fake.requests().is_empty());

    fake.stop().await;
}

#[actix_web::test]
async fn form_submission_reaches_fake_api_end_to_end() {
    let fake = FakeTelegram::start();
    let config = Config {
        telegram_bot_token: Some("good".into()),
        telegram_chat_id: Some("-100123".into()),
        telegram_api_base: Some(fake.base_url.clone()),
        ..Config::default()
    };
    let state = AppState::from_config(config).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(leads::init_routes)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/leads")
        .set_json(json!({
            "name": "Ivan",
            "phone": "+380501234567",
            "message": "Потрібен кошторис.",
            "consent": true
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["phase"], "succeeded");
    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let text = requests[0].1["text"].as_str().unwrap();
    assert!(text.contains("💬 *Повідомлення:* Потрібен кошторис\\."));

    // Заглушки вместо реальных значений включают режим разработчика
    let dev_config = Config {
        telegram_bot_token: Some("YOUR_BOT_TOKEN_HERE".into()),
        telegram_chat_id: Some("YOUR_CHAT_ID_HERE".into()),
        telegram_api_base: Some(fake.base_url.clone()),
        dev_delay_ms: Some(10),
        ..Config::default()
    };
    let dev_sender: Arc<dyn MessageSender> =
        Arc::new(TelegramApiService::from_config(&dev_config).unwrap());
    let result = dev_sender.send(&lead()).await.unwrap();
    assert!(result.dev);
    assert_eq!(fake.requests().len(), 1);

    fake.stop().await;
}
