use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenvy::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use remontpro_leads::api::leads;
use remontpro_leads::app_state::AppState;
use remontpro_leads::config::Config;
use remontpro_leads::leads::SubmitPhase;
use remontpro_leads::services::notifier;

#[derive(OpenApi)]
#[openapi(
    paths(
        leads::submit_lead,
        leads::validate_lead_field,
    ),
    components(
        schemas(
            leads::LeadForm,
            leads::SubmitResponse,
            leads::FieldErrorDto,
            leads::FieldValue,
            leads::ValidateFieldRequest,
            leads::ValidateFieldResponse,
            notifier::Notification,
            notifier::NotificationKind,
            SubmitPhase,
        )
    ),
    tags(
        (name = "Leads", description = "Contact form submission and live validation")
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::other(format!("Failed to load configuration: {}", e)))?;
    let state = AppState::from_config(config.clone())
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let host = config.host.clone();
    let port = config.port;

    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);
    if let Some(dir) = &config.static_dir {
        log::info!("Serving static site from {}", dir);
    }

    HttpServer::new(move || {
        let cors = match &config.allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["POST"])
                .allow_any_header()
                .max_age(3600),
            None => Cors::default(),
        };

        let mut app = App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .service(web::scope("/api").configure(leads::init_routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            );

        // Статика регистрируется последней: "/" перехватывает всё остальное
        if let Some(dir) = &config.static_dir {
            app = app.service(actix_files::Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind((host, port))?
    .run()
    .await
}
