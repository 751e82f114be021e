use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use remontpro_leads::app_state::AppState;
use remontpro_leads::config::Config;
use remontpro_leads::leads::models::FormValues;
use remontpro_leads::leads::validation::validate_form;
use remontpro_leads::leads::{FieldEdit, FormEvent, Orchestrator, SubmitPhase};
use remontpro_leads::services::message_builder::build_message;
use remontpro_leads::services::notifier::LogNotifier;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
/// Утилита оператора для заявок с сайта РемПро.
/// Показывает сообщение для Telegram, проверяет настройки и отправляет тестовую заявку.
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Печатает MarkdownV2-сообщение, которое уйдёт в чат, без отправки.
    Preview {
        #[command(flatten)]
        lead: LeadArgs,
    },
    /// Проверяет, настроен ли бот, и показывает рабочую временную зону. Токен не выводится.
    CheckConfig,
    /// Прогоняет заявку через полный цикл формы: проверка, отправка, уведомление.
    Send {
        #[command(flatten)]
        lead: LeadArgs,

        /// Согласие на обработку данных.
        #[arg(long)]
        consent: bool,
    },
}

#[derive(Args, Debug)]
struct LeadArgs {
    /// Имя клиента.
    #[arg(short, long)]
    name: String,

    /// Телефон клиента (например, '+380501234567').
    #[arg(short, long)]
    phone: String,

    /// Услуга.
    #[arg(short, long)]
    service: Option<String>,

    /// Площадь в м².
    #[arg(short, long)]
    area: Option<String>,

    /// Комментарий клиента.
    #[arg(short, long)]
    message: Option<String>,
}

impl LeadArgs {
    fn to_values(&self, consent: bool) -> FormValues {
        FormValues {
            name: self.name.clone(),
            phone: self.phone.clone(),
            service: self.service.clone().unwrap_or_default(),
            area: self.area.clone().unwrap_or_default(),
            message: self.message.clone().unwrap_or_default(),
            consent,
        }
    }

    fn into_edits(self, consent: bool) -> Vec<FieldEdit> {
        vec![
            FieldEdit::Name(self.name),
            FieldEdit::Phone(self.phone),
            FieldEdit::Service(self.service.unwrap_or_default()),
            FieldEdit::Area(self.area.unwrap_or_default()),
            FieldEdit::Message(self.message.unwrap_or_default()),
            FieldEdit::Consent(consent),
        ]
    }
}

fn preview(config: &Config, lead: LeadArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let values = lead.to_values(true);
    let errors = validate_form(&values);
    for (field, message) in errors.errors() {
        eprintln!("{:?}: {}", field, message);
    }
    if !errors.is_clean() {
        return Ok(ExitCode::FAILURE);
    }

    let timezone = config.get_timezone()?;
    let record = values.to_record();
    println!("{}", build_message(&record, Utc::now().with_timezone(&timezone)));
    Ok(ExitCode::SUCCESS)
}

fn check_config(config: &Config) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let timezone = config.get_timezone()?;
    println!("API base:  {}", config.effective_api_base());
    println!("Timezone:  {}", timezone);
    println!("Fallback:  {}", config.effective_fallback_phone());
    if config.telegram_credentials().is_configured() {
        println!("Telegram:  configured");
    } else {
        println!(
            "Telegram:  NOT configured, sends are simulated ({} ms delay)",
            config.effective_dev_delay().as_millis()
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn send(
    config: Config,
    lead: LeadArgs,
    consent: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let state = AppState::from_config(config)?;
    let mut orchestrator =
        Orchestrator::new(state.sender.clone(), Arc::new(LogNotifier), state.feedback.clone());

    for edit in lead.into_edits(consent) {
        orchestrator.handle(FormEvent::Edit(edit)).await;
    }
    let phase = orchestrator.handle(FormEvent::Submit).await;

    for (field, message) in orchestrator.errors().errors() {
        eprintln!("{:?}: {}", field, message);
    }
    println!("Результат: {:?}", phase);

    Ok(if phase == SubmitPhase::Succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Preview { lead } => preview(&config, lead),
        Commands::CheckConfig => check_config(&config),
        Commands::Send { lead, consent } => send(config, lead, consent).await,
    }
}
