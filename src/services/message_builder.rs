use chrono::DateTime;
use chrono_tz::Tz;

use crate::leads::models::{LeadRecord, NOT_SPECIFIED};

/// Символы, значимые для MarkdownV2
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

const AREA_UNIT: &str = "м²";
const EMPTY_MESSAGE: &str = "_не вказано_";

/// Экранирует текст обратным слэшем, чтобы Telegram показал его буквально
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Время в формате `дд.мм.рррр, гг:хх`, как его показывает uk-UA
pub fn format_timestamp(at: &DateTime<Tz>) -> String {
    at.format("%d.%m.%Y, %H:%M").to_string()
}

pub fn build_message(lead: &LeadRecord, at: DateTime<Tz>) -> String {
    let area = match lead.area.as_deref() {
        Some(area) => format!("{} {}", escape_markdown_v2(area), AREA_UNIT),
        None => NOT_SPECIFIED.to_string(),
    };
    let message = match lead.message.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => escape_markdown_v2(text),
        _ => EMPTY_MESSAGE.to_string(),
    };

    format!(
        "🏗 *Нова заявка з сайту РемПро\\!*\n\
         \n\
         👤 *Ім'я:* {name}\n\
         📞 *Телефон:* {phone}\n\
         🔧 *Послуга:* {service}\n\
         📐 *Площа:* {area}\n\
         💬 *Повідомлення:* {message}\n\
         \n\
         🕐 *Час:* {time}\n\
         🌐 *Джерело:* Сайт remontpro\\.te\\.ua",
        name = escape_markdown_v2(&lead.name),
        phone = escape_markdown_v2(&lead.phone),
        service = escape_markdown_v2(&lead.service),
        area = area,
        message = message,
        time = escape_markdown_v2(&format_timestamp(&at)),
    )
}
