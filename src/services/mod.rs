pub mod message_builder;
pub mod notifier;
pub mod telegram_api;
