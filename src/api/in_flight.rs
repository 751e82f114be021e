use dashmap::DashSet;
use std::sync::Arc;

/// Реестр заявок, которые сейчас отправляются. Ключ — нормализованный телефон.
/// Не даёт отправить ту же заявку второй раз, пока первая не завершилась.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    keys: Arc<DashSet<String>>,
}

/// Пока жив, ключ считается занятым
pub struct InFlightTicket {
    key: String,
    keys: Arc<DashSet<String>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self {
            keys: Arc::new(DashSet::new()),
        }
    }

    pub fn try_acquire(&self, key: &str) -> Option<InFlightTicket> {
        if !self.keys.insert(key.to_string()) {
            log::warn!("Submission for {} is already in flight", mask(key));
            return None;
        }
        Some(InFlightTicket {
            key: key.to_string(),
            keys: self.keys.clone(),
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}

// Последние 4 цифры, чтобы не писать телефон клиента в лог целиком
fn mask(key: &str) -> String {
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("***{}", tail)
}
