use thiserror::Error;

use crate::config::EmailSettings;
use crate::models::{ContactFormRequest, Order, DEFAULT_LANGUAGE};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

/// Outbound notification boundary. The service hands fully localized
/// payloads to an implementation; delivery (SMTP, third-party API) lives
/// behind this trait.
pub trait NotificationSender: Send + Sync {
    fn send_order_confirmation(&self, order: &Order) -> Result<(), NotificationError>;
    fn send_contact_form(&self, form: &ContactFormRequest) -> Result<(), NotificationError>;
}

pub fn order_subject(language: &str) -> &'static str {
    match language {
        "en" => "Your order has been received",
        "es" => "Su pedido ha sido recibido",
        _ => "Ваш заказ принят",
    }
}

pub fn contact_subject(language: &str) -> &'static str {
    match language {
        "en" => "New contact form message",
        "es" => "Nuevo mensaje del formulario de contacto",
        _ => "Новое сообщение с формы обратной связи",
    }
}

/// Logs notifications instead of delivering them. Stands in for a real
/// sender in development and in tests.
pub struct LogSender {
    from: String,
    company_email: String,
}

impl LogSender {
    pub fn new(settings: &EmailSettings) -> Self {
        Self {
            from: settings.mail_from.clone(),
            company_email: settings.company_email.clone(),
        }
    }
}

impl NotificationSender for LogSender {
    fn send_order_confirmation(&self, order: &Order) -> Result<(), NotificationError> {
        tracing::info!(
            order_id = order.id,
            from = %self.from,
            to = %order.email,
            subject = order_subject(&order.language),
            total_cost = order.total_cost,
            items = order.items.len(),
            "order confirmation"
        );
        Ok(())
    }

    fn send_contact_form(&self, form: &ContactFormRequest) -> Result<(), NotificationError> {
        let language = form.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
        tracing::info!(
            from = %self.from,
            to = %self.company_email,
            reply_to = %form.email,
            subject = contact_subject(language),
            "contact form message"
        );
        Ok(())
    }
}
