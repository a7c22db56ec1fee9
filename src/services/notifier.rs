//! Outbound tenant notifications via the messaging webhook.
//!
//! Delivery failures are logged and never fail the billing batch; the
//! invoice stays collectible whether or not the message arrived.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::domain::Tenant;
use crate::invoice::{format_rupiah, InvoiceDocument};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Messaging webhook returned {0}")]
    Rejected(u16),
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    #[serde(rename = "phoneNumber")]
    phone_number: &'a str,
    message: &'a str,
}

/// Normalize a phone number to canonical international form.
///
/// `0812...` -> `+62812...`, `62812...` -> `+62812...`, `812...` ->
/// `+62812...`; numbers already carrying `+` pass through unchanged.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else if let Some(national) = trimmed.strip_prefix('0') {
        format!("+{}{}", country_code, national)
    } else if trimmed.starts_with(country_code) {
        format!("+{}", trimmed)
    } else {
        format!("+{}{}", country_code, trimmed)
    }
}

pub struct NotificationDispatcher {
    client: Client,
    webhook_url: String,
    country_code: String,
}

impl NotificationDispatcher {
    pub fn new(webhook_url: String, country_code: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            client,
            webhook_url,
            country_code,
        }
    }

    /// Message body for a freshly issued invoice: billing breakdown plus
    /// the payment link.
    pub fn compose_invoice_message(&self, invoice: &InvoiceDocument) -> String {
        let mut message = format!(
            "Hi {}, your rent invoice {} is ready.\n",
            invoice.tenant_name, invoice.order_id
        );
        for line in &invoice.lines {
            message.push_str(&format!("- {}: {}\n", line.name, format_rupiah(line.amount)));
        }
        message.push_str(&format!(
            "Total {} due {}.\nPay here: {}",
            format_rupiah(invoice.total),
            invoice.due_at.format("%Y-%m-%d"),
            invoice.payment_url
        ));
        message
    }

    pub async fn send_invoice(
        &self,
        tenant: &Tenant,
        invoice: &InvoiceDocument,
    ) -> Result<(), NotifyError> {
        let message = self.compose_invoice_message(invoice);
        self.send(&tenant.phone, &message).await
    }

    /// Alert the operator channel; used for batch-level billing failures.
    pub async fn send_operator_alert(
        &self,
        operator_phone: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        self.send(operator_phone, message).await
    }

    async fn send(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        let to = normalize_phone(phone, &self.country_code);
        let payload = OutboundMessage {
            phone_number: &to,
            message,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }

        info!("Notification delivered to {}", to);
        Ok(())
    }
}
