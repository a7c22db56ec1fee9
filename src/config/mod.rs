use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub gateway_base_url: String,
    pub gateway_server_key: String,
    pub notify_webhook_url: String,
    /// Operator number for batch-failure alerts; alerts are skipped when unset.
    pub operator_phone: Option<String>,
    /// National dialing prefix used when normalizing tenant numbers.
    pub country_code: String,
    /// Length of one billing period in seconds. Defaults to 30 days.
    pub billing_period_secs: i64,
    /// Offset added to "now" for a new invoice's due date. Defaults to 1 day.
    pub due_offset_secs: i64,
    /// Cron expression driving the billing batch.
    pub billing_schedule: String,
    pub invoice_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv().ok();

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let gateway_base_url = env::var("GATEWAY_BASE_URL")
            .unwrap_or_else(|_| "https://app.sandbox.midtrans.com/snap/v1".to_string());

        let gateway_server_key = env::var("GATEWAY_SERVER_KEY")
            .map_err(|_| anyhow::anyhow!("GATEWAY_SERVER_KEY must be set"))?;

        let notify_webhook_url = env::var("NOTIFY_WEBHOOK_URL")
            .unwrap_or_else(|_| "http://localhost:3001/send".to_string());

        let operator_phone = env::var("OPERATOR_PHONE").ok();

        let country_code = env::var("COUNTRY_CODE").unwrap_or_else(|_| "62".to_string());

        let billing_period_secs = env::var("BILLING_PERIOD_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30 * 24 * 3600);

        let due_offset_secs = env::var("DUE_OFFSET_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 3600);

        let billing_schedule =
            env::var("BILLING_SCHEDULE").unwrap_or_else(|_| "0 0 * * * *".to_string());

        let invoice_dir = env::var("INVOICE_DIR").unwrap_or_else(|_| "invoices".to_string());

        Ok(Config {
            server_port,
            database_url,
            gateway_base_url,
            gateway_server_key,
            notify_webhook_url,
            operator_phone,
            country_code,
            billing_period_secs,
            due_offset_secs,
            billing_schedule,
            invoice_dir,
        })
    }
}
