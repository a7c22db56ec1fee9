use failsafe::futures::CircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Gateway rejected the transaction ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid response from gateway: {0}")]
    InvalidResponse(String),
    #[error("Circuit breaker open - payment gateway unavailable")]
    CircuitBreakerOpen,
}

impl GatewayError {
    /// Transient failures are worth retrying; a rejection is final.
    fn is_transient(&self) -> bool {
        match self {
            GatewayError::RequestError(_) => true,
            GatewayError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub first_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    /// Unit price in integer minor units.
    pub price: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CreateTransactionRequest {
    pub transaction_details: TransactionDetails,
    pub customer_details: Customer,
    pub item_details: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

/// Gateway token plus the URL the tenant pays at.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionResponse {
    pub token: String,
    pub redirect_url: String,
}

/// HTTP client for the payment gateway's create-transaction API.
pub struct GatewayClient {
    client: Client,
    base_url: String,
    server_key: String,
    max_attempts: u32,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>,
}

impl GatewayClient {
    pub fn new(base_url: String, server_key: String) -> Self {
        Self::with_circuit_breaker_config(base_url, server_key, 5, Duration::from_secs(60))
    }

    pub fn with_circuit_breaker_config(
        base_url: String,
        server_key: String,
        failure_threshold: u32,
        reset_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let backoff = backoff::exponential(Duration::from_secs(10), reset_timeout);
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        GatewayClient {
            client,
            base_url,
            server_key,
            max_attempts: 3,
            circuit_breaker,
        }
    }

    /// Create a gateway transaction for one invoice.
    ///
    /// Transient failures (network, 5xx) are retried up to `max_attempts`
    /// with a short linear backoff; rejections return immediately.
    pub async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<CreateTransactionResponse, GatewayError> {
        let mut last_err = GatewayError::InvalidResponse("no attempt made".to_string());

        for attempt in 1..=self.max_attempts {
            match self.try_create(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "Gateway call for {} failed (attempt {}/{}): {}",
                        request.transaction_details.order_id,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err)
    }

    async fn try_create(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<CreateTransactionResponse, GatewayError> {
        let url = format!("{}/transactions", self.base_url.trim_end_matches('/'));
        let client = self.client.clone();
        let server_key = self.server_key.clone();
        let body = serde_json::to_value(request)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .post(&url)
                    .basic_auth(&server_key, Some(""))
                    .json(&body)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(GatewayError::Rejected {
                        status: status.as_u16(),
                        body,
                    });
                }

                let parsed = response.json::<CreateTransactionResponse>().await?;
                Ok(parsed)
            })
            .await;

        match result {
            Ok(response) => Ok(response),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitBreakerOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

impl Clone for GatewayClient {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            server_key: self.server_key.clone(),
            max_attempts: self.max_attempts,
            circuit_breaker: self.circuit_breaker.clone(),
        }
    }
}
