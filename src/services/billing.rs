//! Billing decision engine and the batch that drives it.
//!
//! `decide` is the pure core: given a rental, its add-ons, and the clock it
//! answers skip-or-issue. `BillingService::run_batch` walks every active
//! rental, isolating failures per rental so one bad record never aborts the
//! run.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::{AddOnCharge, Rental};
use crate::ports::{RentalStore, StoreError, TransactionStore};
use crate::services::issuer::{InvoiceIssuer, IssueError, IssueRequest};
use crate::services::notifier::NotificationDispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Rental has a leave timestamp; vacated tenants are never billed.
    NotActive,
    /// An invoice was already issued within the current billing period.
    AlreadyBilled,
    /// Less than one billing period has elapsed since the tenant joined.
    TooEarly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingDecision {
    Skip(SkipReason),
    Issue {
        amount: i64,
        due_at: DateTime<Utc>,
    },
}

/// Decide whether a rental is due for a new invoice.
///
/// `billed_this_period` is the period-scoped existence check: whether any
/// invoice for this rental was issued at or after `now - period`.
pub fn decide(
    rental: &Rental,
    addons: &[AddOnCharge],
    billed_this_period: bool,
    now: DateTime<Utc>,
    period: Duration,
    due_offset: Duration,
) -> BillingDecision {
    if !rental.is_active() {
        return BillingDecision::Skip(SkipReason::NotActive);
    }

    if billed_this_period {
        return BillingDecision::Skip(SkipReason::AlreadyBilled);
    }

    if now - rental.joined_at < period {
        return BillingDecision::Skip(SkipReason::TooEarly);
    }

    let amount = rental.base_price + addons.iter().map(|a| a.price).sum::<i64>();

    BillingDecision::Issue {
        amount,
        due_at: now + due_offset,
    }
}

#[derive(Debug, Default, serde::Serialize)]
pub struct BatchSummary {
    pub issued: u32,
    pub skipped: u32,
    pub failed: u32,
}

pub struct BillingService {
    rentals: Arc<dyn RentalStore>,
    transactions: Arc<dyn TransactionStore>,
    issuer: InvoiceIssuer,
    notifier: Arc<NotificationDispatcher>,
    period: Duration,
    due_offset: Duration,
}

impl BillingService {
    pub fn new(
        rentals: Arc<dyn RentalStore>,
        transactions: Arc<dyn TransactionStore>,
        issuer: InvoiceIssuer,
        notifier: Arc<NotificationDispatcher>,
        period: Duration,
        due_offset: Duration,
    ) -> Self {
        Self {
            rentals,
            transactions,
            issuer,
            notifier,
            period,
            due_offset,
        }
    }

    /// One billing run over all active rentals.
    ///
    /// Per-rental failures are logged and skipped. Only enumeration failure
    /// is returned to the caller, which alerts the operator channel.
    pub async fn run_batch(&self) -> Result<BatchSummary, StoreError> {
        let rentals = self.rentals.list_active_rentals().await?;
        info!("Billing batch started over {} active rentals", rentals.len());

        let mut summary = BatchSummary::default();

        for rental in rentals {
            match self.process_rental(&rental).await {
                Ok(Some(_)) => summary.issued += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!("Billing failed for rental {}: {}", rental.id, e);
                }
            }
        }

        info!(
            "Billing batch complete: {} issued, {} skipped, {} failed",
            summary.issued, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Run the decision-issue-notify pipeline for one rental manually, e.g.
    /// from the admin surface. Returns `None` when the rental is not due.
    pub async fn bill_rental(
        &self,
        rental_id: uuid::Uuid,
    ) -> Result<Option<crate::domain::Transaction>, IssueError> {
        let rental = self
            .rentals
            .list_active_rentals()
            .await?
            .into_iter()
            .find(|r| r.id == rental_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("active rental {} not found", rental_id))
            })?;

        self.process_rental(&rental).await
    }

    async fn process_rental(
        &self,
        rental: &Rental,
    ) -> Result<Option<crate::domain::Transaction>, IssueError> {
        let now = Utc::now();

        let billed = self
            .transactions
            .has_transaction_since(rental.id, now - self.period)
            .await?;
        let addons = self.rentals.addons_for_rental(rental.id).await?;

        let (amount, due_at) = match decide(
            rental,
            &addons,
            billed,
            now,
            self.period,
            self.due_offset,
        ) {
            BillingDecision::Skip(reason) => {
                debug!("Skipping rental {}: {:?}", rental.id, reason);
                return Ok(None);
            }
            BillingDecision::Issue { amount, due_at } => (amount, due_at),
        };

        // Tenant or room lookup failure skips this rental, not the batch.
        let tenant = self.rentals.get_tenant(rental.tenant_id).await?;
        let room = self.rentals.get_room(rental.room_id).await?;

        let issued = self
            .issuer
            .issue(IssueRequest {
                rental,
                tenant: &tenant,
                room: &room,
                addons: &addons,
                amount,
                due_at,
            })
            .await?;

        info!(
            "Issued invoice {} for rental {} ({})",
            issued.transaction.order_id,
            rental.id,
            issued.transaction.amount
        );

        // Collection does not depend on delivery; log and move on.
        if let Err(e) = self.notifier.send_invoice(&tenant, &issued.document).await {
            warn!(
                "Notification for invoice {} failed: {}",
                issued.transaction.order_id, e
            );
        }

        Ok(Some(issued.transaction))
    }
}

/// Helper for tests and ad-hoc tooling: the amount `decide` would charge.
pub fn compute_amount(rental: &Rental, addons: &[AddOnCharge]) -> i64 {
    rental.base_price + addons.iter().map(|a| a.price).sum::<i64>()
}

/// Scheduled job wrapper around the billing batch. Batch-level failures
/// (rental enumeration itself) raise an operator alert; the process keeps
/// running either way.
pub struct BillingJob {
    service: Arc<BillingService>,
    schedule: String,
    operator_phone: Option<String>,
}

impl BillingJob {
    pub fn new(
        service: Arc<BillingService>,
        schedule: String,
        operator_phone: Option<String>,
    ) -> Self {
        Self {
            service,
            schedule,
            operator_phone,
        }
    }
}

#[async_trait::async_trait]
impl crate::services::scheduler::Job for BillingJob {
    fn name(&self) -> &str {
        "billing"
    }

    fn schedule(&self) -> &str {
        &self.schedule
    }

    async fn execute(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self.service.run_batch().await {
            Ok(_) => Ok(()),
            Err(e) => {
                if let Some(operator) = &self.operator_phone {
                    let alert = format!("Billing batch failed: {}", e);
                    if let Err(notify_err) = self
                        .service
                        .notifier
                        .send_operator_alert(operator, &alert)
                        .await
                    {
                        error!("Operator alert failed: {}", notify_err);
                    }
                }
                Err(Box::new(e))
            }
        }
    }
}
