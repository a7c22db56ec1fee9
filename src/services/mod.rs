pub mod billing;
pub mod issuer;
pub mod notifier;
pub mod reconciliation;
pub mod scheduler;

pub use billing::{BillingJob, BillingService};
pub use issuer::InvoiceIssuer;
pub use notifier::NotificationDispatcher;
pub use reconciliation::PaymentReconciler;
pub use scheduler::{Job, JobScheduler, JobStatus};
