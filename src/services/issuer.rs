//! Invoice issuance: gateway transaction, pending record, PDF document.
//!
//! Ordering matters here. The gateway call goes first so a gateway failure
//! leaves nothing behind; the `pending` Transaction is persisted immediately
//! after, and only then is the PDF rendered. A rendering failure is logged
//! but does not undo issuance: the record plus payment URL are the durable
//! source of truth and the document can be regenerated.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use crate::domain::{transaction, AddOnCharge, Rental, Room, Tenant, Transaction};
use crate::gateway::{
    client::TransactionDetails, CreateTransactionRequest, Customer, GatewayClient, GatewayError,
    LineItem,
};
use crate::invoice::{self, InvoiceDocument, InvoiceLine};
use crate::ports::{StoreError, TransactionStore};

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<IssueError> for crate::error::AppError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::Gateway(e) => crate::error::AppError::ExternalService(e.to_string()),
            IssueError::Store(e) => e.into(),
        }
    }
}

pub struct IssueRequest<'a> {
    pub rental: &'a Rental,
    pub tenant: &'a Tenant,
    pub room: &'a Room,
    pub addons: &'a [AddOnCharge],
    pub amount: i64,
    pub due_at: DateTime<Utc>,
}

pub struct IssuedInvoice {
    pub transaction: Transaction,
    pub payment_url: String,
    pub document: InvoiceDocument,
}

pub struct InvoiceIssuer {
    gateway: GatewayClient,
    store: Arc<dyn TransactionStore>,
    invoice_dir: PathBuf,
}

impl InvoiceIssuer {
    pub fn new(gateway: GatewayClient, store: Arc<dyn TransactionStore>, invoice_dir: PathBuf) -> Self {
        Self {
            gateway,
            store,
            invoice_dir,
        }
    }

    pub async fn issue(&self, request: IssueRequest<'_>) -> Result<IssuedInvoice, IssueError> {
        let now = Utc::now();
        let order_id = transaction::build_order_id(request.rental.id, now);

        let mut items = vec![LineItem {
            id: format!("rent-{}", request.rental.id.simple()),
            name: "Monthly rent".to_string(),
            price: request.rental.base_price,
            quantity: 1,
        }];
        for addon in request.addons {
            items.push(LineItem {
                id: format!("addon-{}", addon.id.simple()),
                name: addon.name.clone(),
                price: addon.price,
                quantity: 1,
            });
        }

        let gateway_request = CreateTransactionRequest {
            transaction_details: TransactionDetails {
                order_id: order_id.clone(),
                gross_amount: request.amount,
            },
            customer_details: Customer {
                first_name: request.tenant.name.clone(),
                email: request.tenant.email.clone(),
                phone: request.tenant.phone.clone(),
            },
            item_details: items.clone(),
        };

        let gateway_response = self.gateway.create_transaction(&gateway_request).await?;

        let tx = Transaction::new(
            request.rental.id,
            request.tenant.id,
            request.amount,
            request.due_at,
            order_id.clone(),
        );
        self.store.insert_transaction(&tx).await?;

        let document = InvoiceDocument {
            order_id,
            hostel_name: request.room.hostel_name.clone(),
            room_number: request.room.number.clone(),
            tenant_name: request.tenant.name.clone(),
            due_at: request.due_at,
            lines: items
                .into_iter()
                .map(|item| InvoiceLine {
                    name: item.name,
                    amount: item.price,
                })
                .collect(),
            total: request.amount,
            payment_url: gateway_response.redirect_url.clone(),
        };

        if let Err(e) = invoice::write_invoice(&self.invoice_dir, &document) {
            warn!(
                "Failed to render invoice document {}: {}",
                document.order_id, e
            );
        }

        Ok(IssuedInvoice {
            transaction: tx,
            payment_url: gateway_response.redirect_url,
            document,
        })
    }
}
