//! Payment service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SessionId;
use domain::Money;
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// What a payment is for. Echoed back by the provider on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    /// The 50% prepayment of an order.
    Prepayment,
    /// A synthetic payment issued in developer mode.
    DevTest,
}

/// A request to bill the customer of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub session_id: SessionId,
    pub purpose: PaymentPurpose,
    pub title: String,
    pub description: String,
    pub amount: Money,
    pub currency: &'static str,
}

/// An invoice the provider accepted and sent to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Provider-side invoice reference.
    pub invoice_id: String,
    pub purpose: PaymentPurpose,
    pub title: String,
    pub description: String,
    pub amount: Money,
    pub currency: String,
}

/// Trait for payment initiation.
///
/// Only the start of a payment is synchronous. Completion arrives later
/// through the checkout coordinator.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Issues an invoice to the customer.
    async fn initiate(&self, request: InvoiceRequest) -> Result<Invoice, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    invoices: Vec<Invoice>,
    next_id: u32,
    fail_on_initiate: bool,
}

/// In-memory payment service for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to refuse every initiation.
    pub fn set_fail_on_initiate(&self, fail: bool) {
        self.state.write().unwrap().fail_on_initiate = fail;
    }

    /// Returns the number of invoices issued.
    pub fn invoice_count(&self) -> usize {
        self.state.read().unwrap().invoices.len()
    }

    /// Returns the most recent invoice.
    pub fn last_invoice(&self) -> Option<Invoice> {
        self.state.read().unwrap().invoices.last().cloned()
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn initiate(&self, request: InvoiceRequest) -> Result<Invoice, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_initiate {
            return Err(CheckoutError::PaymentService(
                "Payment provider unavailable".to_string(),
            ));
        }

        state.next_id += 1;
        let invoice = Invoice {
            invoice_id: format!("INV-{:04}", state.next_id),
            purpose: request.purpose,
            title: request.title,
            description: request.description,
            amount: request.amount,
            currency: request.currency.to_string(),
        };
        state.invoices.push(invoice.clone());

        Ok(invoice)
    }
}
