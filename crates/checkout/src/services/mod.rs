//! Outbound collaborator traits and in-memory implementations.

pub mod notification;
pub mod payment;

pub use notification::{InMemoryNotificationService, NotificationService, OperatorMessage};
pub use payment::{InMemoryPaymentService, Invoice, InvoiceRequest, PaymentPurpose, PaymentService};
