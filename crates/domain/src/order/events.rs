//! Order session events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{AttachmentRef, CakeKind, CakeSize, Money, PaymentMethod};

/// Facts recorded while a customer walks through the order flow.
///
/// Each event is produced by validating one input and is then applied to the
/// session; a rejected input produces no event at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// The customer asked to start an order.
    OrderStarted(OrderStartedData),

    CakeKindChosen { kind: CakeKind },
    FlavorChosen { flavor: String },
    SizeChosen { size: CakeSize },
    CreamColorChosen { color: String },
    DecorChosen { option: String },
    CookiesAccepted,
    CookiesDeclined,
    CookiesCountEntered { count: u32 },
    CookiesPhotoProvided { photo: Option<AttachmentRef> },
    RecipientNamed { name: String },
    DeliveryDateSet { date: NaiveDate },
    CommentAdded { comment: String },
    ReferencePhotoProvided { photo: Option<AttachmentRef> },
    ContactProvided { contact: String },

    /// Online payment of the prepayment was requested; the state stays put
    /// until the provider reports completion.
    PaymentRequested { amount: Money },

    /// The prepayment was settled.
    PaymentConfirmed(PaymentConfirmedData),

    /// The order was abandoned.
    OrderCancelled { cancelled_at: DateTime<Utc> },
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::OrderStarted(_) => "OrderStarted",
            SessionEvent::CakeKindChosen { .. } => "CakeKindChosen",
            SessionEvent::FlavorChosen { .. } => "FlavorChosen",
            SessionEvent::SizeChosen { .. } => "SizeChosen",
            SessionEvent::CreamColorChosen { .. } => "CreamColorChosen",
            SessionEvent::DecorChosen { .. } => "DecorChosen",
            SessionEvent::CookiesAccepted => "CookiesAccepted",
            SessionEvent::CookiesDeclined => "CookiesDeclined",
            SessionEvent::CookiesCountEntered { .. } => "CookiesCountEntered",
            SessionEvent::CookiesPhotoProvided { .. } => "CookiesPhotoProvided",
            SessionEvent::RecipientNamed { .. } => "RecipientNamed",
            SessionEvent::DeliveryDateSet { .. } => "DeliveryDateSet",
            SessionEvent::CommentAdded { .. } => "CommentAdded",
            SessionEvent::ReferencePhotoProvided { .. } => "ReferencePhotoProvided",
            SessionEvent::ContactProvided { .. } => "ContactProvided",
            SessionEvent::PaymentRequested { .. } => "PaymentRequested",
            SessionEvent::PaymentConfirmed(_) => "PaymentConfirmed",
            SessionEvent::OrderCancelled { .. } => "OrderCancelled",
        }
    }
}

/// Data for OrderStarted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStartedData {
    /// Transport handle of the customer (e.g. `@username`), if known.
    pub customer_handle: Option<String>,

    /// When the order was started.
    pub started_at: DateTime<Utc>,
}

/// Data for PaymentConfirmed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmedData {
    /// How the prepayment was settled.
    pub method: PaymentMethod,

    /// When it was settled.
    pub confirmed_at: DateTime<Utc>,
}

// Convenience constructors
impl SessionEvent {
    /// Creates an OrderStarted event.
    pub fn order_started(customer_handle: Option<String>) -> Self {
        SessionEvent::OrderStarted(OrderStartedData {
            customer_handle,
            started_at: Utc::now(),
        })
    }

    /// Creates a PaymentConfirmed event.
    pub fn payment_confirmed(method: PaymentMethod) -> Self {
        SessionEvent::PaymentConfirmed(PaymentConfirmedData {
            method,
            confirmed_at: Utc::now(),
        })
    }

    /// Creates an OrderCancelled event.
    pub fn order_cancelled() -> Self {
        SessionEvent::OrderCancelled {
            cancelled_at: Utc::now(),
        }
    }
}
