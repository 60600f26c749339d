//! Operator notification trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SessionId;
use domain::{AttachmentRef, OrderRecord};

use crate::error::CheckoutError;

/// One message delivered to the operator chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorMessage {
    Text {
        destination: SessionId,
        text: String,
    },
    Photo {
        destination: SessionId,
        photo: AttachmentRef,
        caption: Option<String>,
    },
}

/// Caption attached to the cookies reference photo.
pub const COOKIES_CAPTION: &str = "Reference for cookies:";

impl OperatorMessage {
    /// Splits a record into the messages the operator receives.
    ///
    /// The summary rides as the caption of the cake reference photo, or goes
    /// as plain text when there is none. The cookies photo follows with its
    /// own caption.
    pub fn for_record(destination: SessionId, record: &OrderRecord) -> Vec<OperatorMessage> {
        let summary = record.to_string();

        let mut messages = vec![match &record.reference_photo {
            Some(photo) => OperatorMessage::Photo {
                destination,
                photo: photo.clone(),
                caption: Some(summary),
            },
            None => OperatorMessage::Text {
                destination,
                text: summary,
            },
        }];
        if let Some(photo) = &record.cookies_photo {
            messages.push(OperatorMessage::Photo {
                destination,
                photo: photo.clone(),
                caption: Some(COOKIES_CAPTION.to_string()),
            });
        }
        messages
    }
}

/// Trait for delivering confirmed orders to the bakery operator.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Sends the order summary and its attachments to the operator.
    async fn notify_operator(&self, record: &OrderRecord) -> Result<(), CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    delivered: Vec<OperatorMessage>,
    fail_on_notify: bool,
}

/// In-memory notification service for testing and local runs.
#[derive(Debug, Clone)]
pub struct InMemoryNotificationService {
    operator: SessionId,
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a service delivering to the given operator chat.
    pub fn new(operator: SessionId) -> Self {
        Self {
            operator,
            state: Arc::new(RwLock::new(InMemoryNotificationState::default())),
        }
    }

    /// The operator chat messages go to.
    pub fn operator(&self) -> SessionId {
        self.operator
    }

    /// Configures the service to fail on every delivery.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_notify = fail;
    }

    /// Returns all delivered messages, oldest first.
    pub fn delivered(&self) -> Vec<OperatorMessage> {
        self.state.read().unwrap().delivered.clone()
    }

    /// Returns the number of delivered messages.
    pub fn delivered_count(&self) -> usize {
        self.state.read().unwrap().delivered.len()
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn notify_operator(&self, record: &OrderRecord) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_notify {
            return Err(CheckoutError::NotificationService(
                "Operator chat unreachable".to_string(),
            ));
        }

        let messages = OperatorMessage::for_record(self.operator, record);
        tracing::info!(
            order_id = %record.order_id,
            operator = %self.operator,
            messages = messages.len(),
            "operator notified"
        );
        state.delivered.extend(messages);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use common::OrderId;
    use domain::{CakeKind, CakeSize, Money, PaymentMethod, PriceBreakdown};

    use super::*;

    fn record(reference: Option<&str>, cookies: Option<&str>) -> OrderRecord {
        OrderRecord {
            order_id: OrderId::new(),
            customer_handle: None,
            cake_kind: CakeKind::Regular,
            flavor: "Carrot".to_string(),
            size: CakeSize::new(2),
            cream_color: None,
            decor_option: "No decoration".to_string(),
            cookies_count: u32::from(cookies.is_some()),
            cookies_photo: cookies.map(AttachmentRef::from),
            recipient_name: "Ivan".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            comment: "No comment".to_string(),
            reference_photo: reference.map(AttachmentRef::from),
            contact: "+79990000000".to_string(),
            payment: PaymentMethod::DevelopmentBypass,
            price: PriceBreakdown {
                base: Money::from_units(4600),
                cream: Money::zero(),
                decor: Money::zero(),
                cookies: Money::zero(),
                total: Money::from_units(4600),
                prepayment: Money::from_units(2300),
            },
            confirmed_at: Utc::now(),
        }
    }

    #[test]
    fn test_text_only_without_photos() {
        let operator = SessionId::new(-100);
        let record = record(None, None);

        let messages = OperatorMessage::for_record(operator, &record);

        assert_eq!(
            messages,
            vec![OperatorMessage::Text {
                destination: operator,
                text: record.to_string(),
            }]
        );
    }

    #[test]
    fn test_summary_captions_first_photo() {
        let operator = SessionId::new(-100);
        let record = record(Some("ref"), Some("cookies"));

        let messages = OperatorMessage::for_record(operator, &record);

        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &messages[0],
            OperatorMessage::Photo { photo, caption: Some(_), .. } if photo.as_str() == "ref"
        ));
        assert!(matches!(
            &messages[1],
            OperatorMessage::Photo { photo, caption: Some(caption), .. }
                if photo.as_str() == "cookies" && caption == COOKIES_CAPTION
        ));
    }

    #[test]
    fn test_cookies_photo_without_reference_follows_text_summary() {
        let operator = SessionId::new(-100);
        let record = record(None, Some("cookies"));

        let messages = OperatorMessage::for_record(operator, &record);

        assert_eq!(
            messages,
            vec![
                OperatorMessage::Text {
                    destination: operator,
                    text: record.to_string(),
                },
                OperatorMessage::Photo {
                    destination: operator,
                    photo: AttachmentRef::new("cookies"),
                    caption: Some("Reference for cookies:".to_string()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_notify_records_delivery() {
        let service = InMemoryNotificationService::new(SessionId::new(-100));

        service.notify_operator(&record(None, Some("c"))).await.unwrap();

        assert_eq!(service.delivered_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_on_notify() {
        let service = InMemoryNotificationService::new(SessionId::new(-100));
        service.set_fail_on_notify(true);

        let result = service.notify_operator(&record(None, None)).await;

        assert!(matches!(result, Err(CheckoutError::NotificationService(_))));
        assert_eq!(service.delivered_count(), 0);
    }
}
