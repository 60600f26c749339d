//! Order session aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::pricing::{self, CakeSpec, PriceBreakdown, PricingInput};

use super::input::NO_COMMENT;
use super::transitions::{self, StepContext};
use super::{
    AttachmentRef, CakeKind, CakeSize, Money, OrderError, OrderRecord, OrderState, PaymentMethod,
    SessionEvent, UserInput,
};

/// One customer's order in progress.
///
/// The session only changes by applying events produced by its own decision
/// methods, so a rejected input leaves every field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSession {
    state: OrderState,

    /// Number of events applied since the session was created.
    #[serde(default)]
    revision: u64,

    customer_handle: Option<String>,
    started_at: Option<DateTime<Utc>>,

    cake_kind: Option<CakeKind>,
    flavor: Option<String>,
    /// Regular cakes only.
    size: Option<CakeSize>,
    /// Bento cakes only.
    cream_color: Option<String>,
    decor_option: Option<String>,

    cookies_count: u32,
    cookies_photo: Option<AttachmentRef>,

    recipient_name: Option<String>,
    delivery_date: Option<NaiveDate>,
    comment: Option<String>,
    reference_photo: Option<AttachmentRef>,
    contact: Option<String>,

    /// Amount of the last payment initiated for this session.
    pending_prepayment: Option<Money>,
    payment: Option<PaymentMethod>,
    confirmed_at: Option<DateTime<Utc>>,
}

impl Aggregate for OrderSession {
    type Event = SessionEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "OrderSession"
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn apply(&mut self, event: Self::Event) {
        let next = transitions::next_state(&event, self.cake_kind);

        match event {
            SessionEvent::OrderStarted(data) => {
                *self = OrderSession {
                    revision: self.revision,
                    customer_handle: data.customer_handle,
                    started_at: Some(data.started_at),
                    ..Default::default()
                };
            }
            SessionEvent::CakeKindChosen { kind } => self.cake_kind = Some(kind),
            SessionEvent::FlavorChosen { flavor } => self.flavor = Some(flavor),
            SessionEvent::SizeChosen { size } => self.size = Some(size),
            SessionEvent::CreamColorChosen { color } => self.cream_color = Some(color),
            SessionEvent::DecorChosen { option } => self.decor_option = Some(option),
            SessionEvent::CookiesAccepted => {}
            SessionEvent::CookiesDeclined => {
                self.cookies_count = 0;
                self.cookies_photo = None;
            }
            SessionEvent::CookiesCountEntered { count } => self.cookies_count = count,
            SessionEvent::CookiesPhotoProvided { photo } => self.cookies_photo = photo,
            SessionEvent::RecipientNamed { name } => self.recipient_name = Some(name),
            SessionEvent::DeliveryDateSet { date } => self.delivery_date = Some(date),
            SessionEvent::CommentAdded { comment } => self.comment = Some(comment),
            SessionEvent::ReferencePhotoProvided { photo } => self.reference_photo = photo,
            SessionEvent::ContactProvided { contact } => self.contact = Some(contact),
            SessionEvent::PaymentRequested { amount } => self.pending_prepayment = Some(amount),
            SessionEvent::PaymentConfirmed(data) => {
                self.payment = Some(data.method);
                self.confirmed_at = Some(data.confirmed_at);
            }
            SessionEvent::OrderCancelled { .. } => {
                *self = OrderSession {
                    revision: self.revision,
                    ..Default::default()
                };
            }
        }

        if let Some(next) = next {
            self.state = next;
        }
        self.revision += 1;
    }
}

// Query methods
impl OrderSession {
    /// Returns the current state.
    pub fn state(&self) -> OrderState {
        self.state
    }

    /// Returns true while the flow is waiting for customer input.
    pub fn is_active(&self) -> bool {
        self.state.is_collecting()
    }

    /// Returns true if the session is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn customer_handle(&self) -> Option<&str> {
        self.customer_handle.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn cake_kind(&self) -> Option<CakeKind> {
        self.cake_kind
    }

    pub fn flavor(&self) -> Option<&str> {
        self.flavor.as_deref()
    }

    pub fn size(&self) -> Option<CakeSize> {
        self.size
    }

    pub fn cream_color(&self) -> Option<&str> {
        self.cream_color.as_deref()
    }

    pub fn decor_option(&self) -> Option<&str> {
        self.decor_option.as_deref()
    }

    /// Number of cookies ordered; zero when declined.
    pub fn cookies_count(&self) -> u32 {
        self.cookies_count
    }

    pub fn cookies_photo(&self) -> Option<&AttachmentRef> {
        self.cookies_photo.as_ref()
    }

    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_name.as_deref()
    }

    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivery_date
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn reference_photo(&self) -> Option<&AttachmentRef> {
        self.reference_photo.as_ref()
    }

    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    /// Prepayment amount of the last initiated online payment.
    pub fn pending_prepayment(&self) -> Option<Money> {
        self.pending_prepayment
    }

    pub fn payment(&self) -> Option<&PaymentMethod> {
        self.payment.as_ref()
    }

    /// Returns true once money was actually received for this order.
    pub fn payment_confirmed(&self) -> bool {
        self.payment.as_ref().is_some_and(PaymentMethod::is_paid)
    }

    /// Builds the pricing input from the fields collected so far.
    pub fn pricing_input(&self) -> Result<PricingInput<'_>, OrderError> {
        let kind = required(self.cake_kind, "cake kind")?;
        let flavor = required(self.flavor.as_deref(), "flavor")?;
        let cake = match kind {
            CakeKind::Regular => CakeSpec::Regular {
                flavor,
                size: required(self.size, "size")?,
            },
            CakeKind::Bento => CakeSpec::Bento {
                flavor,
                cream_color: self.cream_color.as_deref(),
            },
        };
        Ok(PricingInput {
            cake,
            decor_option: self.decor_option.as_deref(),
            cookies_count: self.cookies_count,
        })
    }

    /// Prices the order as collected so far.
    pub fn quote(&self) -> Result<PriceBreakdown, OrderError> {
        Ok(pricing::price(&self.pricing_input()?))
    }
}

// Command methods (return events)
impl OrderSession {
    /// Starts a new order.
    pub fn start(&self, customer_handle: Option<String>) -> Result<Vec<SessionEvent>, OrderError> {
        if self.state != OrderState::Idle {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "start an order",
            });
        }

        Ok(vec![SessionEvent::order_started(customer_handle)])
    }

    /// Validates one customer input against the current state.
    ///
    /// The cancel input is checked before anything else and is honored in
    /// every non-terminal state.
    pub fn handle_input(
        &self,
        input: &UserInput,
        ctx: &StepContext,
    ) -> Result<Vec<SessionEvent>, OrderError> {
        if input.is_cancel() {
            return self.cancel();
        }

        match transitions::transition_for(self.state) {
            Some(transition) => transition.decide(self, input, ctx),
            None if self.state == OrderState::Idle => Err(OrderError::NoActiveOrder),
            None => Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "accept input",
            }),
        }
    }

    /// Abandons the order.
    pub fn cancel(&self) -> Result<Vec<SessionEvent>, OrderError> {
        if !self.state.can_cancel() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "cancel",
            });
        }

        Ok(vec![SessionEvent::order_cancelled()])
    }

    /// Confirms the order without payment. Developer mode only.
    pub fn skip_payment(&self, ctx: &StepContext) -> Result<Vec<SessionEvent>, OrderError> {
        if !ctx.developer_mode {
            return Err(OrderError::Unauthorized {
                action: "skip payment",
            });
        }
        self.ensure_awaiting_payment("skip payment")?;

        Ok(vec![SessionEvent::payment_confirmed(
            PaymentMethod::DevelopmentBypass,
        )])
    }

    /// Confirms the order after the provider reported a successful payment.
    ///
    /// Only the prepayment this session requested, for exactly its amount,
    /// confirms the order.
    pub fn confirm_payment(
        &self,
        payment_id: impl Into<String>,
        amount: Money,
    ) -> Result<Vec<SessionEvent>, OrderError> {
        self.ensure_awaiting_payment("confirm payment")?;
        let expected = self
            .pending_prepayment
            .ok_or(OrderError::NoPendingPayment)?;
        if amount != expected {
            return Err(OrderError::PaymentAmountMismatch {
                expected,
                received: amount,
            });
        }

        Ok(vec![SessionEvent::payment_confirmed(PaymentMethod::Online {
            payment_id: payment_id.into(),
        })])
    }

    fn ensure_awaiting_payment(&self, action: &'static str) -> Result<(), OrderError> {
        if !self.state.can_confirm_payment() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action,
            });
        }
        Ok(())
    }

    /// Assembles the immutable record of a confirmed order.
    ///
    /// The price is recomputed from the stored fields.
    pub fn finalize(&self, order_id: OrderId) -> Result<OrderRecord, OrderError> {
        if self.state != OrderState::Confirmed {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "finalize the order",
            });
        }

        Ok(OrderRecord {
            order_id,
            customer_handle: self.customer_handle.clone(),
            cake_kind: required(self.cake_kind, "cake kind")?,
            flavor: required(self.flavor.clone(), "flavor")?,
            size: self.size,
            cream_color: self.cream_color.clone(),
            decor_option: required(self.decor_option.clone(), "decoration")?,
            cookies_count: self.cookies_count,
            cookies_photo: self.cookies_photo.clone(),
            recipient_name: required(self.recipient_name.clone(), "recipient name")?,
            delivery_date: required(self.delivery_date, "delivery date")?,
            comment: self
                .comment
                .clone()
                .unwrap_or_else(|| NO_COMMENT.to_string()),
            reference_photo: self.reference_photo.clone(),
            contact: required(self.contact.clone(), "contact")?,
            payment: required(self.payment.clone(), "payment")?,
            price: self.quote()?,
            confirmed_at: self.confirmed_at.unwrap_or_else(Utc::now),
        })
    }

    /// Clears a terminal session back to `Idle`. No-op otherwise.
    pub fn reset(&mut self) {
        if self.state.is_terminal() {
            *self = OrderSession::default();
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, OrderError> {
    value.ok_or(OrderError::IncompleteOrder { field })
}
