//! Checkout coordinator: routes inbound events to order sessions.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use common::{OrderId, SessionId};
use domain::catalog::CURRENCY;
use domain::{
    Aggregate, BotCommand, DomainEvent, Money, OrderError, OrderRecord, OrderSession, OrderState, Prompt,
    SessionEvent, StepContext, UserInput,
};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{CheckoutError, Result};
use crate::repository::SessionRepository;
use crate::services::{Invoice, InvoiceRequest, NotificationService, PaymentPurpose, PaymentService};

/// Runtime switches for the coordinator.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSettings {
    /// Exposes the payment bypass and synthetic test payments.
    pub developer_mode: bool,

    /// Idle time after which an unfinished order is cancelled. `None`
    /// keeps abandoned sessions forever.
    pub session_ttl: Option<Duration>,
}

/// One customer input, already tied to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub session_id: SessionId,
    /// Transport handle of the customer, e.g. `@username`.
    pub sender: Option<String>,
    pub input: UserInput,
}

impl Inbound {
    pub fn new(session_id: SessionId, input: UserInput) -> Self {
        Self {
            session_id,
            sender: None,
            input,
        }
    }

    pub fn text(session_id: SessionId, text: impl Into<String>) -> Self {
        Self::new(session_id, UserInput::text(text))
    }

    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// Completion notice from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub purpose: PaymentPurpose,
    pub amount: Money,
}

/// What the transport should show after one inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub session_id: SessionId,
    /// State of the session after the event.
    pub state: OrderState,
    pub messages: Vec<Prompt>,
    /// Invoice issued while handling the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    /// Order finalized while handling the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderRecord>,
}

impl Reply {
    fn new(session_id: SessionId, state: OrderState) -> Self {
        Self {
            session_id,
            state,
            messages: Vec::new(),
            invoice: None,
            order: None,
        }
    }

    fn with_message(mut self, prompt: Prompt) -> Self {
        self.messages.push(prompt);
        self
    }

    /// Text of the last message, if any.
    pub fn last_text(&self) -> Option<&str> {
        self.messages.last().map(|m| m.text.as_str())
    }
}

/// Drives order sessions and the collaborator hand-offs around them.
///
/// Every entry point locks the session's slot for its whole duration,
/// collaborator calls included, so one session never sees two inputs at once.
/// Events are only committed after the hand-off they depend on succeeded.
pub struct CheckoutCoordinator<P, N, C = SystemClock>
where
    P: PaymentService,
    N: NotificationService,
    C: Clock,
{
    repository: SessionRepository,
    payment: Option<P>,
    notifications: N,
    clock: C,
    settings: CheckoutSettings,
}

impl<P, N> CheckoutCoordinator<P, N, SystemClock>
where
    P: PaymentService,
    N: NotificationService,
{
    /// Creates a coordinator on the system clock.
    ///
    /// Without a payment service online payment is reported as unavailable;
    /// the developer bypass still works.
    pub fn new(payment: Option<P>, notifications: N, settings: CheckoutSettings) -> Self {
        Self {
            repository: SessionRepository::new(),
            payment,
            notifications,
            clock: SystemClock,
            settings,
        }
    }
}

impl<P, N, C> CheckoutCoordinator<P, N, C>
where
    P: PaymentService,
    N: NotificationService,
    C: Clock,
{
    /// Replaces the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> CheckoutCoordinator<P, N, C2> {
        CheckoutCoordinator {
            repository: self.repository,
            payment: self.payment,
            notifications: self.notifications,
            clock,
            settings: self.settings,
        }
    }

    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Returns true if online payment is configured.
    pub fn payments_enabled(&self) -> bool {
        self.payment.is_some()
    }

    /// Returns a snapshot of a session.
    pub async fn session(&self, session_id: SessionId) -> Option<OrderSession> {
        self.repository.get(session_id).await
    }

    /// Handles one inbound event and returns what to show the customer.
    ///
    /// Validation failures are not errors: they come back as a re-prompt and
    /// leave the session unchanged.
    #[tracing::instrument(
        skip(self, inbound),
        fields(session_id = %inbound.session_id, input = ?inbound.input.class())
    )]
    pub async fn handle(&self, inbound: Inbound) -> Result<Reply> {
        let Inbound {
            session_id,
            sender,
            input,
        } = inbound;

        let slot = self.repository.slot(session_id, self.clock.now()).await;
        let mut slot = slot.lock().await;
        slot.touch(self.clock.now());
        let session = &mut slot.session;

        if let Some(command) = input.as_text().and_then(BotCommand::parse) {
            return self.run_command(session_id, session, command, sender).await;
        }

        match session.handle_input(&input, &self.step_context()) {
            Ok(events) => self.commit(session_id, session, events).await,
            Err(error) => Ok(self.reject(session_id, session, &error)),
        }
    }

    /// Pre-checkout gate, asked by the provider right before charging.
    #[tracing::instrument(skip(self))]
    pub async fn approve_checkout(&self, session_id: SessionId, purpose: PaymentPurpose) -> bool {
        let approved = match purpose {
            PaymentPurpose::DevTest => self.settings.developer_mode,
            PaymentPurpose::Prepayment => {
                self.repository.get(session_id).await.is_some_and(|session| {
                    session.state().can_confirm_payment() && session.pending_prepayment().is_some()
                })
            }
        };

        if !approved {
            tracing::warn!(?purpose, "pre-checkout rejected");
        }
        approved
    }

    /// Handles the provider's notice that a payment went through.
    ///
    /// A prepayment confirms and finalizes the order, but only for a session
    /// that was invoiced that exact amount. A test payment is only
    /// acknowledged, and only in developer mode.
    #[tracing::instrument(
        skip(self, receipt),
        fields(payment_id = %receipt.payment_id, purpose = ?receipt.purpose)
    )]
    pub async fn payment_succeeded(
        &self,
        session_id: SessionId,
        receipt: PaymentReceipt,
    ) -> Result<Reply> {
        if receipt.purpose == PaymentPurpose::DevTest {
            if !self.settings.developer_mode {
                tracing::warn!("test payment outside developer mode");
                return Err(OrderError::Unauthorized {
                    action: "test payment",
                }
                .into());
            }
            tracing::info!(amount = %receipt.amount, "test payment received");
            let state = self
                .repository
                .get(session_id)
                .await
                .map(|session| session.state())
                .unwrap_or_default();
            return Ok(Reply::new(session_id, state)
                .with_message(Prompt::test_payment_received(receipt.amount)));
        }

        let slot = self
            .repository
            .find(session_id)
            .await
            .ok_or(CheckoutError::SessionNotFound(session_id))?;
        let mut slot = slot.lock().await;
        slot.touch(self.clock.now());
        let session = &mut slot.session;

        let events = session
            .confirm_payment(receipt.payment_id, receipt.amount)
            .inspect_err(|error| {
                metrics::counter!("payment_completion_rejected_total").increment(1);
                tracing::warn!(
                    expected = ?session.pending_prepayment(),
                    received = %receipt.amount,
                    %error,
                    "payment completion rejected"
                );
            })?;
        self.commit(session_id, session, events).await
    }

    /// Cancels orders that have been quiet for longer than the session TTL,
    /// then drops idle sessions quiet for as long.
    ///
    /// Without a TTL nothing is cancelled and every idle, unused session is
    /// dropped. Returns the number of sessions cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let cutoff = self
            .settings
            .session_ttl
            .and_then(|ttl| TimeDelta::from_std(ttl).ok())
            .and_then(|ttl| now.checked_sub_signed(ttl));

        let purged = match cutoff {
            Some(cutoff) => self.cancel_abandoned(cutoff).await,
            None => 0,
        };

        let evicted = self.repository.evict_idle(cutoff.unwrap_or(now)).await;
        if evicted > 0 {
            metrics::counter!("sessions_evicted_total").increment(evicted as u64);
            tracing::debug!(evicted, "idle sessions dropped");
        }
        purged
    }

    async fn cancel_abandoned(&self, cutoff: DateTime<Utc>) -> usize {
        let mut purged = 0;
        for (session_id, slot) in self.repository.slots().await {
            let mut slot = slot.lock().await;
            if !slot.is_abandoned(cutoff) {
                continue;
            }
            if let Ok(events) = slot.session.cancel() {
                let state = slot.session.state();
                slot.session.apply_events(events);
                slot.session.reset();
                purged += 1;
                tracing::info!(%session_id, %state, "abandoned order expired");
            }
        }

        if purged > 0 {
            metrics::counter!("sessions_expired_total").increment(purged as u64);
        }
        purged
    }

    fn step_context(&self) -> StepContext {
        StepContext::new(self.clock.today()).with_developer_mode(self.settings.developer_mode)
    }

    async fn run_command(
        &self,
        session_id: SessionId,
        session: &mut OrderSession,
        command: BotCommand,
        sender: Option<String>,
    ) -> Result<Reply> {
        let developer_mode = self.settings.developer_mode;
        let reply = Reply::new(session_id, session.state());

        if command.is_developer_only() && !developer_mode {
            tracing::warn!(%command, "developer command outside developer mode");
            return Ok(reply.with_message(Prompt::unauthorized()));
        }

        match command {
            BotCommand::Start => Ok(reply
                .with_message(Prompt::handmade_disclaimer())
                .with_message(Prompt::greeting(developer_mode))),
            BotCommand::Help => Ok(reply.with_message(Prompt::help(developer_mode))),
            BotCommand::Prices => Ok(reply.with_message(Prompt::price_list())),
            BotCommand::Order => self.start_order(session_id, session, sender),
            BotCommand::Cancel => match session.cancel() {
                Ok(events) => self.commit(session_id, session, events).await,
                Err(error) => Ok(self.reject(session_id, session, &error)),
            },
            BotCommand::DevSkip => match session.skip_payment(&self.step_context()) {
                Ok(events) => self.commit(session_id, session, events).await,
                Err(OrderError::InvalidStateTransition { .. }) => {
                    Ok(reply.with_message(Prompt::payment_step_only()))
                }
                Err(error) => Ok(self.reject(session_id, session, &error)),
            },
            BotCommand::DevPayTest { amount } => Ok(self.test_payment(reply, amount).await),
        }
    }

    fn start_order(
        &self,
        session_id: SessionId,
        session: &mut OrderSession,
        sender: Option<String>,
    ) -> Result<Reply> {
        if session.is_active() {
            tracing::info!(state = %session.state(), "order restarted");
        }

        let mut fresh = OrderSession::default();
        let events = fresh.start(sender)?;
        fresh.apply_events(events);
        *session = fresh;

        metrics::counter!("orders_started_total").increment(1);
        tracing::info!("order started");

        Ok(Reply::new(session_id, session.state())
            .with_message(Prompt::order_disclaimer())
            .with_message(Prompt::for_state(session, self.settings.developer_mode)))
    }

    /// Applies accepted events, running whatever hand-off they call for.
    async fn commit(
        &self,
        session_id: SessionId,
        session: &mut OrderSession,
        events: Vec<SessionEvent>,
    ) -> Result<Reply> {
        tracing::debug!(
            aggregate = OrderSession::aggregate_type(),
            events = ?events.iter().map(DomainEvent::event_type).collect::<Vec<_>>(),
            "committing events"
        );
        let was_active = session.is_active();
        let requested = events.iter().find_map(|event| match event {
            SessionEvent::PaymentRequested { amount } => Some(*amount),
            _ => None,
        });

        let mut next = session.clone();
        next.apply_events(events);

        if let Some(amount) = requested {
            let request = InvoiceRequest {
                session_id,
                purpose: PaymentPurpose::Prepayment,
                title: "Cake order prepayment".to_string(),
                description: prepayment_description(&next),
                amount,
                currency: CURRENCY,
            };
            return match self.initiate_payment(request).await {
                Ok(invoice) => {
                    *session = next;
                    tracing::info!(invoice_id = %invoice.invoice_id, %amount, "prepayment invoice issued");
                    let mut reply = Reply::new(session_id, session.state())
                        .with_message(Prompt::invoice_sent(amount));
                    reply.invoice = Some(invoice);
                    Ok(reply)
                }
                Err(error) => Ok(Reply::new(session_id, session.state())
                    .with_message(payment_failure(&error))),
            };
        }

        match next.state() {
            OrderState::Confirmed => self.finalize(session_id, session, next).await,
            OrderState::Cancelled => {
                *session = next;
                session.reset();
                if was_active {
                    metrics::counter!("orders_cancelled_total").increment(1);
                    tracing::info!("order cancelled");
                }
                Ok(Reply::new(session_id, session.state()).with_message(Prompt::cancelled()))
            }
            _ => {
                *session = next;
                Ok(Reply::new(session_id, session.state())
                    .with_message(Prompt::for_state(session, self.settings.developer_mode)))
            }
        }
    }

    /// Builds the record, notifies the operator and clears the session.
    ///
    /// A record that cannot be built leaves the session untouched.
    async fn finalize(
        &self,
        session_id: SessionId,
        session: &mut OrderSession,
        confirmed: OrderSession,
    ) -> Result<Reply> {
        let record = confirmed.finalize(OrderId::new())?;
        *session = confirmed;

        metrics::counter!("orders_confirmed_total").increment(1);
        metrics::histogram!("order_total_units").record(record.total().units() as f64);
        tracing::info!(
            order_id = %record.order_id,
            total = %record.total(),
            paid = record.payment_confirmed(),
            "order confirmed"
        );

        if let Err(error) = self.notifications.notify_operator(&record).await {
            metrics::counter!("notification_failures_total").increment(1);
            tracing::error!(order_id = %record.order_id, %error, "failed to notify operator");
        }

        session.reset();

        let mut reply =
            Reply::new(session_id, session.state()).with_message(Prompt::confirmation(&record));
        reply.order = Some(record);
        Ok(reply)
    }

    async fn test_payment(&self, reply: Reply, amount: Option<u32>) -> Reply {
        let Some(amount) = amount.filter(|a| *a > 0) else {
            return reply.with_message(Prompt::dev_payment_amounts());
        };
        let amount = Money::from_units(i64::from(amount));

        let request = InvoiceRequest {
            session_id: reply.session_id,
            purpose: PaymentPurpose::DevTest,
            title: "Test payment".to_string(),
            description: format!("Test payment of {amount}"),
            amount,
            currency: CURRENCY,
        };
        match self.initiate_payment(request).await {
            Ok(invoice) => {
                let mut reply = reply.with_message(Prompt::test_invoice_sent(amount));
                reply.invoice = Some(invoice);
                reply
            }
            Err(error) => reply.with_message(payment_failure(&error)),
        }
    }

    async fn initiate_payment(&self, request: InvoiceRequest) -> Result<Invoice> {
        let payment = self
            .payment
            .as_ref()
            .ok_or(CheckoutError::PaymentUnavailable)?;
        payment.initiate(request).await
    }

    fn reject(&self, session_id: SessionId, session: &OrderSession, error: &OrderError) -> Reply {
        metrics::counter!("input_rejected_total", "state" => session.state().as_str())
            .increment(1);
        tracing::debug!(state = %session.state(), %error, "input rejected");

        Reply::new(session_id, session.state()).with_message(Prompt::rejection(
            error,
            session,
            self.settings.developer_mode,
        ))
    }
}

fn payment_failure(error: &CheckoutError) -> Prompt {
    match error {
        CheckoutError::PaymentUnavailable => {
            tracing::warn!("online payment requested but no provider is configured");
            Prompt::payment_unavailable()
        }
        _ => {
            metrics::counter!("payment_initiation_failures_total").increment(1);
            tracing::warn!(%error, "payment initiation failed");
            Prompt::payment_failed()
        }
    }
}

fn prepayment_description(session: &OrderSession) -> String {
    match (session.cake_kind(), session.flavor()) {
        (Some(kind), Some(flavor)) => format!("50% prepayment: {}, {flavor}", kind.label()),
        _ => "50% prepayment for a cake order".to_string(),
    }
}
