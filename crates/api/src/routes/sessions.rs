//! Conversation endpoints: the transport posts customer input here.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{
    CheckoutCoordinator, InMemoryNotificationService, InMemoryPaymentService, Inbound, Reply,
};
use domain::order::transitions::DATE_FORMAT;
use domain::{Aggregate, CakeKind, OrderState, PriceBreakdown, Prompt, UserInput};
use serde::{Deserialize, Serialize};

use super::parse_session_id;
use crate::error::ApiError;

/// Coordinator wired to the in-process collaborators.
pub type Coordinator = CheckoutCoordinator<InMemoryPaymentService, InMemoryNotificationService>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub coordinator: Coordinator,
    /// Handle on the payment provider, absent when online payment is off.
    pub payment: Option<InMemoryPaymentService>,
    pub notifications: InMemoryNotificationService,
}

// -- Request types --

#[derive(Deserialize)]
pub struct MessageRequest {
    /// Transport handle of the customer, e.g. `@alice`.
    pub sender: Option<String>,
    pub input: UserInput,
}

// -- Response types --

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub state: OrderState,
    pub revision: u64,
    pub cake_kind: Option<CakeKind>,
    pub flavor: Option<String>,
    pub size_kg: Option<u32>,
    pub cream_color: Option<String>,
    pub decor_option: Option<String>,
    pub cookies_count: u32,
    pub recipient_name: Option<String>,
    pub delivery_date: Option<String>,
    pub comment: Option<String>,
    pub contact: Option<String>,
    pub pending_prepayment_minor: Option<i64>,
    /// Present once the order has enough fields to be priced.
    pub quote: Option<PriceBreakdown>,
    /// The question the customer is expected to answer next.
    pub prompt: Prompt,
}

// -- Handlers --

/// POST /sessions/:id/messages: Deliver one customer input.
#[tracing::instrument(skip(state, req))]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<Reply>, ApiError> {
    let session_id = parse_session_id(&id)?;

    let mut inbound = Inbound::new(session_id, req.input);
    if let Some(sender) = req.sender {
        inbound = inbound.from_sender(sender);
    }

    let reply = state.coordinator.handle(inbound).await?;
    Ok(Json(reply))
}

/// GET /sessions/:id: Snapshot of a conversation's order.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let session = state
        .coordinator
        .session(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;

    let developer_mode = state.coordinator.settings().developer_mode;

    Ok(Json(SessionResponse {
        session_id: session_id.to_string(),
        state: session.state(),
        revision: session.revision(),
        cake_kind: session.cake_kind(),
        flavor: session.flavor().map(String::from),
        size_kg: session.size().map(|size| size.kg()),
        cream_color: session.cream_color().map(String::from),
        decor_option: session.decor_option().map(String::from),
        cookies_count: session.cookies_count(),
        recipient_name: session.recipient_name().map(String::from),
        delivery_date: session
            .delivery_date()
            .map(|date| date.format(DATE_FORMAT).to_string()),
        comment: session.comment().map(String::from),
        contact: session.contact().map(String::from),
        pending_prepayment_minor: session.pending_prepayment().map(|m| m.minor_units()),
        quote: session.quote().ok(),
        prompt: Prompt::for_state(&session, developer_mode),
    }))
}
