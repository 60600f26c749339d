//! Order session state machine cursor.

use serde::{Deserialize, Serialize};

/// Where a conversation currently is in the order flow.
///
/// State transitions:
/// ```text
/// Idle ──► ChoosingCakeKind ──► ChoosingFlavor ──┬──► ChoosingSize ───────┬──► ChoosingDecor
///                                                └──► ChoosingCreamColor ─┘         │
///                                                                                    ▼
///          ┌──────────────────────────── ChoosingCookiesOptIn ◄───────────────────────┘
///          │ yes                                  │ no
///          ▼                                      │
/// ChoosingCookiesCount ──► AwaitingCookiesPhoto ──┴──► AwaitingRecipientName
///     ──► AwaitingDeliveryDate ──► AwaitingComment ──► AwaitingReferencePhoto
///     ──► AwaitingContact ──► ChoosingPaymentMethod ──► Confirmed
///
/// every non-terminal state ──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderState {
    /// No order in progress.
    #[default]
    Idle,

    ChoosingCakeKind,
    ChoosingFlavor,

    /// Regular cakes only.
    ChoosingSize,

    /// Bento cakes only.
    ChoosingCreamColor,

    ChoosingDecor,
    ChoosingCookiesOptIn,
    ChoosingCookiesCount,
    AwaitingCookiesPhoto,
    AwaitingRecipientName,
    AwaitingDeliveryDate,
    AwaitingComment,
    AwaitingReferencePhoto,
    AwaitingContact,

    /// Waiting for the customer to pay, or for the provider to report payment.
    ChoosingPaymentMethod,

    /// Prepayment settled; the order record is ready (terminal state).
    Confirmed,

    /// The customer abandoned the order (terminal state).
    Cancelled,
}

impl OrderState {
    /// Every state in flow order.
    pub const ALL: [OrderState; 17] = [
        OrderState::Idle,
        OrderState::ChoosingCakeKind,
        OrderState::ChoosingFlavor,
        OrderState::ChoosingSize,
        OrderState::ChoosingCreamColor,
        OrderState::ChoosingDecor,
        OrderState::ChoosingCookiesOptIn,
        OrderState::ChoosingCookiesCount,
        OrderState::AwaitingCookiesPhoto,
        OrderState::AwaitingRecipientName,
        OrderState::AwaitingDeliveryDate,
        OrderState::AwaitingComment,
        OrderState::AwaitingReferencePhoto,
        OrderState::AwaitingContact,
        OrderState::ChoosingPaymentMethod,
        OrderState::Confirmed,
        OrderState::Cancelled,
    ];

    /// Position in the flow. Size and cream color share a position since a
    /// session visits exactly one of them.
    pub fn position(&self) -> u8 {
        match self {
            OrderState::Idle => 0,
            OrderState::ChoosingCakeKind => 1,
            OrderState::ChoosingFlavor => 2,
            OrderState::ChoosingSize | OrderState::ChoosingCreamColor => 3,
            OrderState::ChoosingDecor => 4,
            OrderState::ChoosingCookiesOptIn => 5,
            OrderState::ChoosingCookiesCount => 6,
            OrderState::AwaitingCookiesPhoto => 7,
            OrderState::AwaitingRecipientName => 8,
            OrderState::AwaitingDeliveryDate => 9,
            OrderState::AwaitingComment => 10,
            OrderState::AwaitingReferencePhoto => 11,
            OrderState::AwaitingContact => 12,
            OrderState::ChoosingPaymentMethod => 13,
            OrderState::Confirmed | OrderState::Cancelled => 14,
        }
    }

    /// Returns true while an order is being collected.
    pub fn is_collecting(&self) -> bool {
        !matches!(
            self,
            OrderState::Idle | OrderState::Confirmed | OrderState::Cancelled
        )
    }

    /// Returns true if the order can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if a payment may settle the order in this state.
    pub fn can_confirm_payment(&self) -> bool {
        matches!(self, OrderState::ChoosingPaymentMethod)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Confirmed | OrderState::Cancelled)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Idle => "Idle",
            OrderState::ChoosingCakeKind => "ChoosingCakeKind",
            OrderState::ChoosingFlavor => "ChoosingFlavor",
            OrderState::ChoosingSize => "ChoosingSize",
            OrderState::ChoosingCreamColor => "ChoosingCreamColor",
            OrderState::ChoosingDecor => "ChoosingDecor",
            OrderState::ChoosingCookiesOptIn => "ChoosingCookiesOptIn",
            OrderState::ChoosingCookiesCount => "ChoosingCookiesCount",
            OrderState::AwaitingCookiesPhoto => "AwaitingCookiesPhoto",
            OrderState::AwaitingRecipientName => "AwaitingRecipientName",
            OrderState::AwaitingDeliveryDate => "AwaitingDeliveryDate",
            OrderState::AwaitingComment => "AwaitingComment",
            OrderState::AwaitingReferencePhoto => "AwaitingReferencePhoto",
            OrderState::AwaitingContact => "AwaitingContact",
            OrderState::ChoosingPaymentMethod => "ChoosingPaymentMethod",
            OrderState::Confirmed => "Confirmed",
            OrderState::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
