//! The order flow as an explicit transition table.
//!
//! Each row maps a state and the input classes it accepts to a handler. The
//! handler validates the raw input and returns the event that stores the
//! value; [`next_state`] maps that event to the state it leads to. A handler
//! that rejects its input returns an error and no events, so the session is
//! left exactly as it was.

use chrono::NaiveDate;

use crate::catalog;
use crate::error::ValidationError;

use super::input::{self, InputClass, UserInput};
use super::{AttachmentRef, CakeKind, CakeSize, OrderError, OrderSession, OrderState, SessionEvent};

/// Minimum length of the recipient name, in characters.
pub const MIN_NAME_LEN: usize = 2;

/// Minimum length of a typed phone number, in characters.
pub const MIN_CONTACT_LEN: usize = 5;

/// Format customers type delivery dates in.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Ambient facts a handler may need besides the session and the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepContext {
    /// The current calendar date, for the delivery date check.
    pub today: NaiveDate,

    /// Whether debug-only transitions are allowed.
    pub developer_mode: bool,
}

impl StepContext {
    /// Creates a context for production use.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            developer_mode: false,
        }
    }

    /// Sets the developer mode flag.
    pub fn with_developer_mode(mut self, developer_mode: bool) -> Self {
        self.developer_mode = developer_mode;
        self
    }
}

type Handler =
    fn(&OrderSession, &UserInput, &StepContext) -> Result<Vec<SessionEvent>, OrderError>;

/// One row of the transition table.
pub struct Transition {
    /// The state this row handles.
    pub state: OrderState,

    /// Input classes the state understands; anything else re-prompts.
    pub accepts: &'static [InputClass],

    handler: Handler,
}

impl Transition {
    /// Returns true if the row accepts inputs of `class`.
    pub fn accepts(&self, class: InputClass) -> bool {
        self.accepts.contains(&class)
    }

    /// Validates `input` and returns the events it produces.
    pub(crate) fn decide(
        &self,
        session: &OrderSession,
        input: &UserInput,
        ctx: &StepContext,
    ) -> Result<Vec<SessionEvent>, OrderError> {
        if !self.accepts(input.class()) {
            return Err(self.wrong_class().into());
        }
        (self.handler)(session, input, ctx)
    }

    fn wrong_class(&self) -> ValidationError {
        if self.accepts(InputClass::Attachment) {
            ValidationError::PhotoOrSkipExpected
        } else if self.accepts(InputClass::Contact) {
            ValidationError::ContactTooShort
        } else {
            ValidationError::TextExpected
        }
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("state", &self.state)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

const TEXT: &[InputClass] = &[InputClass::Text];
const TEXT_OR_PHOTO: &[InputClass] = &[InputClass::Text, InputClass::Attachment];
const TEXT_OR_CONTACT: &[InputClass] = &[InputClass::Text, InputClass::Contact];

/// The full table: one row per state that waits for customer input.
pub static TRANSITIONS: [Transition; 14] = [
    Transition {
        state: OrderState::ChoosingCakeKind,
        accepts: TEXT,
        handler: choose_cake_kind,
    },
    Transition {
        state: OrderState::ChoosingFlavor,
        accepts: TEXT,
        handler: choose_flavor,
    },
    Transition {
        state: OrderState::ChoosingSize,
        accepts: TEXT,
        handler: choose_size,
    },
    Transition {
        state: OrderState::ChoosingCreamColor,
        accepts: TEXT,
        handler: choose_cream_color,
    },
    Transition {
        state: OrderState::ChoosingDecor,
        accepts: TEXT,
        handler: choose_decor,
    },
    Transition {
        state: OrderState::ChoosingCookiesOptIn,
        accepts: TEXT,
        handler: choose_cookies,
    },
    Transition {
        state: OrderState::ChoosingCookiesCount,
        accepts: TEXT,
        handler: enter_cookies_count,
    },
    Transition {
        state: OrderState::AwaitingCookiesPhoto,
        accepts: TEXT_OR_PHOTO,
        handler: provide_cookies_photo,
    },
    Transition {
        state: OrderState::AwaitingRecipientName,
        accepts: TEXT,
        handler: name_recipient,
    },
    Transition {
        state: OrderState::AwaitingDeliveryDate,
        accepts: TEXT,
        handler: set_delivery_date,
    },
    Transition {
        state: OrderState::AwaitingComment,
        accepts: TEXT,
        handler: add_comment,
    },
    Transition {
        state: OrderState::AwaitingReferencePhoto,
        accepts: TEXT_OR_PHOTO,
        handler: provide_reference_photo,
    },
    Transition {
        state: OrderState::AwaitingContact,
        accepts: TEXT_OR_CONTACT,
        handler: provide_contact,
    },
    Transition {
        state: OrderState::ChoosingPaymentMethod,
        accepts: TEXT,
        handler: choose_payment_method,
    },
];

/// The row for `state`, if the state waits for customer input.
pub fn transition_for(state: OrderState) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.state == state)
}

/// Where an applied event moves the session. `None` keeps the current state.
///
/// `kind` is the cake kind stored before the event is applied; it decides
/// the size-or-cream-color fork.
pub fn next_state(event: &SessionEvent, kind: Option<CakeKind>) -> Option<OrderState> {
    let next = match event {
        SessionEvent::OrderStarted(_) => OrderState::ChoosingCakeKind,
        SessionEvent::CakeKindChosen { .. } => OrderState::ChoosingFlavor,
        SessionEvent::FlavorChosen { .. } => match kind {
            Some(CakeKind::Bento) => OrderState::ChoosingCreamColor,
            _ => OrderState::ChoosingSize,
        },
        SessionEvent::SizeChosen { .. } | SessionEvent::CreamColorChosen { .. } => {
            OrderState::ChoosingDecor
        }
        SessionEvent::DecorChosen { .. } => OrderState::ChoosingCookiesOptIn,
        SessionEvent::CookiesAccepted => OrderState::ChoosingCookiesCount,
        SessionEvent::CookiesCountEntered { .. } => OrderState::AwaitingCookiesPhoto,
        SessionEvent::CookiesDeclined | SessionEvent::CookiesPhotoProvided { .. } => {
            OrderState::AwaitingRecipientName
        }
        SessionEvent::RecipientNamed { .. } => OrderState::AwaitingDeliveryDate,
        SessionEvent::DeliveryDateSet { .. } => OrderState::AwaitingComment,
        SessionEvent::CommentAdded { .. } => OrderState::AwaitingReferencePhoto,
        SessionEvent::ReferencePhotoProvided { .. } => OrderState::AwaitingContact,
        SessionEvent::ContactProvided { .. } => OrderState::ChoosingPaymentMethod,
        SessionEvent::PaymentRequested { .. } => return None,
        SessionEvent::PaymentConfirmed(_) => OrderState::Confirmed,
        SessionEvent::OrderCancelled { .. } => OrderState::Cancelled,
    };
    Some(next)
}

/// Parses a `DD.MM.YYYY` delivery date and rejects dates before `today`.
pub fn parse_delivery_date(text: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::UnparsableDate)?;
    if date < today {
        return Err(ValidationError::DateInPast);
    }
    Ok(date)
}

/// Parses a strictly positive cookie count.
pub fn parse_cookies_count(text: &str) -> Result<u32, ValidationError> {
    let count: i64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber)?;
    if count <= 0 {
        return Err(ValidationError::NonPositiveCount);
    }
    u32::try_from(count).map_err(|_| ValidationError::NotANumber)
}

fn text(input: &UserInput) -> &str {
    input.as_text().unwrap_or_default()
}

fn photo_or_skip(input: &UserInput) -> Result<Option<AttachmentRef>, ValidationError> {
    match input {
        UserInput::Attachment(photo) => Ok(Some(photo.clone())),
        _ if input.is_skip() => Ok(None),
        _ => Err(ValidationError::PhotoOrSkipExpected),
    }
}

fn stored_kind(session: &OrderSession) -> Result<CakeKind, OrderError> {
    session
        .cake_kind()
        .ok_or(OrderError::IncompleteOrder { field: "cake kind" })
}

fn choose_cake_kind(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let kind = CakeKind::from_label(text(input)).ok_or(ValidationError::UnknownCakeKind)?;
    Ok(vec![SessionEvent::CakeKindChosen { kind }])
}

fn choose_flavor(
    session: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let (flavor, _) = catalog::flavors_for(stored_kind(session)?)
        .resolve(text(input))
        .ok_or(ValidationError::UnknownFlavor)?;
    Ok(vec![SessionEvent::FlavorChosen {
        flavor: flavor.to_string(),
    }])
}

fn choose_size(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let size = CakeSize::from_label(text(input)).ok_or(ValidationError::UnknownSize)?;
    Ok(vec![SessionEvent::SizeChosen { size }])
}

fn choose_cream_color(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let color = text(input).trim();
    if color.is_empty() {
        return Err(ValidationError::EmptyCreamColor.into());
    }
    Ok(vec![SessionEvent::CreamColorChosen {
        color: color.to_string(),
    }])
}

fn choose_decor(
    session: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let (option, _) = catalog::decor_for(stored_kind(session)?)
        .resolve(text(input))
        .ok_or(ValidationError::UnknownDecor)?;
    Ok(vec![SessionEvent::DecorChosen {
        option: option.to_string(),
    }])
}

fn choose_cookies(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let answer = text(input).trim();
    if answer.eq_ignore_ascii_case(input::COOKIES_YES) {
        Ok(vec![SessionEvent::CookiesAccepted])
    } else if answer.eq_ignore_ascii_case(input::COOKIES_NO) {
        Ok(vec![SessionEvent::CookiesDeclined])
    } else {
        Err(ValidationError::UnknownCookiesChoice.into())
    }
}

fn enter_cookies_count(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let count = parse_cookies_count(text(input))?;
    Ok(vec![SessionEvent::CookiesCountEntered { count }])
}

fn provide_cookies_photo(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let photo = photo_or_skip(input)?;
    Ok(vec![SessionEvent::CookiesPhotoProvided { photo }])
}

fn name_recipient(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let name = text(input).trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort { min: MIN_NAME_LEN }.into());
    }
    Ok(vec![SessionEvent::RecipientNamed {
        name: name.to_string(),
    }])
}

fn set_delivery_date(
    _: &OrderSession,
    input: &UserInput,
    ctx: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let date = parse_delivery_date(text(input), ctx.today)?;
    Ok(vec![SessionEvent::DeliveryDateSet { date }])
}

fn add_comment(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let comment = text(input).trim();
    if comment.is_empty() {
        return Err(ValidationError::EmptyComment.into());
    }
    let comment = if comment.eq_ignore_ascii_case(input::NO_COMMENT_KEYWORD) {
        input::NO_COMMENT
    } else {
        comment
    };
    Ok(vec![SessionEvent::CommentAdded {
        comment: comment.to_string(),
    }])
}

fn provide_reference_photo(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let photo = photo_or_skip(input)?;
    Ok(vec![SessionEvent::ReferencePhotoProvided { photo }])
}

fn provide_contact(
    _: &OrderSession,
    input: &UserInput,
    _: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let contact = match input {
        // A shared contact card is trusted as-is.
        UserInput::Contact(phone) if !phone.trim().is_empty() => phone.trim(),
        UserInput::Text(typed) if typed.trim().chars().count() >= MIN_CONTACT_LEN => typed.trim(),
        _ => return Err(ValidationError::ContactTooShort.into()),
    };
    Ok(vec![SessionEvent::ContactProvided {
        contact: contact.to_string(),
    }])
}

fn choose_payment_method(
    session: &OrderSession,
    input: &UserInput,
    ctx: &StepContext,
) -> Result<Vec<SessionEvent>, OrderError> {
    let choice = text(input).trim();
    if choice.eq_ignore_ascii_case(input::PAY_ONLINE) {
        let quote = session.quote()?;
        Ok(vec![SessionEvent::PaymentRequested {
            amount: quote.prepayment,
        }])
    } else if choice.eq_ignore_ascii_case(input::SKIP_PAYMENT_DEV) {
        session.skip_payment(ctx)
    } else {
        Err(ValidationError::UnknownPaymentMethod.into())
    }
}
