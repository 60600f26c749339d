//! Input validation errors.
//!
//! Each variant is one failed predicate of the order flow. The `Display`
//! text is what the customer sees as the corrective re-prompt.

use thiserror::Error;

/// A customer input that failed the current step's predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose a cake type from the options")]
    UnknownCakeKind,

    #[error("Please choose a flavor from the options")]
    UnknownFlavor,

    #[error("Please choose a size from the options")]
    UnknownSize,

    #[error("Please describe the cream color, for example: pink, blue or white")]
    EmptyCreamColor,

    #[error("Please choose a decoration option from the options")]
    UnknownDecor,

    #[error("Please choose one of the options")]
    UnknownCookiesChoice,

    #[error("Please enter a number")]
    NotANumber,

    #[error("The quantity must be greater than 0")]
    NonPositiveCount,

    #[error("Please enter the recipient's name (at least {min} characters)")]
    NameTooShort { min: usize },

    #[error("Please enter the date in DD.MM.YYYY format")]
    UnparsableDate,

    #[error("The date cannot be in the past. Please enter a valid date")]
    DateInPast,

    #[error("Please write a comment, or 'no' if you have none")]
    EmptyComment,

    #[error("Please send a photo or write 'skip'")]
    PhotoOrSkipExpected,

    #[error("Please enter a valid phone number")]
    ContactTooShort,

    #[error("Please choose a payment option from the options")]
    UnknownPaymentMethod,

    #[error("Please reply with text")]
    TextExpected,
}
