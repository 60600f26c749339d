//! Inbound customer input.

use serde::{Deserialize, Serialize};

use super::AttachmentRef;

/// Quick-reply label that cancels the order from any step.
pub const CANCEL_ORDER: &str = "Cancel order";

/// Keyword that skips an optional photo.
pub const SKIP: &str = "skip";

/// Keyword meaning "no comment" at the comment step.
pub const NO_COMMENT_KEYWORD: &str = "no";

/// Stored in place of a comment when the customer has none.
pub const NO_COMMENT: &str = "No comment";

/// Cookies opt-in quick reply.
pub const COOKIES_YES: &str = "Yes, add cookies";

/// Cookies opt-out quick reply.
pub const COOKIES_NO: &str = "No, continue without cookies";

/// Online payment quick reply.
pub const PAY_ONLINE: &str = "Pay online (50% prepayment)";

/// Developer-mode quick reply that settles the order without paying.
pub const SKIP_PAYMENT_DEV: &str = "Skip payment (dev)";

/// Quick reply that shares the customer's phone number.
pub const SHARE_CONTACT: &str = "Share contact";

/// One input event delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UserInput {
    /// Free text or a tapped quick reply.
    Text(String),

    /// An attachment (photo) the transport stores on our behalf.
    Attachment(AttachmentRef),

    /// A structured contact card; the payload is the phone number.
    Contact(String),
}

/// Coarse kind of an input, used as the second key of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputClass {
    Text,
    Attachment,
    Contact,
}

impl UserInput {
    /// Convenience constructor for text input.
    pub fn text(text: impl Into<String>) -> Self {
        UserInput::Text(text.into())
    }

    /// Convenience constructor for an attachment.
    pub fn attachment(id: impl Into<AttachmentRef>) -> Self {
        UserInput::Attachment(id.into())
    }

    /// Convenience constructor for a shared contact.
    pub fn contact(phone: impl Into<String>) -> Self {
        UserInput::Contact(phone.into())
    }

    /// The input's class.
    pub fn class(&self) -> InputClass {
        match self {
            UserInput::Text(_) => InputClass::Text,
            UserInput::Attachment(_) => InputClass::Attachment,
            UserInput::Contact(_) => InputClass::Contact,
        }
    }

    /// The text payload, if this is text input.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UserInput::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true for the cancel quick reply or the `/cancel` command.
    pub fn is_cancel(&self) -> bool {
        self.as_text().is_some_and(|text| {
            let text = text.trim();
            text.eq_ignore_ascii_case(CANCEL_ORDER)
                || text.eq_ignore_ascii_case("/cancel")
                || text.to_ascii_lowercase().starts_with("/cancel@")
        })
    }

    /// Returns true for the skip keyword, in any letter case.
    pub fn is_skip(&self) -> bool {
        self.as_text()
            .is_some_and(|text| text.trim().eq_ignore_ascii_case(SKIP))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        assert_eq!(UserInput::text("hi").class(), InputClass::Text);
        assert_eq!(UserInput::attachment("file-1").class(), InputClass::Attachment);
        assert_eq!(UserInput::contact("+79990000000").class(), InputClass::Contact);
    }

    #[test]
    fn test_cancel_detection() {
        assert!(UserInput::text("Cancel order").is_cancel());
        assert!(UserInput::text(" cancel ORDER ").is_cancel());
        assert!(UserInput::text("/cancel").is_cancel());
        assert!(UserInput::text("/cancel@CakeBot").is_cancel());
        assert!(!UserInput::text("cancel").is_cancel());
        assert!(!UserInput::attachment("Cancel order").is_cancel());
    }

    #[test]
    fn test_skip_detection() {
        assert!(UserInput::text("skip").is_skip());
        assert!(UserInput::text("SKIP").is_skip());
        assert!(UserInput::text(" Skip ").is_skip());
        assert!(!UserInput::text("skipping").is_skip());
        assert!(!UserInput::attachment("skip").is_skip());
    }

    #[test]
    fn test_serialization_shape() {
        let input = UserInput::attachment("photo-42");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["type"], "attachment");
        assert_eq!(json["value"], "photo-42");

        let parsed: UserInput =
            serde_json::from_str(r#"{"type":"text","value":"Snickers"}"#).unwrap();
        assert_eq!(parsed, UserInput::text("Snickers"));
    }
}
