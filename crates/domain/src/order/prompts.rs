//! Customer-facing messages for every step of the flow.
//!
//! Prompts are plain data: text plus the quick replies to offer. Rendering
//! them as buttons or anything else is up to the transport.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, COOKIE_PRICE, CREAM_SURCHARGE};
use crate::command::{BotCommand, DEV_TEST_AMOUNTS};

use super::input::{
    CANCEL_ORDER, COOKIES_NO, COOKIES_YES, NO_COMMENT_KEYWORD, PAY_ONLINE, SHARE_CONTACT, SKIP,
    SKIP_PAYMENT_DEV,
};
use super::{CakeKind, CakeSize, OrderError, OrderRecord, OrderSession, OrderState};

/// A suggested answer offered with a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum QuickReply {
    /// Sends the label back as text.
    Text(String),
    /// Asks the client to share the customer's phone number.
    ShareContact(String),
}

impl QuickReply {
    pub fn label(&self) -> &str {
        match self {
            QuickReply::Text(label) | QuickReply::ShareContact(label) => label,
        }
    }
}

/// A message to show the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    #[serde(default)]
    pub quick_replies: Vec<QuickReply>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    pub fn with_reply(mut self, label: impl Into<String>) -> Self {
        self.quick_replies.push(QuickReply::Text(label.into()));
        self
    }

    pub fn with_replies<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quick_replies
            .extend(labels.into_iter().map(|l| QuickReply::Text(l.into())));
        self
    }

    pub fn with_contact_request(mut self) -> Self {
        self.quick_replies
            .push(QuickReply::ShareContact(SHARE_CONTACT.to_string()));
        self
    }

    fn with_cancel(self) -> Self {
        self.with_reply(CANCEL_ORDER)
    }

    /// Labels of all quick replies, in order.
    pub fn reply_labels(&self) -> Vec<&str> {
        self.quick_replies.iter().map(QuickReply::label).collect()
    }

    /// The question for the session's current step.
    pub fn for_state(session: &OrderSession, developer_mode: bool) -> Prompt {
        let kind = session.cake_kind().unwrap_or(CakeKind::Regular);
        match session.state() {
            OrderState::Idle => Prompt::no_active_order(),
            OrderState::ChoosingCakeKind => Prompt::new("Choose the cake type:")
                .with_replies(CakeKind::ALL.iter().map(CakeKind::label))
                .with_cancel(),
            OrderState::ChoosingFlavor => Prompt::new("Choose the filling flavor:")
                .with_replies(catalog::flavors_for(kind).keys())
                .with_cancel(),
            OrderState::ChoosingSize => Prompt::new("Choose the cake size:")
                .with_replies(CakeSize::all().map(|s| s.label()))
                .with_cancel(),
            OrderState::ChoosingCreamColor => Prompt::new(format!(
                "Describe the cream color you would like (for example: pink, blue, pistachio).\n\n\
                 Any color other than white adds +{CREAM_SURCHARGE}. Write 'white' for the standard cream."
            ))
            .with_cancel(),
            OrderState::ChoosingDecor => {
                let decor = catalog::decor_for(kind);
                let mut text = String::from("Choose a decoration option:\n");
                for &(option, price) in decor.entries() {
                    if price.is_positive() {
                        text.push_str(&format!("\n{option}: +{price}"));
                    } else {
                        text.push_str(&format!("\n{option}"));
                    }
                }
                Prompt::new(text).with_replies(decor.keys()).with_cancel()
            }
            OrderState::ChoosingCookiesOptIn => Prompt::new(format!(
                "Would you like to add decorated cookies to the order? ({COOKIE_PRICE} per piece)"
            ))
            .with_replies([COOKIES_YES, COOKIES_NO])
            .with_cancel(),
            OrderState::ChoosingCookiesCount => {
                Prompt::new("How many cookies would you like?").with_cancel()
            }
            OrderState::AwaitingCookiesPhoto => Prompt::new(
                "Send a reference photo for the cookies if you have one, or write 'skip'.",
            )
            .with_reply(SKIP)
            .with_cancel(),
            OrderState::AwaitingRecipientName => {
                Prompt::new("Who is the order for? Write the recipient's name.").with_cancel()
            }
            OrderState::AwaitingDeliveryDate => Prompt::new(
                "What date do you need the cake for? (DD.MM.YYYY)\n\nFor example: 15.08.2026",
            )
            .with_cancel(),
            OrderState::AwaitingComment => Prompt::new(
                "Add a comment to the order if needed.\n\nIf you have none, write 'no'.",
            )
            .with_reply(NO_COMMENT_KEYWORD)
            .with_cancel(),
            OrderState::AwaitingReferencePhoto => Prompt::new(
                "Send a reference photo for the cake if you have one, or write 'skip'.",
            )
            .with_reply(SKIP)
            .with_cancel(),
            OrderState::AwaitingContact => Prompt::new("Enter your phone number:")
                .with_contact_request()
                .with_cancel(),
            OrderState::ChoosingPaymentMethod => {
                let text = match session.quote() {
                    Ok(quote) => format!(
                        "Order total: about {}.\n\
                         A 50% prepayment of {} is required to confirm the order.\n\n\
                         Choose a payment method:",
                        quote.total, quote.prepayment
                    ),
                    Err(_) => "Choose a payment method:".to_string(),
                };
                let mut prompt = Prompt::new(text).with_reply(PAY_ONLINE);
                if developer_mode {
                    prompt = prompt.with_reply(SKIP_PAYMENT_DEV);
                }
                prompt.with_cancel()
            }
            OrderState::Confirmed => Prompt::new("Your order is confirmed."),
            OrderState::Cancelled => Prompt::cancelled(),
        }
    }

    /// Corrective message for a rejected input; repeats the step's replies.
    pub fn rejection(error: &OrderError, session: &OrderSession, developer_mode: bool) -> Prompt {
        match error {
            OrderError::NoActiveOrder => Prompt::no_active_order(),
            OrderError::Unauthorized { .. } => Prompt::unauthorized(),
            _ => {
                let step = Prompt::for_state(session, developer_mode);
                Prompt {
                    text: error.to_string(),
                    quick_replies: step.quick_replies,
                }
            }
        }
    }

    pub fn greeting(developer_mode: bool) -> Prompt {
        let mut text = String::from(
            "Hello! I'm the bakery assistant.\n\nI can help you order a cake or a bento cake \
             with delivery.\n\nSend /order to start.",
        );
        if developer_mode {
            text.push_str("\n\nDeveloper mode is on: /dev_skip and /dev_paytest are available.");
        }
        Prompt::new(text).with_replies(["/order", "/prices", "/help"])
    }

    pub fn help(developer_mode: bool) -> Prompt {
        let mut text = String::from("Available commands:\n");
        for command in BotCommand::menu(developer_mode) {
            text.push_str(&format!("\n/{} - {}", command.name(), command.description()));
        }
        text.push_str(
            "\n\nHow to order:\n1. Send /order\n2. Answer the questions\n\
             3. Pay the 50% prepayment\n4. Wait for the confirmation",
        );
        Prompt::new(text)
    }

    /// The full catalog with prices.
    pub fn price_list() -> Prompt {
        let mut text = String::from("PRICES\n\nRegular cakes (per kg):");
        for &(flavor, price) in catalog::REGULAR_FLAVORS.entries() {
            text.push_str(&format!("\n  {flavor}: {price}/kg"));
        }
        text.push_str(&format!(
            "\n  Sizes: {} to {} kg",
            CakeSize::MIN_KG,
            CakeSize::MAX_KG
        ));
        text.push_str("\n\nBento cakes:");
        for &(flavor, price) in catalog::BENTO_FLAVORS.entries() {
            text.push_str(&format!("\n  {flavor}: {price}"));
        }
        text.push_str(&format!("\n  Colored cream: +{CREAM_SURCHARGE}"));
        for (title, decor) in [
            ("Decoration, regular cakes:", &catalog::REGULAR_DECOR),
            ("Decoration, bento cakes:", &catalog::BENTO_DECOR),
        ] {
            text.push_str(&format!("\n\n{title}"));
            for &(option, price) in decor.entries() {
                text.push_str(&format!("\n  {option}: +{price}"));
            }
        }
        text.push_str(&format!("\n\nDecorated cookies: {COOKIE_PRICE} per piece"));
        text.push_str("\n\nA 50% prepayment is required to confirm an order.");
        Prompt::new(text).with_reply("/order")
    }

    /// Shown ahead of the greeting.
    pub fn handmade_disclaimer() -> Prompt {
        Prompt::new(
            "All our cakes are handmade, so the finished cake may differ slightly \
             from the reference photo.",
        )
    }

    /// Shown before the first question of a new order.
    pub fn order_disclaimer() -> Prompt {
        Prompt::new(
            "All prices shown are approximate. The final price depends on the design \
             and will be confirmed by our confectioner.",
        )
    }

    pub fn cancelled() -> Prompt {
        Prompt::new("Order cancelled. Send /order to start again.").with_reply("/order")
    }

    pub fn no_active_order() -> Prompt {
        Prompt::new("There is no order in progress. Send /order to start one.")
            .with_replies(["/order", "/prices", "/help"])
    }

    pub fn unauthorized() -> Prompt {
        Prompt::new("This command is only available in developer mode.")
    }

    /// Sent once an invoice has been issued.
    pub fn invoice_sent(amount: super::Money) -> Prompt {
        Prompt::new(format!(
            "An invoice for {amount} has been sent. The order is confirmed as soon as the \
             payment goes through."
        ))
        .with_cancel()
    }

    /// Online payment is not configured.
    pub fn payment_unavailable() -> Prompt {
        Prompt::new("Online payment is temporarily unavailable. Please try again later.")
            .with_cancel()
    }

    /// The provider refused to start the payment.
    pub fn payment_failed() -> Prompt {
        Prompt::new("Could not create the payment. Please try again in a moment.")
            .with_reply(PAY_ONLINE)
            .with_cancel()
    }

    pub fn test_invoice_sent(amount: super::Money) -> Prompt {
        Prompt::new(format!("Test invoice for {amount} sent."))
    }

    /// A developer-mode test payment went through.
    pub fn test_payment_received(amount: super::Money) -> Prompt {
        Prompt::new(format!("Test payment of {amount} received."))
    }

    /// Asks which synthetic amount to charge.
    pub fn dev_payment_amounts() -> Prompt {
        Prompt::new("Test payment. Choose an amount:").with_replies(
            DEV_TEST_AMOUNTS
                .iter()
                .map(|amount| format!("/dev_paytest {amount}")),
        )
    }

    pub fn payment_step_only() -> Prompt {
        Prompt::new("This command only works at the payment step.")
    }

    /// Summary shown to the customer once the order is accepted.
    pub fn confirmation(record: &OrderRecord) -> Prompt {
        let mut text = String::from("Your order has been accepted!\n\nDetails:");
        text.push_str(&format!("\nType: {}", record.cake_kind.label()));
        text.push_str(&format!("\nRecipient: {}", record.recipient_name));
        text.push_str(&format!("\nDate: {}", record.delivery_date_label()));
        text.push_str(&format!("\nFlavor: {}", record.flavor));
        if let Some(size) = record.size {
            text.push_str(&format!("\nSize: {size}"));
        }
        if let Some(color) = &record.cream_color {
            text.push_str(&format!("\nCream color: {color}"));
        }
        text.push_str(&format!("\nDecoration: {}", record.decor_option));
        if record.cookies_count > 0 {
            text.push_str(&format!("\nCookies: {} pcs", record.cookies_count));
        }
        text.push_str(&format!("\nTotal: about {}", record.total()));
        if record.payment_confirmed() {
            text.push_str(&format!("\nPrepayment received: {}", record.price.prepayment));
        } else {
            text.push_str("\nPayment: not made");
        }
        text.push_str(
            "\n\nOur confectioner will contact you to confirm the details.\nThank you for your order!",
        );
        Prompt::new(text).with_reply("/order")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::aggregate::Aggregate;
    use crate::order::{StepContext, UserInput};

    fn session_at(texts: &[&str]) -> OrderSession {
        let ctx = StepContext::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let mut session = OrderSession::default();
        session.apply_events(session.start(None).unwrap());
        for text in texts {
            let events = session.handle_input(&UserInput::text(*text), &ctx).unwrap();
            session.apply_events(events);
        }
        session
    }

    #[test]
    fn test_every_collecting_prompt_offers_cancel() {
        let steps = [
            "Regular cake",
            "Carrot",
            "1 kg",
            "No decoration",
            COOKIES_YES,
            "2",
            "skip",
            "Anna",
            "20.10.2026",
            "no",
            "skip",
            "+79991234567",
        ];
        for len in 0..=steps.len() {
            let session = session_at(&steps[..len]);
            assert!(session.is_active());
            let prompt = Prompt::for_state(&session, false);
            assert!(
                prompt.reply_labels().contains(&CANCEL_ORDER),
                "{}",
                session.state()
            );
        }

        let cream = session_at(&["Bento cake (400-450 g)", "Snickers"]);
        assert_eq!(cream.state(), OrderState::ChoosingCreamColor);
        assert!(Prompt::for_state(&cream, false)
            .reply_labels()
            .contains(&CANCEL_ORDER));
    }

    #[test]
    fn test_flavor_replies_follow_kind() {
        let bento = session_at(&["Bento cake (400-450 g)"]);
        let prompt = Prompt::for_state(&bento, false);
        assert!(prompt.reply_labels().contains(&"Snickers"));
        assert!(!prompt.reply_labels().contains(&"Choco-Banana"));
    }

    #[test]
    fn test_size_replies_cover_range() {
        let session = session_at(&["Regular cake", "Carrot"]);
        let prompt = Prompt::for_state(&session, false);
        let labels = prompt.reply_labels();

        assert_eq!(labels.first(), Some(&"1 kg"));
        assert!(labels.contains(&"15 kg"));
    }

    #[test]
    fn test_contact_prompt_requests_contact() {
        let session = session_at(&[
            "Regular cake",
            "Carrot",
            "1 kg",
            "No decoration",
            COOKIES_NO,
            "Anna",
            "20.10.2026",
            "no",
            "skip",
        ]);
        let prompt = Prompt::for_state(&session, false);

        assert_eq!(
            prompt.quick_replies.first(),
            Some(&QuickReply::ShareContact(SHARE_CONTACT.to_string()))
        );
    }

    #[test]
    fn test_payment_prompt_shows_quote_and_dev_option() {
        let session = session_at(&[
            "Regular cake",
            "Carrot",
            "2 kg",
            "Paper print",
            COOKIES_NO,
            "Anna",
            "20.10.2026",
            "no",
            "skip",
            "+79991234567",
        ]);

        let prompt = Prompt::for_state(&session, false);
        assert!(prompt.text.contains("4970₽"));
        assert!(prompt.text.contains("2485₽"));
        assert!(!prompt.reply_labels().contains(&SKIP_PAYMENT_DEV));

        let dev = Prompt::for_state(&session, true);
        assert!(dev.reply_labels().contains(&SKIP_PAYMENT_DEV));
    }

    #[test]
    fn test_rejection_repeats_step_replies() {
        let session = session_at(&[]);
        let error = OrderError::Validation(crate::error::ValidationError::UnknownCakeKind);
        let prompt = Prompt::rejection(&error, &session, false);

        assert_eq!(prompt.text, error.to_string());
        assert_eq!(
            prompt.quick_replies,
            Prompt::for_state(&session, false).quick_replies
        );
    }

    #[test]
    fn test_price_list_mentions_every_catalog_entry() {
        let text = Prompt::price_list().text;
        for catalog in [
            &catalog::REGULAR_FLAVORS,
            &catalog::BENTO_FLAVORS,
            &catalog::REGULAR_DECOR,
            &catalog::BENTO_DECOR,
        ] {
            for key in catalog.keys() {
                assert!(text.contains(key), "{key} missing");
            }
        }
    }

    #[test]
    fn test_help_lists_dev_commands_only_in_dev_mode() {
        assert!(!Prompt::help(false).text.contains("/dev_skip"));
        assert!(Prompt::help(true).text.contains("/dev_skip"));
    }
}
