//! The immutable record of a confirmed order.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::pricing::PriceBreakdown;

use super::transitions::DATE_FORMAT;
use super::{AttachmentRef, CakeKind, CakeSize, Money, PaymentMethod};

/// Everything the bakery needs to make and deliver one order.
///
/// Produced once per confirmed session and handed to the operator
/// notification channel. The `Display` impl renders the operator summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub customer_handle: Option<String>,
    pub cake_kind: CakeKind,
    pub flavor: String,
    pub size: Option<CakeSize>,
    pub cream_color: Option<String>,
    pub decor_option: String,
    pub cookies_count: u32,
    pub cookies_photo: Option<AttachmentRef>,
    pub recipient_name: String,
    pub delivery_date: NaiveDate,
    pub comment: String,
    pub reference_photo: Option<AttachmentRef>,
    pub contact: String,
    pub payment: PaymentMethod,
    pub price: PriceBreakdown,
    pub confirmed_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Final total of the order.
    pub fn total(&self) -> Money {
        self.price.total
    }

    /// Returns true if the prepayment was actually received.
    pub fn payment_confirmed(&self) -> bool {
        self.payment.is_paid()
    }

    /// Delivery date in the customer-facing `DD.MM.YYYY` format.
    pub fn delivery_date_label(&self) -> String {
        self.delivery_date.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind_tag = match self.cake_kind {
            CakeKind::Regular => "CAKE",
            CakeKind::Bento => "BENTO CAKE",
        };
        writeln!(f, "NEW {kind_tag} ORDER #{}", self.order_id.short())?;
        writeln!(
            f,
            "Customer: {}",
            self.customer_handle.as_deref().unwrap_or("not specified")
        )?;
        writeln!(f, "Phone: {}", self.contact)?;
        writeln!(f, "Payment: {}", self.payment)?;
        writeln!(f)?;

        writeln!(f, "Type: {}", self.cake_kind.label())?;
        writeln!(f, "Flavor: {}", self.flavor)?;
        if let Some(size) = self.size {
            writeln!(f, "Size: {size}")?;
        }
        if let Some(color) = &self.cream_color {
            if self.price.cream.is_positive() {
                writeln!(f, "Cream color: {color} (+{})", self.price.cream)?;
            } else {
                writeln!(f, "Cream color: {color}")?;
            }
        }
        writeln!(f, "Decoration: {}", self.decor_option)?;
        if self.cookies_count > 0 {
            writeln!(
                f,
                "Cookies: {} pcs ({})",
                self.cookies_count, self.price.cookies
            )?;
        }
        writeln!(f, "Recipient: {}", self.recipient_name)?;
        writeln!(f, "Date: {}", self.delivery_date_label())?;
        writeln!(
            f,
            "Total: {} (prepayment {})",
            self.price.total, self.price.prepayment
        )?;
        writeln!(f)?;
        writeln!(f, "Comment:")?;
        writeln!(f, "{}", self.comment)?;
        writeln!(f)?;
        write!(f, "#order #{}", self.cake_kind.as_str())
    }
}
