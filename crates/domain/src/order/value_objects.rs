//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

/// Number of minor units (kopecks) in one currency unit.
pub const MINOR_PER_UNIT: i64 = 100;

/// Money amount represented in minor units to avoid floating point issues.
///
/// Catalog prices are whole roubles; the minor part only matters to payment
/// providers, which expect amounts in kopecks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (e.g., 123_400 = 1234₽)
    minor: i64,
}

impl Money {
    /// Creates a new Money amount from minor units.
    pub const fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Creates a new Money amount from whole currency units.
    pub const fn from_units(units: i64) -> Self {
        Self {
            minor: units * MINOR_PER_UNIT,
        }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { minor: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor_units(&self) -> i64 {
        self.minor
    }

    /// Returns the whole-unit portion, rounded towards negative infinity.
    pub fn units(&self) -> i64 {
        self.minor.div_euclid(MINOR_PER_UNIT)
    }

    /// Returns the minor portion (remainder after whole units).
    pub fn minor_part(&self) -> i64 {
        self.minor.rem_euclid(MINOR_PER_UNIT)
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            minor: self.minor * i64::from(quantity),
        }
    }

    /// Drops the minor part: floor to whole currency units.
    pub fn truncate(&self) -> Money {
        Money::from_units(self.units())
    }

    /// Half of the amount, floored to whole currency units.
    pub fn half_truncated(&self) -> Money {
        Money::from_units(self.units().div_euclid(2))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor_part() == 0 {
            write!(f, "{}₽", self.units())
        } else {
            write!(f, "{}.{:02}₽", self.units(), self.minor_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            minor: self.minor + rhs.minor,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.minor += rhs.minor;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// The two cake products the bakery sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CakeKind {
    /// Full-size cake priced per kilogram.
    Regular,

    /// Small 400-450 g cake sold at a flat price.
    Bento,
}

impl CakeKind {
    /// All kinds in display order.
    pub const ALL: [CakeKind; 2] = [CakeKind::Regular, CakeKind::Bento];

    /// The quick-reply label a customer picks.
    pub fn label(&self) -> &'static str {
        match self {
            CakeKind::Regular => "Regular cake",
            CakeKind::Bento => "Bento cake (400-450 g)",
        }
    }

    /// Resolves a quick-reply label back to a kind.
    pub fn from_label(text: &str) -> Option<CakeKind> {
        let text = text.trim();
        Self::ALL.into_iter().find(|kind| kind.label() == text)
    }

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CakeKind::Regular => "regular",
            CakeKind::Bento => "bento",
        }
    }
}

impl std::fmt::Display for CakeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weight of a regular cake in whole kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CakeSize(u32);

impl CakeSize {
    /// Smallest size on the menu.
    pub const MIN_KG: u32 = 1;

    /// Largest size on the menu.
    pub const MAX_KG: u32 = 15;

    /// Creates a size if it is on the menu.
    pub fn new(kg: u32) -> Option<CakeSize> {
        (Self::MIN_KG..=Self::MAX_KG).contains(&kg).then_some(CakeSize(kg))
    }

    /// Every size on the menu, smallest first.
    pub fn all() -> impl Iterator<Item = CakeSize> {
        (Self::MIN_KG..=Self::MAX_KG).map(CakeSize)
    }

    /// Weight in kilograms.
    pub fn kg(&self) -> u32 {
        self.0
    }

    /// The quick-reply label, e.g. `"2 kg"`.
    pub fn label(&self) -> String {
        format!("{} kg", self.0)
    }

    /// Resolves a quick-reply label (`"2 kg"`) back to a size.
    pub fn from_label(text: &str) -> Option<CakeSize> {
        let number = text.trim().strip_suffix("kg")?.trim_end();
        number.parse().ok().and_then(CakeSize::new)
    }
}

impl std::fmt::Display for CakeSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

/// Opaque reference to an attachment held by the transport (e.g. a photo file id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentRef(String);

impl AttachmentRef {
    /// Creates a new attachment reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AttachmentRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AttachmentRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How the prepayment of a confirmed order was settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid online through the payment provider.
    Online {
        /// Provider-side payment reference.
        payment_id: String,
    },

    /// Skipped via the developer-mode bypass; nothing was charged.
    DevelopmentBypass,
}

impl PaymentMethod {
    /// Returns true if money was actually received.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentMethod::Online { .. })
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Online { payment_id } => write!(f, "50% prepayment ({payment_id})"),
            PaymentMethod::DevelopmentBypass => write!(f, "not paid (developer bypass)"),
        }
    }
}
