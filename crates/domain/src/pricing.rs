//! Pricing engine.
//!
//! Pure functions from the order fields collected so far to a monetary
//! total. The same computation backs the amount shown at the payment step
//! and the amount written into the final order record, so both always agree
//! for unchanged session data.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, COOKIE_PRICE, CREAM_SURCHARGE};
use crate::order::{CakeKind, CakeSize, Money};

/// The cake-specific part of a pricing request.
///
/// Size only exists for regular cakes and cream color only for bento cakes,
/// so the two shapes are separate variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CakeSpec<'a> {
    /// A regular cake: per-kilogram flavor price times size.
    Regular { flavor: &'a str, size: CakeSize },

    /// A bento cake: flat flavor price, optional cream color surcharge.
    Bento {
        flavor: &'a str,
        cream_color: Option<&'a str>,
    },
}

impl CakeSpec<'_> {
    /// The kind of cake described.
    pub fn kind(&self) -> CakeKind {
        match self {
            CakeSpec::Regular { .. } => CakeKind::Regular,
            CakeSpec::Bento { .. } => CakeKind::Bento,
        }
    }

    /// The chosen flavor key.
    pub fn flavor(&self) -> &str {
        match self {
            CakeSpec::Regular { flavor, .. } | CakeSpec::Bento { flavor, .. } => *flavor,
        }
    }
}

/// Everything the pricing engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingInput<'a> {
    pub cake: CakeSpec<'a>,
    pub decor_option: Option<&'a str>,
    pub cookies_count: u32,
}

/// The itemized result of a pricing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base: Money,
    pub cream: Money,
    pub decor: Money,
    pub cookies: Money,

    /// Sum of all components, truncated to whole currency units.
    pub total: Money,

    /// Half of the total, truncated to whole currency units.
    pub prepayment: Money,
}

/// Flavor price: per kilogram for regular cakes, flat for bento.
///
/// An unknown flavor prices at zero instead of failing; the state machine
/// only stores catalog keys, so reaching this path means a bug upstream.
pub fn base_price(cake: &CakeSpec<'_>) -> Money {
    let flavors = catalog::flavors_for(cake.kind());
    let Some(price) = flavors.get(cake.flavor()) else {
        tracing::warn!(
            flavor = cake.flavor(),
            catalog = flavors.name(),
            "unknown flavor priced at zero"
        );
        return Money::zero();
    };

    match cake {
        CakeSpec::Regular { size, .. } => price.multiply(size.kg()),
        CakeSpec::Bento { .. } => price,
    }
}

/// Cream color surcharge. Always zero for regular cakes.
pub fn cream_surcharge(cake: &CakeSpec<'_>) -> Money {
    match cake {
        CakeSpec::Bento {
            cream_color: Some(color),
            ..
        } if !catalog::is_baseline_cream(color) => CREAM_SURCHARGE,
        _ => Money::zero(),
    }
}

/// Decoration surcharge from the catalog matching the cake kind.
pub fn decor_surcharge(kind: CakeKind, decor_option: Option<&str>) -> Money {
    let Some(option) = decor_option else {
        return Money::zero();
    };
    let decor = catalog::decor_for(kind);
    decor.get(option).unwrap_or_else(|| {
        tracing::warn!(option, catalog = decor.name(), "unknown decor priced at zero");
        Money::zero()
    })
}

/// Cookie surcharge: count times the per-cookie price.
pub fn cookies_surcharge(cookies_count: u32) -> Money {
    COOKIE_PRICE.multiply(cookies_count)
}

/// Prepayment owed for a total.
pub fn prepayment(total: Money) -> Money {
    total.half_truncated()
}

/// Prices an order.
pub fn price(input: &PricingInput<'_>) -> PriceBreakdown {
    let base = base_price(&input.cake);
    let cream = cream_surcharge(&input.cake);
    let decor = decor_surcharge(input.cake.kind(), input.decor_option);
    let cookies = cookies_surcharge(input.cookies_count);

    let total = (base + cream + decor + cookies).truncate();

    PriceBreakdown {
        base,
        cream,
        decor,
        cookies,
        total,
        prepayment: prepayment(total),
    }
}
