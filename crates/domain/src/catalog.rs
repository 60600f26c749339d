//! Immutable price catalogs.
//!
//! Every selectable option the customer can pick from a quick-reply list is
//! a key in one of these tables. The tables are process-wide statics; nothing
//! mutates them at runtime.

use crate::order::{CakeKind, Money};

/// Price of one decorated cookie.
pub const COOKIE_PRICE: Money = Money::from_units(160);

/// Surcharge for any cream color other than the baseline.
pub const CREAM_SURCHARGE: Money = Money::from_units(100);

/// Cream color that carries no surcharge. Compared case-insensitively.
pub const BASELINE_CREAM_COLOR: &str = "white";

/// ISO 4217 code of the catalog currency.
pub const CURRENCY: &str = "RUB";

/// An ordered mapping from an option key to its price or surcharge.
#[derive(Debug)]
pub struct Catalog {
    name: &'static str,
    entries: &'static [(&'static str, Money)],
}

impl Catalog {
    /// Creates a catalog over a static table.
    pub const fn new(name: &'static str, entries: &'static [(&'static str, Money)]) -> Self {
        Self { name, entries }
    }

    /// Human-readable catalog name, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Looks up the price for an exact key.
    pub fn get(&self, key: &str) -> Option<Money> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, price)| *price)
    }

    /// Returns true if `key` is on the menu.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Matches raw customer input (surrounding whitespace ignored) against
    /// the keys and returns the canonical key with its price.
    pub fn resolve(&self, input: &str) -> Option<(&'static str, Money)> {
        let input = input.trim();
        self.entries.iter().find(|(k, _)| *k == input).copied()
    }

    /// Keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// All entries in display order.
    pub fn entries(&self) -> &'static [(&'static str, Money)] {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const REGULAR_FLAVOR_PRICES: &[(&str, Money)] = &[
    ("Chocolate+Strawberry", Money::from_units(2300)),
    ("Choco-Banana", Money::from_units(2500)),
    ("Pistachio+Raspberry", Money::from_units(2300)),
    ("Red Velvet+Cherry", Money::from_units(2300)),
    ("Red Velvet+Cream Cheese", Money::from_units(2300)),
    ("Honey Cake+Lingonberry", Money::from_units(2300)),
    ("Milk Blanche", Money::from_units(2300)),
    ("Carrot", Money::from_units(2300)),
    ("Chocolate Cheesecake", Money::from_units(2300)),
    ("Pistachio Cheesecake+Cherry", Money::from_units(2300)),
];

/// Regular cake flavors, priced per kilogram.
pub static REGULAR_FLAVORS: Catalog = Catalog::new("regular flavors", REGULAR_FLAVOR_PRICES);

const BENTO_FLAVOR_PRICES: &[(&str, Money)] = &[
    ("Chocolate+Strawberry", Money::from_units(1200)),
    ("Snickers", Money::from_units(1200)),
    ("Pistachio+Raspberry", Money::from_units(1200)),
    ("Red Velvet+Cherry", Money::from_units(1200)),
];

/// Bento cake flavors, flat price per cake.
pub static BENTO_FLAVORS: Catalog = Catalog::new("bento flavors", BENTO_FLAVOR_PRICES);

const REGULAR_DECOR_PRICES: &[(&str, Money)] = &[
    ("Color drawing", Money::from_units(500)),
    ("Schematic drawing", Money::from_units(500)),
    ("Paper print", Money::from_units(370)),
    ("No decoration", Money::zero()),
];

/// Decoration surcharges for regular cakes.
pub static REGULAR_DECOR: Catalog = Catalog::new("regular decor", REGULAR_DECOR_PRICES);

const BENTO_DECOR_PRICES: &[(&str, Money)] = &[
    ("Drawing", Money::from_units(300)),
    ("Paper print", Money::from_units(370)),
    ("No decoration", Money::zero()),
];

/// Decoration surcharges for bento cakes.
pub static BENTO_DECOR: Catalog = Catalog::new("bento decor", BENTO_DECOR_PRICES);

/// The flavor catalog for a cake kind.
pub fn flavors_for(kind: CakeKind) -> &'static Catalog {
    match kind {
        CakeKind::Regular => &REGULAR_FLAVORS,
        CakeKind::Bento => &BENTO_FLAVORS,
    }
}

/// The decoration catalog for a cake kind.
pub fn decor_for(kind: CakeKind) -> &'static Catalog {
    match kind {
        CakeKind::Regular => &REGULAR_DECOR,
        CakeKind::Bento => &BENTO_DECOR,
    }
}

/// Returns true if `color` is the surcharge-free baseline.
pub fn is_baseline_cream(color: &str) -> bool {
    color.trim().eq_ignore_ascii_case(BASELINE_CREAM_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(
            REGULAR_FLAVORS.get("Chocolate+Strawberry"),
            Some(Money::from_units(2300))
        );
        assert_eq!(REGULAR_FLAVORS.get("Choco-Banana"), Some(Money::from_units(2500)));
        assert_eq!(BENTO_FLAVORS.get("Snickers"), Some(Money::from_units(1200)));
        assert_eq!(REGULAR_FLAVORS.get("Snickers"), None);
    }

    #[test]
    fn test_resolve_trims_input() {
        let (key, price) = REGULAR_DECOR.resolve("  Paper print\n").unwrap();
        assert_eq!(key, "Paper print");
        assert_eq!(price, Money::from_units(370));
        assert!(REGULAR_DECOR.resolve("paper print").is_none());
    }

    #[test]
    fn test_catalog_selection_by_kind() {
        assert_eq!(flavors_for(CakeKind::Regular).len(), 10);
        assert_eq!(flavors_for(CakeKind::Bento).len(), 4);
        assert_eq!(decor_for(CakeKind::Regular).len(), 4);
        assert_eq!(decor_for(CakeKind::Bento).len(), 3);
        assert!(decor_for(CakeKind::Bento).contains("Drawing"));
        assert!(!decor_for(CakeKind::Regular).contains("Drawing"));
    }

    #[test]
    fn test_keys_are_unique_per_catalog() {
        for catalog in [&REGULAR_FLAVORS, &BENTO_FLAVORS, &REGULAR_DECOR, &BENTO_DECOR] {
            let mut keys: Vec<_> = catalog.keys().collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), catalog.len(), "duplicate key in {}", catalog.name());
        }
    }

    #[test]
    fn test_baseline_cream_is_case_insensitive() {
        assert!(is_baseline_cream("white"));
        assert!(is_baseline_cream(" WHITE "));
        assert!(is_baseline_cream("White"));
        assert!(!is_baseline_cream("pink"));
        assert!(!is_baseline_cream("off-white"));
    }
}
