//! # Catalog
//!
//! The fixed item → price table.
//!
//! The catalog is built once at process start and never mutated afterwards;
//! it is shared behind an `Arc` by whoever needs prices. The engine, never the
//! caller, decides what a purchase costs.
//!
//! ```text
//! ┌──────────────┬───────┐
//! │ item         │ price │
//! ├──────────────┼───────┤
//! │ t-shirt      │    80 │
//! │ cup          │    20 │
//! │ book         │    50 │
//! │ pen          │    10 │
//! │ powerbank    │   200 │
//! │ hoody        │   300 │
//! │ umbrella     │   200 │
//! │ socks        │    10 │
//! │ wallet       │    50 │
//! │ pink-hoody   │   500 │
//! └──────────────┴───────┘
//! ```

use std::collections::BTreeMap;

use crate::coins::Coins;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::validate_item_name;

/// Default merchandise prices.
const DEFAULT_PRICES: &[(&str, i64)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// Immutable item → price table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    prices: BTreeMap<String, Coins>,
}

impl Catalog {
    /// Builds a catalog from configured prices.
    ///
    /// ## Rules
    /// - Item names follow [`validate_item_name`]
    /// - Prices must be strictly positive
    /// - An item may be listed only once
    pub fn from_prices<I, S>(prices: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (name, price) in prices {
            let name = name.into();
            validate_item_name(&name)?;
            if price <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: format!("price of {}", name),
                });
            }
            if table.insert(name.clone(), Coins::new(price)).is_some() {
                return Err(ValidationError::Duplicate {
                    field: "item".to_string(),
                    value: name,
                });
            }
        }

        if table.is_empty() {
            return Err(ValidationError::Required {
                field: "catalog".to_string(),
            });
        }

        Ok(Catalog { prices: table })
    }

    /// Looks up the price of an item.
    pub fn price_of(&self, item: &str) -> CoreResult<Coins> {
        self.prices
            .get(item)
            .copied()
            .ok_or_else(|| CoreError::UnknownItem(item.to_string()))
    }

    pub fn contains(&self, item: &str) -> bool {
        self.prices.contains_key(item)
    }

    /// Items and prices, ordered by item name.
    pub fn items(&self) -> impl Iterator<Item = (&str, Coins)> + '_ {
        self.prices.iter().map(|(name, price)| (name.as_str(), *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            prices: DEFAULT_PRICES
                .iter()
                .map(|(name, price)| (name.to_string(), Coins::new(*price)))
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prices() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.price_of("t-shirt").unwrap(), Coins::new(80));
        assert_eq!(catalog.price_of("cup").unwrap(), Coins::new(20));
        assert_eq!(catalog.price_of("pink-hoody").unwrap(), Coins::new(500));
        assert_eq!(catalog.price_of("socks").unwrap(), Coins::new(10));
    }

    #[test]
    fn test_unknown_item() {
        let err = Catalog::default().price_of("yacht").unwrap_err();
        assert!(matches!(err, CoreError::UnknownItem(ref item) if item == "yacht"));
    }

    #[test]
    fn test_lookup_is_stable() {
        let catalog = Catalog::default();
        let first = catalog.price_of("book").unwrap();
        let second = catalog.price_of("book").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(Catalog::default().price_of("CUP").is_err());
    }

    #[test]
    fn test_from_prices() {
        let catalog = Catalog::from_prices([("sticker", 5), ("mug", 25)]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price_of("mug").unwrap(), Coins::new(25));
        assert!(!catalog.contains("cup"));

        let names: Vec<&str> = catalog.items().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["mug", "sticker"]);
    }

    #[test]
    fn test_from_prices_rejects_bad_entries() {
        assert!(Catalog::from_prices([("free-lunch", 0)]).is_err());
        assert!(Catalog::from_prices([("debt", -5)]).is_err());
        assert!(Catalog::from_prices([("", 5)]).is_err());
        assert!(Catalog::from_prices([("mug", 5), ("mug", 6)]).is_err());
        assert!(Catalog::from_prices(Vec::<(String, i64)>::new()).is_err());
    }
}
