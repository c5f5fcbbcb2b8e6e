//! Currency
//!
//! Named unit of value. Balances are stored per currency under a key
//! derived from the display name.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::amount::{truncate_to_cents, FRACTION_DIGITS};

const BALANCE_KEY_SUFFIX: &str = "-balance";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    display_name: String,
    plural_display_name: String,
    symbol: String,
    default_fraction_digits: u32,
    is_default: bool,
}

impl Currency {
    pub fn new(
        display_name: impl Into<String>,
        plural_display_name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            plural_display_name: plural_display_name.into(),
            symbol: symbol.into(),
            default_fraction_digits: FRACTION_DIGITS,
            is_default: false,
        }
    }

    /// Mark this currency as the economy's default
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn plural_display_name(&self) -> &str {
        &self.plural_display_name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn default_fraction_digits(&self) -> u32 {
        self.default_fraction_digits
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Key under which an account stores its balance in this currency.
    ///
    /// `"Dollar"` maps to `"dollar-balance"`.
    pub fn balance_key(&self) -> String {
        format!("{}{}", self.display_name.to_lowercase(), BALANCE_KEY_SUFFIX)
    }

    /// Case-insensitive name match, used when resolving user input.
    ///
    /// Folds case the same way as [`Currency::balance_key`].
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.display_name.to_lowercase() == name
            || self.plural_display_name.to_lowercase() == name
    }

    /// Render an amount with the symbol, e.g. `$12.50`
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{}", self.symbol, truncate_to_cents(amount))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
