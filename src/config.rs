//! Configuration module
//!
//! Loads configuration from environment variables.

use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::Currency;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Accounts file path
    pub accounts_file: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Key required by balance override routes; open when unset
    pub admin_api_key: Option<String>,

    /// Economy rules
    pub economy: EconomyConfig,
}

/// Rules applied by the economy service
#[derive(Debug, Clone)]
pub struct EconomyConfig {
    /// Balance seeded into every currency of a new account
    pub starting_balance: Decimal,

    /// Whether deposits are clamped to `money_cap`
    pub money_cap_enabled: bool,

    /// Highest balance a deposit may leave behind
    pub money_cap: Decimal,

    /// Default currency
    pub currency: Currency,

    /// Currencies tracked alongside the default one
    pub extra_currencies: Vec<Currency>,

    /// Buffered notifications per subscriber before old ones are dropped
    pub event_channel_capacity: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: Decimal::new(10000, 2),
            money_cap_enabled: false,
            money_cap: Decimal::new(1_000_000_000, 2),
            currency: Currency::new("Dollar", "Dollars", "$").as_default(),
            extra_currencies: Vec::new(),
            event_channel_capacity: 1024,
        }
    }
}

impl EconomyConfig {
    /// The cap to apply, if capping is enabled
    pub fn effective_cap(&self) -> Option<Decimal> {
        self.money_cap_enabled.then_some(self.money_cap)
    }

    /// Default currency first, then the extra ones
    pub fn currencies(&self) -> Vec<Currency> {
        std::iter::once(self.currency.clone())
            .chain(self.extra_currencies.iter().cloned())
            .collect()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let accounts_file = env::var("ACCOUNTS_FILE")
            .unwrap_or_else(|_| "accounts.json".to_string())
            .into();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let admin_api_key = env::var("ADMIN_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            accounts_file,
            host,
            port,
            environment,
            admin_api_key,
            economy: EconomyConfig::from_env()?,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl EconomyConfig {
    /// Load economy rules from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let starting_balance = decimal_var("STARTING_BALANCE", defaults.starting_balance)?;
        let money_cap = decimal_var("MONEY_CAP", defaults.money_cap)?;

        let money_cap_enabled = match env::var("MONEY_CAP_ENABLED") {
            Ok(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue("MONEY_CAP_ENABLED"))?,
            Err(_) => defaults.money_cap_enabled,
        };

        let name = env::var("CURRENCY_NAME")
            .unwrap_or_else(|_| defaults.currency.display_name().to_string());
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("CURRENCY_NAME"));
        }
        let plural = env::var("CURRENCY_PLURAL").unwrap_or_else(|_| format!("{}s", name));
        let symbol = env::var("CURRENCY_SYMBOL")
            .unwrap_or_else(|_| defaults.currency.symbol().to_string());

        let event_channel_capacity = match env::var("EVENT_CHANNEL_CAPACITY") {
            Ok(value) => value
                .parse()
                .ok()
                .filter(|capacity: &usize| *capacity > 0)
                .ok_or(ConfigError::InvalidValue("EVENT_CHANNEL_CAPACITY"))?,
            Err(_) => defaults.event_channel_capacity,
        };

        Ok(Self {
            starting_balance,
            money_cap_enabled,
            money_cap,
            currency: Currency::new(name, plural, symbol).as_default(),
            extra_currencies: defaults.extra_currencies,
            event_channel_capacity,
        })
    }
}

fn decimal_var(name: &'static str, default: Decimal) -> Result<Decimal, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    let value = Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidValue(name))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConfigError::InvalidValue(name));
    }

    Ok(value)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
