//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Invoicing defaults.
    #[serde(default)]
    pub invoicing: InvoicingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Invoicing defaults applied at invoice creation.
///
/// Loaded once per process and injected into creation requests; the
/// calculation pipeline itself only ever sees explicit inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingConfig {
    /// Default ISO 4217 currency code for new invoices.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Default tax rate (0-100) for new invoices.
    #[serde(default = "default_tax_rate")]
    pub default_tax_rate: Decimal,
    /// Default payment terms in days (due date = invoice date + this).
    #[serde(default = "default_due_days")]
    pub default_due_days: u32,
    /// Amount by which a payment may exceed the balance due before it is
    /// rejected as an overpayment. Zero means strict rejection.
    #[serde(default = "default_overpayment_tolerance")]
    pub overpayment_tolerance: Decimal,
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            default_tax_rate: default_tax_rate(),
            default_due_days: default_due_days(),
            overpayment_tolerance: default_overpayment_tolerance(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_tax_rate() -> Decimal {
    Decimal::ZERO
}

fn default_due_days() -> u32 {
    30
}

fn default_overpayment_tolerance() -> Decimal {
    Decimal::ZERO
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FACTURE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
