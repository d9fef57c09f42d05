//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Pricing job configuration.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Invoice numbering configuration.
    #[serde(default)]
    pub invoicing: InvoicingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Pricing job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Number of finance events claimed per transaction.
    ///
    /// Bounds transaction size so row locks are never held for long.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Maximum number of pages processed per invocation (0 = unbounded).
    #[serde(default)]
    pub max_pages: u64,
}

fn default_page_size() -> u64 {
    250
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: 0,
        }
    }
}

/// Invoice numbering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingConfig {
    /// Reference prefix (e.g. "F" for standard invoices).
    #[serde(default = "default_invoice_prefix")]
    pub prefix: String,
}

fn default_invoice_prefix() -> String {
    "F".to_string()
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            prefix: default_invoice_prefix(),
        }
    }
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
            .add_source(config::Environment::with_prefix("CACHET").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
