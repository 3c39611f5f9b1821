//! Runtime configuration.
//!
//! Settings come from the process environment, optionally seeded from
//! a `.env` file.  Every variable has a default except the form site
//! id; without it the service still quotes prices but refuses lead
//! submissions.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_FORM_ENDPOINT: &str = "https://webflow.com/api/v1/form";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub telemetry: TelemetryConfig,
    pub leads: LeadSettings,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where and how captured leads are forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSettings {
    /// Base URL of the form endpoint; the site id is appended.
    pub form_endpoint: String,
    pub site_id: Option<String>,
    pub page_id: String,
    pub element_id: String,
    /// Page URL reported as the submission source.
    pub source_url: String,
    pub form_name: String,
    /// Marks submissions as tests on the receiving side.
    pub test_mode: bool,
}

impl Default for LeadSettings {
    fn default() -> Self {
        Self {
            form_endpoint: DEFAULT_FORM_ENDPOINT.to_string(),
            site_id: None,
            page_id: String::new(),
            element_id: String::new(),
            source_url: String::new(),
            form_name: "Calculator".to_string(),
            test_mode: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OFFER_BIND_ADDR '{value}' is not a socket address")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{key} must be true or false, got '{value}'")]
    InvalidFlag { key: &'static str, value: String },
}

impl AppConfig {
    /// Loads configuration from `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind = var("OFFER_BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;

        let test_mode = match lookup("OFFER_TEST_MODE") {
            Some(value) => parse_flag("OFFER_TEST_MODE", &value)?,
            None => false,
        };

        let defaults = LeadSettings::default();
        let leads = LeadSettings {
            form_endpoint: var("OFFER_FORM_ENDPOINT", &defaults.form_endpoint),
            site_id: lookup("OFFER_SITE_ID").filter(|id| !id.trim().is_empty()),
            page_id: var("OFFER_PAGE_ID", &defaults.page_id),
            element_id: var("OFFER_ELEMENT_ID", &defaults.element_id),
            source_url: var("OFFER_SOURCE_URL", &defaults.source_url),
            form_name: var("OFFER_FORM_NAME", &defaults.form_name),
            test_mode,
        };

        Ok(Self {
            bind_addr,
            telemetry: TelemetryConfig {
                log_level: var("OFFER_LOG_LEVEL", "info"),
            },
            leads,
        })
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}
