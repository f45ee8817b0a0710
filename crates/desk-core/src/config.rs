//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in this crate reads environment variables while handling input events; the
//! binary reads them and hands the raw values to the parsing helpers below.

use crate::constants::{AUTOFILL_NOTICE, DEFAULT_RESULTS_PER_PAGE, PINCODE_DEBOUNCE};
use crate::{DeskError, DeskResult};
use std::time::Duration;
use url::Url;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct DeskConfig {
    api_base_url: Url,
    access_token: Option<String>,
    pincode_api_url: Url,
    pincode_api_key: Option<String>,
    results_per_page: u32,
    pincode_debounce: Duration,
    autofill_notice: Duration,
}

impl DeskConfig {
    /// Create a new `DeskConfig` with default timings.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::InvalidConfig` if either URL cannot be used as a base URL.
    pub fn new(api_base_url: Url, pincode_api_url: Url) -> DeskResult<Self> {
        for url in [&api_base_url, &pincode_api_url] {
            if url.cannot_be_a_base() {
                return Err(DeskError::InvalidConfig(format!(
                    "{url} cannot be used as a base URL"
                )));
            }
        }

        Ok(Self {
            api_base_url,
            access_token: None,
            pincode_api_url,
            pincode_api_key: None,
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
            pincode_debounce: PINCODE_DEBOUNCE,
            autofill_notice: AUTOFILL_NOTICE,
        })
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_pincode_api_key(mut self, key: Option<String>) -> Self {
        self.pincode_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// # Errors
    ///
    /// Returns `DeskError::InvalidConfig` when `limit` is zero.
    pub fn with_results_per_page(mut self, limit: u32) -> DeskResult<Self> {
        if limit == 0 {
            return Err(DeskError::InvalidConfig(
                "results per page must be at least 1".into(),
            ));
        }
        self.results_per_page = limit;
        Ok(self)
    }

    pub fn with_timings(mut self, pincode_debounce: Duration, autofill_notice: Duration) -> Self {
        self.pincode_debounce = pincode_debounce;
        self.autofill_notice = autofill_notice;
        self
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn pincode_api_url(&self) -> &Url {
        &self.pincode_api_url
    }

    pub fn pincode_api_key(&self) -> Option<&str> {
        self.pincode_api_key.as_deref()
    }

    pub fn results_per_page(&self) -> u32 {
        self.results_per_page
    }

    pub fn pincode_debounce(&self) -> Duration {
        self.pincode_debounce
    }

    pub fn autofill_notice(&self) -> Duration {
        self.autofill_notice
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a base URL from an optional string value, falling back to `default`.
pub fn url_from_env_value(value: Option<String>, default: &str) -> DeskResult<Url> {
    let raw = non_empty(value).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| DeskError::InvalidConfig(format!("invalid URL {raw:?}: {e}")))
}

/// Parse the listing page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_RESULTS_PER_PAGE`].
pub fn results_per_page_from_env_value(value: Option<String>) -> DeskResult<u32> {
    match non_empty(value) {
        None => Ok(DEFAULT_RESULTS_PER_PAGE),
        Some(v) => v
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| DeskError::InvalidConfig(format!("invalid results per page: {v}"))),
    }
}

/// Parse a millisecond duration from an optional string value, falling back to `default`.
pub fn duration_ms_from_env_value(
    value: Option<String>,
    default: Duration,
) -> DeskResult<Duration> {
    match non_empty(value) {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| DeskError::InvalidConfig(format!("invalid millisecond value: {v}"))),
    }
}
