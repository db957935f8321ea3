//! Country dial-code lookup over HTTP.

use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;

use crate::domain::country::{build_catalog, CountryCode, RawCountry};

#[derive(Debug, Error)]
pub enum CountryFetchError {
    #[error("failed to fetch country data: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to fetch country data: server answered {0}")]
    Status(reqwest::StatusCode),
}

/// Fetches the country list and builds the dial-code catalog.
pub async fn fetch_country_codes(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<CountryCode>, CountryFetchError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(CountryFetchError::Status(response.status()));
    }

    let raw: Vec<RawCountry> = response.json().await?;
    let catalog = build_catalog(raw);
    tracing::debug!(
        code = "COUNTRY_CODES_FETCHED",
        count = catalog.len(),
        "country codes loaded"
    );
    Ok(catalog)
}

/// Blocking facade for callers outside the async runtime.
#[derive(Debug, Clone)]
pub struct HttpCountryCodes {
    runtime: Handle,
    client: reqwest::Client,
    url: String,
}

impl HttpCountryCodes {
    pub fn new(
        runtime: Handle,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CountryFetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            runtime,
            client,
            url: url.into(),
        })
    }

    /// Must not be called from inside the runtime's own worker threads.
    pub fn fetch_blocking(&self) -> Result<Vec<CountryCode>, CountryFetchError> {
        self.runtime
            .block_on(fetch_country_codes(&self.client, &self.url))
    }
}
