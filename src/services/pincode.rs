//! PIN-code lookup for address autofill and location pickers.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::pincode::{PincodeResponse, PostOffice, is_valid_pincode};

/// Resolves a six-digit PIN to the post offices it covers.
///
/// An unknown PIN yields an empty list, not an error.
#[async_trait]
pub trait PincodeLookup: Send + Sync {
    async fn lookup(&self, pin: &str) -> Result<Vec<PostOffice>>;
}

/// Live lookup against the public postal PIN-code service.
#[derive(Debug, Clone)]
pub struct PostalPincodeService {
    client: Client,
    base: Url,
}

impl PostalPincodeService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base: Url::parse(&config.pincode_api_url)?,
        })
    }
}

#[async_trait]
impl PincodeLookup for PostalPincodeService {
    async fn lookup(&self, pin: &str) -> Result<Vec<PostOffice>> {
        if !is_valid_pincode(pin) {
            return Err(ClientError::InvalidInput("Invalid PIN code".to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidInput(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(["pincode", pin]);

        tracing::debug!(%url, "pincode lookup");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: Vec<PincodeResponse> = response.json().await?;

        // Only the first entry is meaningful; anything but "Success" means unknown
        Ok(body
            .into_iter()
            .next()
            .filter(|entry| entry.status == "Success")
            .and_then(|entry| entry.post_offices)
            .unwrap_or_default())
    }
}

/// Fixed answers, for pages that fill addresses without a live service.
#[derive(Debug, Clone, Default)]
pub struct StaticPincodeLookup {
    entries: HashMap<String, Vec<PostOffice>>,
}

impl StaticPincodeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pin: impl Into<String>, offices: Vec<PostOffice>) -> Self {
        self.entries.insert(pin.into(), offices);
        self
    }
}

#[async_trait]
impl PincodeLookup for StaticPincodeLookup {
    async fn lookup(&self, pin: &str) -> Result<Vec<PostOffice>> {
        if !is_valid_pincode(pin) {
            return Err(ClientError::InvalidInput("Invalid PIN code".to_string()));
        }
        Ok(self.entries.get(pin).cloned().unwrap_or_default())
    }
}
