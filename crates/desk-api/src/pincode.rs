//! Client for the public pincode directory (data.gov.in "All India Pincode Directory").

use crate::error::{ApiError, ApiResult};
use crate::{base_url, ensure_success, USER_AGENT};
use async_trait::async_trait;
use desk_core::remote::{PincodeDetails, PincodeLookup};
use desk_core::{DeskConfig, DeskResult};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const RESOURCE_PATH: &str = "resource/6176ee09-3d56-4a3b-8115-21841576b2f6";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    records: Vec<PincodeDetails>,
}

#[derive(Clone, Debug)]
pub struct PincodeDirectory {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
}

impl PincodeDirectory {
    pub fn new(cfg: &DeskConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(LOOKUP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: base_url(cfg.pincode_api_url()),
            api_key: cfg.pincode_api_key().map(str::to_string),
        })
    }

    /// Fetches the first directory record for `pincode`.
    pub async fn fetch(&self, pincode: &str) -> ApiResult<Option<PincodeDetails>> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;

        let mut url = self.base.join(RESOURCE_PATH)?;
        url.query_pairs_mut()
            .append_pair("api-key", api_key)
            .append_pair("format", "json")
            .append_pair("filters[pincode]", pincode)
            .append_pair("limit", "1");

        tracing::debug!(pincode, "pincode directory request");
        let response = ensure_success(self.http.get(url).send().await?, RESOURCE_PATH)?;
        let body = response.bytes().await?;
        let parsed: DirectoryResponse = serde_json::from_slice(&body)?;
        Ok(parsed.records.into_iter().next())
    }
}

#[async_trait]
impl PincodeLookup for PincodeDirectory {
    async fn lookup(&self, pincode: &str) -> DeskResult<Option<PincodeDetails>> {
        Ok(self.fetch(pincode).await?)
    }
}
