use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::models::{Country, DisasterType, GlobalEnums, Paginated, ReferenceData};

pub const DEFAULT_API_URL: &str = "https://goadmin.ifrc.org";

const GLOBAL_ENUMS_PATH: &str = "/api/v2/global-enums/";
const COUNTRY_PATH: &str = "/api/v2/country/";
const DISASTER_TYPE_PATH: &str = "/api/v2/disaster_type/";

/// Page size requested from list endpoints
const PAGE_LIMIT: u32 = 500;
/// Stop following `next` links after this many pages
const MAX_PAGES: usize = 100;

/// Read-only client for the GO reference data endpoints
#[derive(Debug, Clone)]
pub struct GoApiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl GoApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("dref-template/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_custom_client(base_url, http_client))
    }

    pub fn with_custom_client(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Shared HTTP client (cheap clone)
    pub fn http_client(&self) -> reqwest::Client {
        self.http_client.clone()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn global_enums(&self) -> Result<GlobalEnums> {
        self.get_json(&self.endpoint(GLOBAL_ENUMS_PATH)).await
    }

    pub async fn countries(&self) -> Result<Vec<Country>> {
        self.get_all(COUNTRY_PATH).await
    }

    pub async fn disaster_types(&self) -> Result<Vec<DisasterType>> {
        self.get_all(DISASTER_TYPE_PATH).await
    }

    /// Fetch the three reference sets concurrently
    pub async fn fetch_reference_data(&self) -> Result<ReferenceData> {
        info!("Fetching reference data from {}", self.base_url);
        let (global_enums, countries, disaster_types) =
            tokio::try_join!(self.global_enums(), self.countries(), self.disaster_types())?;

        info!(
            "Fetched {} countries and {} disaster types",
            countries.len(),
            disaster_types.len()
        );
        Ok(ReferenceData {
            global_enums,
            countries,
            disaster_types,
        })
    }

    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut url = Some(format!("{}?limit={}", self.endpoint(path), PAGE_LIMIT));
        let mut results = Vec::new();
        let mut pages = 0;

        while let Some(page_url) = url.take() {
            pages += 1;
            if pages > MAX_PAGES {
                bail!("{} returned more than {} pages", path, MAX_PAGES);
            }

            let page: Paginated<T> = self.get_json(&page_url).await?;
            debug!(
                "Page {} of {}: {} results (total {:?})",
                pages,
                path,
                page.results.len(),
                page.count
            );
            results.extend(page.results);
            url = page.next;
        }

        Ok(results)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Request to {} failed with {}: {}", url, status, error_text);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}
