//! HTTP client for the companion Portfolio service.
//!
//! Only the read side is used here: the Broker view is rebuilt from a
//! portfolio on refresh.

use std::time::Duration;

use async_trait::async_trait;
use broker_query_core::errors::{Error, Result};
use broker_query_core::portfolios::{Portfolio, PortfolioClientTrait};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Default timeout for Portfolio API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PortfolioApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: Option<HeaderValue>,
}

impl PortfolioApiClient {
    /// Create a new Portfolio API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the Portfolio API (e.g. "http://portfolio:9080/portfolio")
    /// * `access_token` - Optional JWT sent as a bearer token
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be initialized.
    pub fn new(base_url: &str, access_token: Option<&str>) -> Result<Self> {
        let auth_header = access_token
            .map(|token| {
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| Error::Unexpected(format!("Invalid access token format: {}", e)))
            })
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = &self.auth_header {
            headers.insert(AUTHORIZATION, auth.clone());
        }
        headers
    }

    fn owner_path(owner: &str) -> String {
        format!("/{}", urlencoding::encode(owner))
    }

    /// GET `path` and parse the JSON body. A 404 becomes `NotFound(resource)`.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        resource: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[PortfolioApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Request to {} failed: {}", url, e)))?;

        self.parse_response(response, resource).await
    }

    async fn parse_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to read response: {}", e)))?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                if let Some(msg) = err.message.or(err.error) {
                    return Err(Error::Upstream(format!(
                        "Portfolio API error {}: {}",
                        status, msg
                    )));
                }
            }
            return Err(Error::Upstream(format!(
                "Portfolio API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("Failed to parse portfolio response: {}", e)))
    }
}

#[async_trait]
impl PortfolioClientTrait for PortfolioApiClient {
    async fn get_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.get("/", &[], "portfolios").await
    }

    async fn get_portfolio(&self, owner: &str) -> Result<Portfolio> {
        // `immutable` asks the service not to recompute loyalty while reading.
        self.get(&Self::owner_path(owner), &[("immutable", "true")], owner)
            .await
    }
}
