use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::domain::entities::entity::EntityKind;
use crate::domain::entities::list_query::{ListQuery, PagedResult};
use crate::usecase::ports::data_provider::{PagedDataProvider, ProviderError};

/// Paginated envelope returned by the backend list endpoints.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    pub total: u64,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl<T> PageEnvelope<T> {
    pub fn into_paged_result(self, query: &ListQuery) -> PagedResult<T> {
        let per_page = self
            .per_page
            .filter(|per_page| *per_page > 0)
            .unwrap_or(query.page_size);
        let current_page = self.current_page.unwrap_or(query.page);
        let mut result = PagedResult::new(self.data, self.total, current_page, per_page);
        if let Some(last_page) = self.last_page {
            result.total_pages = last_page;
        }
        result
    }
}

pub fn decode_page<T: DeserializeOwned>(
    body: &[u8],
    query: &ListQuery,
) -> Result<PagedResult<T>, ProviderError> {
    serde_json::from_slice::<PageEnvelope<T>>(body)
        .map(|envelope| envelope.into_paged_result(query))
        .map_err(|err| ProviderError::Decode(err.to_string()))
}

/// Picks the `message` field of a JSON error body, falling back to the raw
/// body or the status reason.
pub fn error_message(body: &str, reason: Option<&str>) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("request failed").to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

pub struct RestDataProvider {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    endpoints: BTreeMap<EntityKind, String>,
}

impl RestDataProvider {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_token,
            endpoints: BTreeMap::new(),
        })
    }

    pub fn with_endpoint(mut self, entity: EntityKind, endpoint: &str) -> Self {
        self.endpoints.insert(entity, endpoint.to_string());
        self
    }

    pub fn url_for(&self, entity: EntityKind) -> String {
        let endpoint = self
            .endpoints
            .get(&entity)
            .cloned()
            .unwrap_or_else(|| format!("/{}", entity.slug().replace('_', "-")));
        endpoint_url(&self.base_url, &endpoint)
    }
}

#[async_trait]
impl<T> PagedDataProvider<T> for RestDataProvider
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(
        &self,
        entity: EntityKind,
        query: &ListQuery,
    ) -> Result<PagedResult<T>, ProviderError> {
        let url = self.url_for(entity);
        debug!(%url, page = query.page, "requesting list page");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&query.to_params());
        if let Some(token) = self.api_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        decode_page(&body, query)
    }
}
