//! REST adapter for the off-chain index.

use crate::config::Config;
use crate::error::ServiceError;
use crate::services::{
    ActivateItemRequest, CollectionService, DraftItemRequest, ItemService, ProcessLazyItemRequest,
};
use crate::{Error, Result};
use async_trait::async_trait;
use leda_types::{Address, Collection, CollectionFilters, History, Item, ItemId, ItemsFilters, Page};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Reads only; writes are never retried.
const READ_MAX_RETRIES: u32 = 3;
const READ_RETRY_BASE_MS: u64 = 200;

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
}

fn map_status(status: StatusCode, body: String) -> ServiceError {
    let msg = format!("HTTP {status}: {body}");
    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status.is_client_error() && !is_retryable(status) {
        ServiceError::Rejected(msg)
    } else {
        ServiceError::Unavailable(msg)
    }
}

/// A failed round trip, and whether sending it again may succeed.
#[derive(Debug)]
struct Failure {
    error: ServiceError,
    retryable: bool,
}

impl Failure {
    fn from_status(status: StatusCode, body: String) -> Self {
        Self {
            error: map_status(status, body),
            retryable: is_retryable(status),
        }
    }

    fn transport(e: reqwest::Error) -> Self {
        Self {
            error: ServiceError::Unavailable(e.to_string()),
            retryable: true,
        }
    }

    fn decode(e: reqwest::Error) -> Self {
        Self {
            error: ServiceError::Decode(e.to_string()),
            retryable: false,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddressBody<'a> {
    address: &'a Address,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListBody<'a> {
    price: f64,
    list_id: u64,
    address: &'a Address,
}

/// Item and collection index reached over HTTP.
pub struct HttpItemService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpItemService {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: config.index_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Failure> {
        let response = request.send().await.map_err(Failure::transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Failure::from_status(status, body));
        }
        response.json::<T>().await.map_err(Failure::decode)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let url = self.url(path);
        let mut attempt = 0;
        loop {
            match self.send(self.http.get(&url).query(query)).await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.retryable && attempt + 1 < READ_MAX_RETRIES => {
                    warn!(attempt, url = %url, error = %failure.error, "Index read failed (retrying)");
                    attempt += 1;
                    let delay = Duration::from_millis(READ_RETRY_BASE_MS * 2u64.pow(attempt));
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!(path, "Index write");
        self.send(self.http.post(self.url(path)).json(body))
            .await
            .map_err(|failure| failure.error)
    }
}

fn page_query(page: u32, limit: u32, search: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
    if let Some(term) = search.filter(|s| !s.is_empty()) {
        query.push(("search", term.to_string()));
    }
    query
}

#[async_trait]
impl ItemService for HttpItemService {
    async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
        self.get("/items", &[]).await
    }

    async fn find_by_id(&self, item_id: &ItemId) -> Result<Item, ServiceError> {
        self.get(&format!("/items/{item_id}"), &[]).await
    }

    async fn buy(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError> {
        self.post(&format!("/items/{item_id}/buy"), &AddressBody { address })
            .await
    }

    async fn list(
        &self,
        item_id: &ItemId,
        price: f64,
        list_id: u64,
        address: &Address,
    ) -> Result<Item, ServiceError> {
        let body = ListBody {
            price,
            list_id,
            address,
        };
        self.post(&format!("/items/{item_id}/list"), &body).await
    }

    async fn delist(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError> {
        self.post(&format!("/items/{item_id}/delist"), &AddressBody { address })
            .await
    }

    async fn create(&self, draft: &DraftItemRequest) -> Result<Item, ServiceError> {
        self.post("/items/draft", draft).await
    }

    async fn activate(&self, request: &ActivateItemRequest) -> Result<Item, ServiceError> {
        self.post(&format!("/items/{}/activate", request.item_id), request)
            .await
    }

    async fn process_lazy_item(&self, request: &ProcessLazyItemRequest) -> Result<Item, ServiceError> {
        self.post("/items/lazy-processing", request).await
    }

    async fn like(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError> {
        self.post(&format!("/items/{item_id}/like"), &AddressBody { address })
            .await
    }

    async fn find_all_history(&self) -> Result<Vec<History>, ServiceError> {
        self.get("/items/history", &[]).await
    }

    async fn find_history_by_item_id(&self, item_id: &ItemId) -> Result<Vec<History>, ServiceError> {
        self.get(&format!("/items/{item_id}/history"), &[]).await
    }
}

#[async_trait]
impl CollectionService for HttpItemService {
    async fn find_all(&self) -> Result<Vec<Collection>, ServiceError> {
        self.get("/collections", &[]).await
    }

    async fn find_by_id(&self, collection_id: &str) -> Result<Collection, ServiceError> {
        self.get(&format!("/collections/{collection_id}"), &[]).await
    }

    async fn find_filtered(&self, filters: &CollectionFilters) -> Result<Page<Collection>, ServiceError> {
        let query = page_query(filters.page, filters.limit, filters.search.as_deref());
        self.get("/collections/paginated", &query).await
    }

    async fn find_paged_items(
        &self,
        collection_id: &str,
        filters: &ItemsFilters,
    ) -> Result<Page<Item>, ServiceError> {
        let query = page_query(filters.page, filters.limit, filters.search.as_deref());
        self.get(&format!("/collections/{collection_id}/nfts"), &query)
            .await
    }
}
