//! API client for the judge backend

use crate::search::{EntitySearch, SearchError};
use async_trait::async_trait;
use oj_types::{Entity, SearchEntitiesQuery};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, SearchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}

/// [`EntitySearch`] backed by `GET {base_url}{search_path}?kind=..&q=..`
#[derive(Clone, Debug)]
pub struct HttpEntitySearch {
    api: ApiClient,
    search_path: String,
}

impl HttpEntitySearch {
    pub fn new(api: ApiClient, search_path: impl Into<String>) -> Self {
        Self {
            api,
            search_path: search_path.into(),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl EntitySearch for HttpEntitySearch {
    async fn search(
        &self,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<Entity>, SearchError> {
        let params = SearchEntitiesQuery {
            kind: category.map(str::to_string),
            q: query.map(str::to_string),
        };
        self.api.get(&self.search_path, &params).await
    }
}
