//! HTTP implementation of [`RecordStore`] against a PocketBase-style
//! record API. All calls are blocking; the editor runs single-threaded
//! and every store round-trip happens at an explicit save or load.

use crate::error::ProposalError;
use crate::store::{ListOptions, RecordPage, RecordStore};
use serde_json::Value;
use std::time::Duration;

pub struct HttpStore {
    base_url: String,
    api_key: String,
    /// Per-user auth token, set after sign-in.
    auth_token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ProposalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            auth_token: None,
            client,
        })
    }

    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token;
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    fn apply_headers(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        let req = req.header("X-API-Key", &self.api_key);
        match &self.auth_token {
            Some(token) => req.header("Authorization", token),
            None => req,
        }
    }

    /// Run a request and parse the JSON body, mapping non-2xx statuses to
    /// a store error carrying the backend's message.
    fn execute(&self, req: reqwest::blocking::RequestBuilder) -> Result<Value, ProposalError> {
        let response = self.apply_headers(req).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProposalError::Store(format!(
                "backend returned {}: {}",
                status, body
            )));
        }
        Ok(response.json()?)
    }
}

impl RecordStore for HttpStore {
    fn list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        options: &ListOptions,
    ) -> Result<RecordPage, ProposalError> {
        log::debug!("list {} page={} perPage={}", collection, page, per_page);
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
        ];
        if let Some(filter) = &options.filter {
            query.push(("filter", filter.clone()));
        }
        if let Some(sort) = &options.sort {
            query.push(("sort", sort.clone()));
        }

        let body = self.execute(self.client.get(self.records_url(collection)).query(&query))?;

        let items = body
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(RecordPage {
            page: body.get("page").and_then(Value::as_u64).unwrap_or(page as u64) as u32,
            per_page: body
                .get("perPage")
                .and_then(Value::as_u64)
                .unwrap_or(per_page as u64) as u32,
            total_items: body
                .get("totalItems")
                .and_then(Value::as_u64)
                .unwrap_or(items.len() as u64),
            items,
        })
    }

    fn create(&self, collection: &str, body: &Value) -> Result<Value, ProposalError> {
        log::debug!("create {}", collection);
        self.execute(self.client.post(self.records_url(collection)).json(body))
    }

    fn update(&self, collection: &str, id: &str, body: &Value) -> Result<Value, ProposalError> {
        log::debug!("update {}/{}", collection, id);
        let url = format!("{}/{}", self.records_url(collection), id);
        self.execute(self.client.patch(url).json(body))
    }
}
