//! # Record store
//!
//! Persistence for proposals, companies, clients, and subscriptions.
//! The backend is a PocketBase-style record API spoken over HTTP; the
//! [`RecordStore`] trait is the seam, with [`http::HttpStore`] as the
//! real implementation and [`memory::MemoryStore`] as the test double.
//!
//! Records travel as loose JSON objects. Older proposal records carry
//! their nested structures (`businessInfo`, `clientInfo`, `lineItems`)
//! as JSON-encoded strings rather than objects, so decoding normalizes
//! both shapes before deserializing.

pub mod http;
pub mod memory;

use crate::error::ProposalError;
use crate::model::ProposalData;
use serde_json::Value;

pub const PROPOSALS: &str = "proposals";
pub const COMPANIES: &str = "companies";
pub const CLIENTS: &str = "clients";
pub const SUBSCRIPTIONS: &str = "subscriptions";

/// Query modifiers for a list call.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Backend filter expression, e.g. `user = "abc123"`.
    pub filter: Option<String>,
    /// Sort expression, e.g. `-created` for newest first.
    pub sort: Option<String>,
}

/// One page of records.
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub items: Vec<Value>,
}

/// The persistence seam. Collection names are the `*` constants above.
pub trait RecordStore {
    fn list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        options: &ListOptions,
    ) -> Result<RecordPage, ProposalError>;

    fn create(&self, collection: &str, body: &Value) -> Result<Value, ProposalError>;

    fn update(&self, collection: &str, id: &str, body: &Value) -> Result<Value, ProposalError>;
}

/// Decode a stored proposal record into the document model.
///
/// Normalizes string-encoded nested fields and a string-encoded tax rate
/// before deserializing, so records written by older clients load the
/// same as fresh ones.
pub fn decode_proposal(record: &Value) -> Result<ProposalData, ProposalError> {
    let mut normalized = record.clone();
    if let Value::Object(map) = &mut normalized {
        for key in ["businessInfo", "clientInfo", "lineItems"] {
            if let Some(Value::String(s)) = map.get(key) {
                let parsed: Value = serde_json::from_str(s)?;
                map.insert(key.to_string(), parsed);
            }
        }
        if let Some(Value::String(s)) = map.get("taxRate") {
            let rate: f64 = s.parse().unwrap_or(0.0);
            map.insert(
                "taxRate".to_string(),
                Value::from(rate),
            );
        }
        // Store bookkeeping fields are not part of the document.
        for key in ["id", "user", "created", "updated", "collectionId", "collectionName"] {
            map.remove(key);
        }
    }
    Ok(serde_json::from_value(normalized)?)
}

/// Encode a proposal for storage, tagged with its owning user.
pub fn encode_proposal(data: &ProposalData, user_id: &str) -> Result<Value, ProposalError> {
    let mut value = serde_json::to_value(data)?;
    if let Value::Object(map) = &mut value {
        map.insert("user".to_string(), Value::String(user_id.to_string()));
    }
    Ok(value)
}

/// The `id` field of a record, if present.
pub fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}
