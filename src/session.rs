//! # Editor session
//!
//! Owns one proposal document plus its store identity and funnels every
//! edit through the model's patch path. Editing and the HTML preview are
//! free; saving and PDF export are gated on a signed-in user with an
//! active subscription. A gated call from anyone else gets a typed error
//! and the document stays untouched.

use crate::auth::{subscription_is_active, AuthProvider, User};
use crate::error::ProposalError;
use crate::logo::Logo;
use crate::model::items::{self, ItemField};
use crate::model::{ProposalData, ProposalPatch, Totals};
use crate::store::{
    decode_proposal, encode_proposal, record_id, ListOptions, RecordStore, CLIENTS, COMPANIES,
    PROPOSALS,
};
use crate::{pdf, preview, view};
use serde_json::Value;

pub struct EditorSession<S: RecordStore, A: AuthProvider> {
    store: S,
    auth: A,
    data: ProposalData,
    /// Store record backing this document, once saved or loaded.
    record_id: Option<String>,
}

/// A saved proposal as shown in the load picker.
#[derive(Debug, Clone)]
pub struct SavedProposal {
    pub id: String,
    pub data: ProposalData,
}

impl<S: RecordStore, A: AuthProvider> EditorSession<S, A> {
    /// Start a session on the default document.
    pub fn new(store: S, auth: A) -> Self {
        Self {
            store,
            auth,
            data: ProposalData::sample(),
            record_id: None,
        }
    }

    pub fn data(&self) -> &ProposalData {
        &self.data
    }

    pub fn totals(&self) -> Totals {
        self.data.totals()
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Start over on a fresh default document, detached from any record.
    pub fn load_new(&mut self) {
        self.data = ProposalData::sample();
        self.record_id = None;
    }

    // ---- edits ------------------------------------------------------------

    pub fn apply(&mut self, patch: ProposalPatch) {
        self.data = self.data.apply(patch);
    }

    /// Switch currency by code. Unknown codes leave the document alone.
    pub fn set_currency(&mut self, code: &str) {
        match ProposalData::currency_patch(code) {
            Some(patch) => self.apply(patch),
            None => log::warn!("unknown currency code {:?}", code),
        }
    }

    pub fn set_tax_rate(&mut self, input: &str) {
        self.apply(ProposalPatch {
            tax_rate: Some(items::parse_number(input)),
            ..Default::default()
        });
    }

    pub fn add_item(&mut self) {
        let next = items::add(&self.data.line_items);
        self.apply(ProposalPatch {
            line_items: Some(next),
            ..Default::default()
        });
    }

    pub fn update_item(&mut self, id: &str, field: ItemField) {
        let next = items::update(&self.data.line_items, id, field);
        self.apply(ProposalPatch {
            line_items: Some(next),
            ..Default::default()
        });
    }

    pub fn remove_item(&mut self, id: &str) {
        let next = items::remove(&self.data.line_items, id);
        self.apply(ProposalPatch {
            line_items: Some(next),
            ..Default::default()
        });
    }

    /// Move an item to the position another item currently occupies.
    pub fn reorder_item(&mut self, from_id: &str, to_id: &str) {
        let next = items::reorder(&self.data.line_items, from_id, to_id);
        self.apply(ProposalPatch {
            line_items: Some(next),
            ..Default::default()
        });
    }

    /// Attach an uploaded logo. On failure the previous logo (or its
    /// absence) is kept and the error is returned for display.
    pub fn attach_logo(&mut self, media_type: &str, bytes: &[u8]) -> Result<(), ProposalError> {
        let logo = Logo::from_upload(media_type, bytes)?;
        let mut business = self.data.business_info.clone();
        business.logo = Some(logo);
        self.apply(ProposalPatch {
            business_info: Some(business),
            ..Default::default()
        });
        Ok(())
    }

    pub fn remove_logo(&mut self) {
        let mut business = self.data.business_info.clone();
        business.logo = None;
        self.apply(ProposalPatch {
            business_info: Some(business),
            ..Default::default()
        });
    }

    // ---- rendering --------------------------------------------------------

    pub fn preview_html(&self) -> Result<String, ProposalError> {
        preview::render_html(&self.data)
    }

    /// Render the PDF, paired with its download filename. Export is a
    /// pro feature; the preview is where free users see the document.
    pub fn export_pdf(&self) -> Result<(String, Vec<u8>), ProposalError> {
        self.require_pro_user()?;
        pdf::export(&self.data)
    }

    pub fn export_filename(&self) -> String {
        view::export_filename(&self.data)
    }

    // ---- persistence ------------------------------------------------------

    fn require_pro_user(&self) -> Result<User, ProposalError> {
        let user = self.auth.current_user().ok_or(ProposalError::NotSignedIn)?;
        if !subscription_is_active(&self.store, &user.id)? {
            return Err(ProposalError::SubscriptionRequired);
        }
        Ok(user)
    }

    /// Save the document: creates a record on first save, updates the same
    /// record afterwards. Concurrent saves of the same record are
    /// last-write-wins; the store keeps no versions.
    pub fn save_proposal(&mut self) -> Result<String, ProposalError> {
        let user = self.require_pro_user()?;
        let body = encode_proposal(&self.data, &user.id)?;
        let record = match &self.record_id {
            Some(id) => self.store.update(PROPOSALS, id, &body)?,
            None => self.store.create(PROPOSALS, &body)?,
        };
        let id = record_id(&record)
            .ok_or_else(|| ProposalError::Store("record missing id".to_string()))?
            .to_string();
        self.record_id = Some(id.clone());
        log::debug!("saved proposal {}", id);
        Ok(id)
    }

    /// The signed-in user's saved proposals, newest first. Records that no
    /// longer decode are skipped rather than failing the whole listing.
    pub fn list_proposals(&self) -> Result<Vec<SavedProposal>, ProposalError> {
        let user = self.require_pro_user()?;
        let options = ListOptions {
            filter: Some(format!("user = \"{}\"", user.id)),
            sort: Some("-created".to_string()),
        };
        let page = self.store.list(PROPOSALS, 1, 50, &options)?;
        let mut saved = Vec::with_capacity(page.items.len());
        for item in &page.items {
            let Some(id) = record_id(item) else { continue };
            match decode_proposal(item) {
                Ok(data) => saved.push(SavedProposal {
                    id: id.to_string(),
                    data,
                }),
                Err(err) => log::warn!("skipping undecodable proposal {}: {}", id, err),
            }
        }
        Ok(saved)
    }

    /// Replace the working document with a saved one; subsequent saves
    /// update that record.
    pub fn load_proposal(&mut self, id: &str) -> Result<(), ProposalError> {
        let record = self.find_record(PROPOSALS, id)?;
        self.data = decode_proposal(&record)?;
        self.record_id = Some(id.to_string());
        Ok(())
    }

    /// Save the current business details as a reusable company record.
    pub fn save_company(&self) -> Result<String, ProposalError> {
        let user = self.require_pro_user()?;
        let body = tag_user(serde_json::to_value(&self.data.business_info)?, &user.id);
        let record = self.store.create(COMPANIES, &body)?;
        record_id(&record)
            .map(str::to_string)
            .ok_or_else(|| ProposalError::Store("record missing id".to_string()))
    }

    /// Save the current client details as a reusable client record.
    pub fn save_client(&self) -> Result<String, ProposalError> {
        let user = self.require_pro_user()?;
        let body = tag_user(serde_json::to_value(&self.data.client_info)?, &user.id);
        let record = self.store.create(CLIENTS, &body)?;
        record_id(&record)
            .map(str::to_string)
            .ok_or_else(|| ProposalError::Store("record missing id".to_string()))
    }

    /// Apply a saved company record to the document's business details.
    pub fn load_company(&mut self, id: &str) -> Result<(), ProposalError> {
        let record = self.find_record(COMPANIES, id)?;
        let business = serde_json::from_value(strip_bookkeeping(record))?;
        self.apply(ProposalPatch {
            business_info: Some(business),
            ..Default::default()
        });
        Ok(())
    }

    /// Apply a saved client record to the document's client details.
    pub fn load_client(&mut self, id: &str) -> Result<(), ProposalError> {
        let record = self.find_record(CLIENTS, id)?;
        let client = serde_json::from_value(strip_bookkeeping(record))?;
        self.apply(ProposalPatch {
            client_info: Some(client),
            ..Default::default()
        });
        Ok(())
    }

    /// Fetch one of the caller's records by id. Filtering on the id keeps
    /// the lookup independent of how many records the collection holds.
    fn find_record(&self, collection: &str, id: &str) -> Result<Value, ProposalError> {
        let user = self.require_pro_user()?;
        let options = ListOptions {
            filter: Some(format!("id = \"{}\" && user = \"{}\"", id, user.id)),
            sort: None,
        };
        let page = self.store.list(collection, 1, 1, &options)?;
        page.items
            .into_iter()
            .next()
            .ok_or_else(|| ProposalError::NotFound(format!("{}/{}", collection, id)))
    }

    pub fn sign_out(&mut self) {
        self.auth.sign_out();
    }
}

fn tag_user(mut value: Value, user_id: &str) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert("user".to_string(), Value::String(user_id.to_string()));
    }
    value
}

fn strip_bookkeeping(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        for key in ["id", "user", "created", "updated", "collectionId", "collectionName"] {
            map.remove(key);
        }
    }
    value
}
