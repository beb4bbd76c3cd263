//! # Proposal Document Model
//!
//! The single source of truth for an editing session. One `ProposalData`
//! value is edited interactively, rendered as an HTML preview, and laid out
//! onto a PDF page — all three read the same structure, and the derived
//! money values (subtotal, tax, grand total) are recomputed from it on
//! every read rather than cached.
//!
//! Field names serialize in camelCase so the wire shape matches the store's
//! records verbatim.
//!
//! Mutation is copy-on-write: edits build a [`ProposalPatch`] and call
//! [`ProposalData::apply`], which returns a fresh document and leaves the
//! input untouched. That keeps the preview and PDF consumers free of
//! aliasing surprises and makes before/after comparison trivial.

pub mod currency;
pub mod items;

use crate::logo::Logo;
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The issuing party. Only the business side carries a website and a logo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub website: String,
    /// `None` is the explicit "no logo" state — distinct from an empty
    /// string, so clearing a logo is representable without sentinel values.
    #[serde(default)]
    pub logo: Option<Logo>,
}

/// The receiving party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// One billable row.
///
/// `total` is stored redundantly but is never edited directly: every path
/// that changes `quantity` or `unit_price` recomputes it (see
/// [`items::update`]). At rest it always equals `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Opaque client-generated token, stable across reorders and edits.
    /// Only ever compared for equality within one in-memory collection.
    pub id: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl LineItem {
    pub fn new(id: impl Into<String>, description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }
}

/// The aggregate root: everything a proposal document contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalData {
    /// Display string; not guaranteed unique or sequential.
    pub proposal_number: String,
    /// ISO date string (`YYYY-MM-DD`).
    pub proposal_date: String,
    /// ISO date string (`YYYY-MM-DD`).
    pub valid_until: String,
    /// 3-letter code. Kept in lockstep with `currency_symbol` — the only
    /// way to change either is [`currency::Currency::lookup`] + a patch
    /// carrying both.
    pub currency: String,
    pub currency_symbol: String,
    pub business_info: BusinessInfo,
    pub client_info: ClientInfo,
    /// Ordered: this is the print/display order, user-reorderable.
    pub line_items: Vec<LineItem>,
    /// Flat percentage, 0–100 expected but not enforced.
    pub tax_rate: f64,
    pub notes: String,
    pub terms: String,
}

/// Derived money values. Never stored — recomputed from the line items and
/// tax rate on every read so no edit can leave a stale aggregate behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
}

/// Pure derived-value computation. Rounding happens only at display time;
/// the raw floating-point values are returned untouched so repeated edits
/// cannot compound rounding error.
pub fn compute_totals(line_items: &[LineItem], tax_rate: f64) -> Totals {
    let subtotal: f64 = line_items.iter().map(|item| item.total).sum();
    let tax_amount = subtotal * tax_rate / 100.0;
    Totals {
        subtotal,
        tax_amount,
        grand_total: subtotal + tax_amount,
    }
}

/// A partial update: `Some` fields replace, `None` fields are retained
/// verbatim. Mirrors the store's patch shape.
#[derive(Debug, Clone, Default)]
pub struct ProposalPatch {
    pub proposal_number: Option<String>,
    pub proposal_date: Option<String>,
    pub valid_until: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub business_info: Option<BusinessInfo>,
    pub client_info: Option<ClientInfo>,
    pub line_items: Option<Vec<LineItem>>,
    pub tax_rate: Option<f64>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

impl ProposalData {
    /// The document a fresh session starts from: empty parties, two sample
    /// line items, dated today with a 30-day validity window.
    pub fn sample() -> Self {
        let today = Local::now().date_naive();
        Self::sample_dated(today)
    }

    /// Deterministic variant of [`ProposalData::sample`] for tests.
    pub fn sample_dated(today: NaiveDate) -> Self {
        let valid_until = today + Duration::days(30);
        Self {
            proposal_number: "PRO-001".to_string(),
            proposal_date: today.format("%Y-%m-%d").to_string(),
            valid_until: valid_until.format("%Y-%m-%d").to_string(),
            currency: "USD".to_string(),
            currency_symbol: "$".to_string(),
            business_info: BusinessInfo::default(),
            client_info: ClientInfo::default(),
            line_items: vec![
                LineItem::new("1", "Consulting services", 1.0, 1500.0),
                LineItem::new("2", "Design & development", 20.0, 95.0),
            ],
            tax_rate: 10.0,
            notes: String::new(),
            terms: "Payment due within 30 days of proposal acceptance.".to_string(),
        }
    }

    /// Derived totals for the current state.
    pub fn totals(&self) -> Totals {
        compute_totals(&self.line_items, self.tax_rate)
    }

    /// Return a new document with the patch's `Some` fields replaced.
    /// The input is never mutated.
    pub fn apply(&self, patch: ProposalPatch) -> ProposalData {
        let mut next = self.clone();
        if let Some(v) = patch.proposal_number {
            next.proposal_number = v;
        }
        if let Some(v) = patch.proposal_date {
            next.proposal_date = v;
        }
        if let Some(v) = patch.valid_until {
            next.valid_until = v;
        }
        if let Some(v) = patch.currency {
            next.currency = v;
        }
        if let Some(v) = patch.currency_symbol {
            next.currency_symbol = v;
        }
        if let Some(v) = patch.business_info {
            next.business_info = v;
        }
        if let Some(v) = patch.client_info {
            next.client_info = v;
        }
        if let Some(v) = patch.line_items {
            next.line_items = v;
        }
        if let Some(v) = patch.tax_rate {
            next.tax_rate = v;
        }
        if let Some(v) = patch.notes {
            next.notes = v;
        }
        if let Some(v) = patch.terms {
            next.terms = v;
        }
        next
    }

    /// Patch carrying a currency change — code and symbol always together.
    pub fn currency_patch(code: &str) -> Option<ProposalPatch> {
        currency::Currency::lookup(code).map(|c| ProposalPatch {
            currency: Some(c.code.to_string()),
            currency_symbol: Some(c.symbol.to_string()),
            ..Default::default()
        })
    }
}

impl Default for ProposalData {
    fn default() -> Self {
        Self::sample()
    }
}
