//! # Proposely
//!
//! The core of a proposal and invoice builder: one proposal document,
//! edited through patches, rendered two independent ways.
//!
//! The HTML preview is a fast on-screen approximation; the PDF export is
//! the deliverable, laid out with fixed geometry by an in-crate writer
//! rather than by printing the preview. Both read the same formatted
//! view model, so display rules (placeholders, money formatting, the
//! conditional tax row) cannot drift between them.
//!
//! ## Architecture
//!
//! ```text
//! [model]    — the proposal document: parties, line items, totals
//! [view]     — formatted display snapshot shared by both renderers
//! [preview]  — HTML rendition via an embedded Tera template
//! [pdf]      — fixed-geometry A4 layout + from-scratch PDF 1.7 writer
//! [store]    — PocketBase-style record persistence behind a trait
//! [session]  — one editing session: edits, gating, save/load, export
//! ```

pub mod auth;
pub mod error;
pub mod logo;
pub mod model;
pub mod pdf;
pub mod preview;
pub mod session;
pub mod store;
pub mod text;
pub mod view;

pub use error::ProposalError;
pub use model::ProposalData;
pub use session::EditorSession;

/// Render a proposal to PDF bytes.
///
/// This is the primary entry point for export. The filename that goes
/// with the bytes comes from [`pdf::export`].
pub fn render_pdf(data: &ProposalData) -> Result<Vec<u8>, ProposalError> {
    pdf::render(data)
}

/// Render a proposal described as JSON to PDF bytes.
pub fn render_pdf_json(json: &str) -> Result<Vec<u8>, ProposalError> {
    let data: ProposalData = serde_json::from_str(json)?;
    render_pdf(&data)
}

/// Render the HTML preview of a proposal.
pub fn render_preview(data: &ProposalData) -> Result<String, ProposalError> {
    preview::render_html(data)
}
