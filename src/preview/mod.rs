//! # HTML preview
//!
//! Renders the proposal as a standalone styled HTML document through an
//! embedded Tera template. The preview is a faithful on-screen rendition,
//! not a print-fidelity one: it reads the same
//! [`ProposalView`](crate::view::ProposalView) as the PDF layout but does
//! its own flow layout in the browser.

use crate::error::ProposalError;
use crate::model::ProposalData;
use crate::view::ProposalView;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "proposal.html";
const TEMPLATE: &str = include_str!("../../templates/proposal.html.tera");

/// Render the proposal to a self-contained HTML page.
pub fn render_html(data: &ProposalData) -> Result<String, ProposalError> {
    let view = ProposalView::of(data);
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
    let context = Context::from_serialize(&view)?;
    Ok(tera.render(TEMPLATE_NAME, &context)?)
}
