//! # Formatted view model
//!
//! One pre-formatted snapshot of a proposal that both renderers consume.
//! All money formatting, placeholder substitution, and contact-line
//! assembly happens here exactly once, so the HTML preview and the PDF
//! cannot drift apart on display rules.

use crate::model::ProposalData;
use serde::Serialize;

/// Placeholder shown where a required display field is empty.
pub const EMPTY_FIELD: &str = "\u{2014}";

/// A proposal flattened into display strings.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalView {
    /// Proposal number as entered, possibly empty.
    pub number: String,
    pub date: String,
    pub valid_until: String,
    /// Logo source (data URI) if one is attached.
    pub logo: Option<String>,
    pub business_name: String,
    pub from_lines: Vec<String>,
    pub client_name: String,
    pub to_lines: Vec<String>,
    pub items: Vec<LineItemView>,
    pub subtotal: String,
    /// Present only when the tax rate is above zero.
    pub tax: Option<TaxLine>,
    /// Currency code, symbol, and amount, e.g. `USD $3740.00`.
    pub grand_total: String,
    pub notes: String,
    pub terms: String,
    pub footer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItemView {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub total: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxLine {
    /// e.g. `Tax (10%)`; renderers add their own trailing punctuation.
    pub label: String,
    pub amount: String,
}

impl ProposalView {
    pub fn of(data: &ProposalData) -> ProposalView {
        let totals = data.totals();
        let sym = &data.currency_symbol;

        let tax = if data.tax_rate > 0.0 {
            Some(TaxLine {
                label: format!("Tax ({}%)", number_display(data.tax_rate)),
                amount: money(sym, totals.tax_amount),
            })
        } else {
            None
        };

        ProposalView {
            number: data.proposal_number.clone(),
            date: data.proposal_date.clone(),
            valid_until: data.valid_until.clone(),
            logo: data
                .business_info
                .logo
                .as_ref()
                .map(|l| l.as_source().to_string()),
            business_name: or_dash(&data.business_info.name),
            from_lines: contact_lines(
                &data.business_info.email,
                &data.business_info.phone,
                &data.business_info.address,
                &data.business_info.city,
                &data.business_info.country,
                &data.business_info.website,
            ),
            client_name: or_dash(&data.client_info.name),
            to_lines: contact_lines(
                &data.client_info.email,
                &data.client_info.phone,
                &data.client_info.address,
                &data.client_info.city,
                &data.client_info.country,
                "",
            ),
            items: data
                .line_items
                .iter()
                .map(|item| LineItemView {
                    description: or_dash(&item.description),
                    quantity: number_display(item.quantity),
                    unit_price: money(sym, item.unit_price),
                    total: money(sym, item.total),
                })
                .collect(),
            subtotal: money(sym, totals.subtotal),
            tax,
            grand_total: format!(
                "{} {}",
                data.currency,
                money(sym, totals.grand_total)
            ),
            notes: data.notes.clone(),
            terms: data.terms.clone(),
            footer: format!(
                "Generated by Proposely \u{2014} {}",
                data.business_info.name
            ),
        }
    }
}

/// Download filename: `proposal-{number}-{client}.pdf`, lowercased with
/// whitespace runs collapsed to hyphens. Empty fields fall back to
/// `draft` and `client`.
pub fn export_filename(data: &ProposalData) -> String {
    let number = if data.proposal_number.is_empty() {
        "draft"
    } else {
        &data.proposal_number
    };
    let client = if data.client_info.name.is_empty() {
        "client"
    } else {
        &data.client_info.name
    };
    let raw = format!("proposal-{}-{}.pdf", number, client).to_lowercase();
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_gap {
                out.push('-');
                in_gap = true;
            }
        } else {
            out.push(ch);
            in_gap = false;
        }
    }
    out
}

/// Amount with the currency symbol and two decimals, no grouping.
fn money(symbol: &str, amount: f64) -> String {
    format!("{}{:.2}", symbol, amount)
}

/// A number the way the editor shows it: integers without a decimal
/// point, fractions as entered (`10` not `10.0`, `8.5` stays `8.5`).
fn number_display(value: f64) -> String {
    format!("{}", value)
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        EMPTY_FIELD.to_string()
    } else {
        value.to_string()
    }
}

/// Contact block lines: each populated field on its own line, with city
/// and country joined as one line. Pass an empty website to skip it.
fn contact_lines(
    email: &str,
    phone: &str,
    address: &str,
    city: &str,
    country: &str,
    website: &str,
) -> Vec<String> {
    let mut lines = Vec::new();
    for field in [email, phone, address] {
        if !field.is_empty() {
            lines.push(field.to_string());
        }
    }
    if !city.is_empty() || !country.is_empty() {
        let joined: Vec<&str> = [city, country]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        lines.push(joined.join(", "));
    }
    if !website.is_empty() {
        lines.push(website.to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientInfo, LineItem, ProposalData};

    fn base() -> ProposalData {
        ProposalData::sample()
    }

    #[test]
    fn test_sample_totals_formatting() {
        let view = ProposalView::of(&base());
        assert_eq!(view.subtotal, "$3400.00");
        let tax = view.tax.expect("sample has 10% tax");
        assert_eq!(tax.label, "Tax (10%)");
        assert_eq!(tax.amount, "$340.00");
        assert_eq!(view.grand_total, "USD $3740.00");
    }

    #[test]
    fn test_zero_tax_omits_tax_line() {
        let mut data = base();
        data.tax_rate = 0.0;
        assert!(ProposalView::of(&data).tax.is_none());
    }

    #[test]
    fn test_fractional_tax_rate_label() {
        let mut data = base();
        data.tax_rate = 8.5;
        let view = ProposalView::of(&data);
        assert_eq!(view.tax.unwrap().label, "Tax (8.5%)");
    }

    #[test]
    fn test_integer_quantity_has_no_decimal_point() {
        let view = ProposalView::of(&base());
        assert_eq!(view.items[0].quantity, "1");
        assert_eq!(view.items[1].quantity, "20");
    }

    #[test]
    fn test_empty_names_become_dashes() {
        let mut data = base();
        data.business_info.name.clear();
        data.client_info = ClientInfo::default();
        let view = ProposalView::of(&data);
        assert_eq!(view.business_name, EMPTY_FIELD);
        assert_eq!(view.client_name, EMPTY_FIELD);
        assert!(view.to_lines.is_empty());
    }

    #[test]
    fn test_city_country_join_on_one_line() {
        let mut data = base();
        data.client_info.city = "Oslo".to_string();
        data.client_info.country = "Norway".to_string();
        let view = ProposalView::of(&data);
        assert_eq!(view.to_lines.last().unwrap(), "Oslo, Norway");

        data.client_info.country.clear();
        let view = ProposalView::of(&data);
        assert_eq!(view.to_lines.last().unwrap(), "Oslo");
    }

    #[test]
    fn test_item_display_formats() {
        let mut data = base();
        data.line_items = vec![LineItem::new("1", "", 2.5, 10.0)];
        let view = ProposalView::of(&data);
        assert_eq!(view.items[0].description, EMPTY_FIELD);
        assert_eq!(view.items[0].quantity, "2.5");
        assert_eq!(view.items[0].unit_price, "$10.00");
        assert_eq!(view.items[0].total, "$25.00");
    }

    #[test]
    fn test_export_filename_rules() {
        let mut data = base();
        data.proposal_number = "PRO-001".to_string();
        data.client_info.name = "Acme Corp".to_string();
        assert_eq!(export_filename(&data), "proposal-pro-001-acme-corp.pdf");

        data.proposal_number.clear();
        data.client_info.name.clear();
        assert_eq!(export_filename(&data), "proposal-draft-client.pdf");
    }

    #[test]
    fn test_export_filename_collapses_whitespace_runs() {
        let mut data = base();
        data.proposal_number = "P  1".to_string();
        data.client_info.name = "Big\tClient Co".to_string();
        assert_eq!(export_filename(&data), "proposal-p-1-big-client-co.pdf");
    }

    #[test]
    fn test_footer_carries_business_name() {
        let mut data = base();
        data.business_info.name = "Studio North".to_string();
        let view = ProposalView::of(&data);
        assert_eq!(view.footer, "Generated by Proposely \u{2014} Studio North");
    }
}
