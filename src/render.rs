//! Rendering an [`ExtractionResult`] into display text.
//!
//! [`ResultView`] is what a results screen binds to: summary cards, the
//! line-item table and the raw JSON block, all already resolved to strings
//! with placeholders for absent values. [`ResultView::to_text`] lays the
//! same view out for a terminal.

use crate::output::{display_or, ExtractionResult, LineItem};
use serde::Serialize;
use std::fmt;

/// Shown when the vendor could not be extracted.
pub const VENDOR_FALLBACK: &str = "Not Found";
/// Shown for every other absent field.
pub const FIELD_FALLBACK: &str = "-";
/// Single row shown when the invoice has no line items.
pub const NO_ITEMS_PLACEHOLDER: &str = "No line items detected";

const ITEM_HEADERS: [&str; 4] = ["Item", "Qty", "Rate", "Amount"];

/// Summary fields, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub vendor: String,
    pub invoice_number: String,
    pub gst_number: String,
    pub invoice_date: String,
    pub total: String,
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    pub item_name: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

impl ItemRow {
    fn from_item(item: &LineItem) -> Self {
        Self {
            item_name: display_or(item.item_name.as_ref(), FIELD_FALLBACK),
            quantity: display_or(item.quantity.as_ref(), FIELD_FALLBACK),
            rate: display_or(item.rate.as_ref(), FIELD_FALLBACK),
            amount: display_or(item.amount.as_ref(), FIELD_FALLBACK),
        }
    }

    /// Cells in column order: item, quantity, rate, amount.
    pub fn cells(&self) -> [&str; 4] {
        [&self.item_name, &self.quantity, &self.rate, &self.amount]
    }
}

/// Body of the line-item table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ItemsTable {
    Rows(Vec<ItemRow>),
    /// No items: a single "no items" row spanning all columns.
    Placeholder,
}

impl ItemsTable {
    /// Number of rows displayed, counting the placeholder row.
    pub fn row_count(&self) -> usize {
        match self {
            ItemsTable::Rows(rows) => rows.len(),
            ItemsTable::Placeholder => 1,
        }
    }
}

/// Everything the results screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub summary: Summary,
    pub items: ItemsTable,
    /// Pretty-printed JSON of the whole result; the text the copy control copies.
    pub json: String,
}

impl ResultView {
    pub fn from_result(result: &ExtractionResult) -> Self {
        let summary = Summary {
            vendor: display_or(result.vendor_name.as_ref(), VENDOR_FALLBACK),
            invoice_number: display_or(result.invoice_number.as_ref(), FIELD_FALLBACK),
            gst_number: display_or(result.gst_number.as_ref(), FIELD_FALLBACK),
            invoice_date: display_or(result.invoice_date.as_ref(), FIELD_FALLBACK),
            total: match result.total_amount.as_ref() {
                Some(total) if total.is_present() => format!("${total}"),
                _ => FIELD_FALLBACK.to_string(),
            },
        };

        let items = if result.line_items.is_empty() {
            ItemsTable::Placeholder
        } else {
            ItemsTable::Rows(result.line_items.iter().map(ItemRow::from_item).collect())
        };

        Self {
            summary,
            items,
            json: result.to_pretty_json(),
        }
    }

    /// Terminal layout: summary block, aligned table, then the JSON.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;
        for (label, value) in [
            ("Vendor", &s.vendor),
            ("Invoice #", &s.invoice_number),
            ("GST #", &s.gst_number),
            ("Date", &s.invoice_date),
            ("Total", &s.total),
        ] {
            out.push_str(&format!("{:<11}{}\n", format!("{label}:"), value));
        }
        out.push('\n');
        out.push_str(&self.table_text());
        out.push('\n');
        out.push_str(&self.json);
        out.push('\n');
        out
    }

    fn table_text(&self) -> String {
        let mut widths = ITEM_HEADERS.map(|h| h.chars().count());
        if let ItemsTable::Rows(rows) = &self.items {
            for row in rows {
                for (w, cell) in widths.iter_mut().zip(row.cells()) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let line = |cells: [&str; 4]| {
            let mut l = format!("{:<w$}", cells[0], w = widths[0]);
            for (cell, &w) in cells[1..].iter().zip(&widths[1..]) {
                l.push_str(&format!("  {cell:>w$}"));
            }
            l.trim_end().to_string() + "\n"
        };

        let total_width: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        let mut out = line(ITEM_HEADERS);
        out.push_str(&"─".repeat(total_width));
        out.push('\n');
        match &self.items {
            ItemsTable::Rows(rows) => {
                for row in rows {
                    out.push_str(&line(row.cells()));
                }
            }
            ItemsTable::Placeholder => {
                let pad = total_width.saturating_sub(NO_ITEMS_PLACEHOLDER.len()) / 2;
                out.push_str(&format!("{}{}\n", " ".repeat(pad), NO_ITEMS_PLACEHOLDER));
            }
        }
        out
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
