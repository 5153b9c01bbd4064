//! # Receipt Renderer
//!
//! Lays a persisted [`Sale`] out as fixed-width text for a thermal printer or
//! a plain-text preview. Rendering is side-effect free: the same sale and the
//! same store header always produce the same bytes.
//!
//! ## Layout (32 columns)
//! ```text
//!         Atelier Fashion
//!     Your Trusted Fashion Store
//!        Tel: +94 11 234 5678
//! --------------------------------
//! Receipt No:            ATL000001
//! Date:                 2026-03-14
//! Time:                   10:42:07
//! --------------------------------
//! ITEMS:
//! Linen Shirt
//!   2 x Rs. 2.50         Rs. 5.00
//! --------------------------------
//! Subtotal:             Rs. 10.00
//! Discount (Ten):       - Rs. 1.00
//! TOTAL:                 Rs. 9.00
//! --------------------------------
//! Payment Method:             CASH
//! Amount Paid:          Rs. 10.00
//! Change:                Rs. 1.00
//! --------------------------------
//!  Thank you for shopping with us!
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Sale;

/// Narrowest layout that still fits a label and an amount side by side.
pub const MIN_RECEIPT_WIDTH: usize = 24;

pub const DEFAULT_RECEIPT_WIDTH: usize = 32;

/// Store identity printed above and below every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHeader {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_footer")]
    pub footer: String,
}

fn default_footer() -> String {
    "Thank you for shopping with us!".to_string()
}

impl StoreHeader {
    pub fn named(name: impl Into<String>) -> Self {
        StoreHeader {
            name: name.into(),
            tagline: None,
            phone: None,
            address: None,
            footer: default_footer(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    header: StoreHeader,
    currency_symbol: String,
    width: usize,
}

impl ReceiptRenderer {
    pub fn new(header: StoreHeader, currency_symbol: impl Into<String>, width: usize) -> Self {
        ReceiptRenderer {
            header,
            currency_symbol: currency_symbol.into(),
            width: width.max(MIN_RECEIPT_WIDTH),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Renders the receipt. Every line is at most `width` characters and
    /// the text ends with a newline.
    pub fn render(&self, sale: &Sale) -> String {
        let mut out = Vec::new();
        let rule = "-".repeat(self.width);

        out.push(self.center(&self.header.name));
        for text in [&self.header.tagline, &self.header.address]
            .into_iter()
            .flatten()
        {
            out.push(self.center(text));
        }
        if let Some(phone) = &self.header.phone {
            out.push(self.center(&format!("Tel: {}", phone)));
        }
        out.push(rule.clone());

        out.push(self.columns("Receipt No:", &sale.receipt_number));
        out.push(self.columns("Date:", &sale.created_at.format("%Y-%m-%d").to_string()));
        out.push(self.columns("Time:", &sale.created_at.format("%H:%M:%S").to_string()));
        out.push(rule.clone());

        out.push("ITEMS:".to_string());
        for line in &sale.items {
            out.push(self.truncate(&line.name));
            let detail = format!("  {} x {}", line.quantity, self.money(line.price));
            out.extend(self.columns_wrapped(&detail, &self.money(line.total)));
        }
        out.push(rule.clone());

        out.push(self.columns("Subtotal:", &self.money(sale.subtotal)));
        if let Some(discount) = &sale.discount {
            let label = format!("Discount ({}):", discount.name);
            let amount = format!("- {}", self.money(discount.amount));
            out.extend(self.columns_wrapped(&label, &amount));
        }
        out.push(self.columns("TOTAL:", &self.money(sale.total)));
        out.push(rule.clone());

        out.push(self.columns(
            "Payment Method:",
            &sale.payment_method.as_str().to_uppercase(),
        ));
        out.push(self.columns("Amount Paid:", &self.money(sale.amount_paid)));
        out.push(self.columns("Change:", &self.money(sale.change)));
        out.push(rule);

        out.push(self.center(&self.header.footer));
        out.push(self.center(&self.header.name));

        let mut text = out.join("\n");
        text.push('\n');
        text
    }

    // =========================================================================
    // Layout helpers
    // =========================================================================

    fn money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }

    fn truncate(&self, text: &str) -> String {
        text.chars().take(self.width).collect()
    }

    fn center(&self, text: &str) -> String {
        let text = self.truncate(text);
        let pad = (self.width - text.chars().count()) / 2;
        format!("{}{}", " ".repeat(pad), text)
    }

    /// Label on the left, value flush right. Overlong pairs are truncated
    /// on the label side.
    fn columns(&self, left: &str, right: &str) -> String {
        let right = self.truncate(right);
        let room = self.width - right.chars().count();
        let left: String = left.chars().take(room.saturating_sub(1)).collect();
        let gap = room - left.chars().count();
        format!("{}{}{}", left, " ".repeat(gap), right)
    }

    /// Like [`columns`](Self::columns) but moves the value to its own line
    /// instead of cutting the label.
    fn columns_wrapped(&self, left: &str, right: &str) -> Vec<String> {
        if left.chars().count() + right.chars().count() < self.width {
            vec![self.columns(left, right)]
        } else {
            vec![self.truncate(left), self.columns("", right)]
        }
    }
}
