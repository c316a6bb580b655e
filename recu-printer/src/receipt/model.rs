//! Receipt payload types
//!
//! Payloads arrive as JSON (snake_case keys). Shape problems are caught by
//! serde; value problems by [`ReceiptDocument::validate`]. Both happen before
//! any byte is rendered.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FormatResult, FormattingError};
use crate::layout::to_decimal;

/// Default unit shown on accommodation price lines
pub const DEFAULT_QUANTITY_UNIT: &str = "nuit(s)";

/// Largest accepted unit price or discount, in absolute value (FCFA)
const MAX_PRICE: f64 = 1_000_000_000_000.0;
/// Largest accepted line quantity
const MAX_QUANTITY: u32 = 99_999;

/// Amounts must be finite and within `MAX_PRICE` so money math cannot overflow
fn require_amount(value: f64, field: impl Into<String>) -> FormatResult<()> {
    if !value.is_finite() {
        return Err(FormattingError::invalid(
            field,
            format!("must be a finite number, got {}", value),
        ));
    }
    if value.abs() > MAX_PRICE {
        return Err(FormattingError::invalid(
            field,
            format!("exceeds maximum allowed ({}), got {}", MAX_PRICE, value),
        ));
    }
    Ok(())
}

/// Full receipt as sent by the client application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptDocument {
    #[serde(default)]
    pub header: Option<ReceiptHeader>,
    #[serde(default)]
    pub client_info: Option<String>,
    /// Multi-line, one printed line per `\n`
    #[serde(default)]
    pub room_info: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub change_info: Option<ChangeInfo>,
    #[serde(default)]
    pub footer: Option<ReceiptFooter>,
    #[serde(default)]
    pub stats: Option<ReceiptStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptHeader {
    pub business_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub receipt_number: Option<String>,
    pub date: Option<String>,
    /// Overrides the document type label
    pub order_type: Option<String>,
}

/// Kind of billed line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Accommodation,
    Food,
    Drink,
    Discount,
    #[default]
    #[serde(other)]
    Other,
}

/// One billed line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(rename = "price", alias = "unit_price", default)]
    pub unit_price: f64,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity_unit: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: f64, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            kind,
            category: None,
            quantity_unit: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// quantity × unit price
    pub fn total(&self) -> Decimal {
        to_decimal(self.unit_price) * Decimal::from(self.quantity)
    }

    pub fn unit_price(&self) -> Decimal {
        to_decimal(self.unit_price)
    }

    pub fn quantity_unit(&self) -> &str {
        self.quantity_unit
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_QUANTITY_UNIT)
    }

    /// Restaurant food, as opposed to other food-typed extras
    pub fn is_restaurant_food(&self) -> bool {
        self.kind == ItemKind::Food
            && self
                .category
                .as_deref()
                .is_some_and(|c| c == "Restaurant")
    }
}

/// Settlement state of change owed to the customer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Settled,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeInfo {
    /// Amount already formatted by the client
    pub formatted_amount: String,
    pub status_text: Option<String>,
    pub status: ChangeStatus,
    pub change_given: bool,
    pub change_given_at: Option<String>,
}

impl ChangeInfo {
    pub fn status_label(&self) -> &str {
        match self.status_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => match self.status {
                ChangeStatus::Pending => "En attente",
                ChangeStatus::Settled => "Rendue",
                ChangeStatus::Unknown => "-",
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptFooter {
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub thank_you_message: Option<String>,
    pub additional_message: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptStats {
    pub discount_amount: f64,
}

impl ReceiptDocument {
    /// Parse a JSON payload into a receipt
    pub fn from_json(payload: &str) -> FormatResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Parse an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> FormatResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Check every numeric field the layouts rely on
    pub fn validate(&self) -> FormatResult<()> {
        for (idx, item) in self.items.iter().enumerate() {
            let field = |name: &str| format!("items[{}].{}", idx, name);

            require_amount(item.unit_price, field("price"))?;
            if item.quantity > MAX_QUANTITY {
                return Err(FormattingError::invalid(
                    field("quantity"),
                    format!("exceeds maximum allowed ({}), got {}", MAX_QUANTITY, item.quantity),
                ));
            }
            // Discount lines carry their sign; everything else is a charge
            if item.kind != ItemKind::Discount && item.unit_price < 0.0 {
                return Err(FormattingError::invalid(
                    field("price"),
                    format!("must be non-negative, got {}", item.unit_price),
                ));
            }
        }

        if let Some(stats) = &self.stats {
            require_amount(stats.discount_amount, "stats.discount_amount")?;
        }

        Ok(())
    }

    /// Sum of all item totals
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(LineItem::total).sum()
    }

    /// Discount carried in stats (zero when absent)
    pub fn stats_discount(&self) -> Decimal {
        self.stats
            .as_ref()
            .map(|s| to_decimal(s.discount_amount))
            .unwrap_or_default()
    }
}

// ============================================================================
// Receipt type
// ============================================================================

/// Layout variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptType {
    #[default]
    Standard,
    Hotel,
    Mixed,
    Food,
    Drink,
}

impl ReceiptType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiptType::Standard => "standard",
            ReceiptType::Hotel => "hotel",
            ReceiptType::Mixed => "mixed",
            ReceiptType::Food => "food",
            ReceiptType::Drink => "drink",
        }
    }

    /// Parse, falling back to the standard layout for unknown names
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(receipt_type = name, "unknown receipt type, using standard layout");
            ReceiptType::Standard
        })
    }
}

impl fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ReceiptType::Standard),
            "hotel" => Ok(ReceiptType::Hotel),
            "mixed" => Ok(ReceiptType::Mixed),
            "food" => Ok(ReceiptType::Food),
            "drink" => Ok(ReceiptType::Drink),
            other => Err(format!("Unknown receipt type: {}", other)),
        }
    }
}
