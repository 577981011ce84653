//! # Receipt Value Object
//!
//! `ReceiptData` is everything a receipt renderer needs to print or
//! download a cupom. Rendering itself is an external concern; this
//! module only defines the frozen value handed over after checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::PaymentMethod;

/// One printed line on the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// Addon prices per unit, already summed.
    pub addon_total: Money,
    pub line_total: Money,
    pub note: Option<String>,
}

/// The complete receipt payload for a finished checkout.
///
/// All amounts are frozen copies; later catalog or session changes never
/// affect an issued receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    pub order_code: String,
    pub store_name: String,
    pub store_address: Option<String>,
    pub store_phone: Option<String>,
    pub attendant: String,
    pub customer_name: Option<String>,
    pub table_number: Option<String>,
    pub items: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub service_fee: Money,
    pub tip: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Present only for cash payments.
    pub cash_received: Option<Money>,
    /// Present only for cash payments.
    pub change: Option<Money>,
    pub created_at: DateTime<Utc>,
}
