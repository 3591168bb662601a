//! Ledger records shared by the store, the receipt renderer and the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, DEFAULT_POLICIES};
use crate::types::{Channel, Provider};

// ---------------------------------------------------------------------------
// Remittance
// ---------------------------------------------------------------------------

/// A recorded money transfer. Never updated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Remittance {
    /// Storage row id.
    pub id: i64,
    /// Sequential receipt number, distinct from `id`.
    pub internal_id: i64,
    pub provider: Provider,
    pub channel: Channel,
    /// Principal in MRU.
    pub amount_mru: Decimal,
    pub dest_country: String,
    pub dest_currency: String,
    /// Provider-issued reference (MTCN, PIN...).
    pub tracking: String,
    pub fee: Decimal,
    pub provider_fee: Decimal,
    pub total: Decimal,
    /// PNG data URL of the QR code encoding `internal_id`.
    pub qr: String,
    /// User id of the staff member who recorded it.
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// A validated submission, ready to be priced and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemittance {
    pub provider: Provider,
    pub channel: Channel,
    pub amount_mru: Decimal,
    pub dest_country: String,
    pub dest_currency: String,
    pub tracking: String,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Office identity and overhead. Exactly one row exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub office_name: String,
    pub address: String,
    pub phone: String,
    pub logo_url: Option<String>,
    /// Printed on the customer copy of every receipt.
    pub policies: String,
    /// Subtracted from total commission to get the dashboard "net".
    pub monthly_expense: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            office_name: APP_NAME.to_string(),
            address: String::new(),
            phone: String::new(),
            logo_url: None,
            policies: DEFAULT_POLICIES.to_string(),
            monthly_expense: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Records created since the start of the current day.
    pub today: i64,
    /// Records created since the start of the current month.
    pub this_month: i64,
    /// Sum of `fee` over every record.
    pub total_commission: Decimal,
    pub monthly_expense: Decimal,
    /// `total_commission - monthly_expense`.
    pub net: Decimal,
}

impl DashboardSummary {
    pub fn new(today: i64, this_month: i64, total_commission: Decimal, monthly_expense: Decimal) -> Self {
        Self {
            today,
            this_month,
            total_commission,
            monthly_expense,
            net: total_commission - monthly_expense,
        }
    }
}
