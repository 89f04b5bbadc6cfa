//! # Loan Offers
//!
//! Wire records for the hosted `loan_offers` table.
//!
//! The hosted platform owns the data; we only hold transient copies per
//! country filter. Field names match the table columns so records pass
//! through serde unchanged in both directions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Countries the funnel serves. Closed set, no free-form codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Ua,
    Kz,
    Ru,
}

impl Country {
    pub fn as_str(self) -> &'static str {
        match self {
            Country::Ua => "ua",
            Country::Kz => "kz",
            Country::Ru => "ru",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "ua" => Some(Country::Ua),
            "kz" => Some(Country::Kz),
            "ru" => Some(Country::Ru),
            _ => None,
        }
    }
}

/// Admin-assigned estimate of how likely an application is to be approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalRating {
    High,
    Medium,
    Low,
}

impl ApprovalRating {
    pub fn label(self) -> &'static str {
        match self {
            ApprovalRating::High => "Высокая вероятность",
            ApprovalRating::Medium => "Средняя вероятность",
            ApprovalRating::Low => "Низкая вероятность",
        }
    }

    /// Badge color token for the frontend.
    pub fn color(self) -> &'static str {
        match self {
            ApprovalRating::High => "green",
            ApprovalRating::Medium => "yellow",
            ApprovalRating::Low => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOffer {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub country: Country,
    pub logo_url: Option<String>,
    pub min_amount: u32,
    pub max_amount: u32,
    pub rate: String,
    pub term: String,
    pub max_term_days: u32,
    pub approval_time: String,
    pub first_loan_free: bool,
    pub is_active: bool,
    pub display_order: i32,
    pub approval_rating: ApprovalRating,
}

/// Partial record for the batched reorder write. Only the identity and the
/// new rank go over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub display_order: i32,
}
