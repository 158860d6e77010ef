// libs/shared/models/src/clinic.rs
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub email: Option<String>,
    /// Account discount in percent (0-100), seeded into new invoices.
    pub discount_percent: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub room: Option<String>,
    pub is_active: bool,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("Dr. {} {}", self.last_name, self.first_name)
    }
}

/// A billable service from the clinic's catalog. `price` is the live price;
/// invoice lines snapshot it at the moment they are added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogService {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub default_duration_minutes: i32,
}
