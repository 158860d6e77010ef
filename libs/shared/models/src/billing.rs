// libs/shared/models/src/billing.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoice owned one-to-one by an appointment's billing context.
///
/// `final_amount` is derived from `total_amount` and `discount_percent`;
/// callers never write it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub total_amount: Decimal,
    pub discount_percent: i32,
    pub final_amount: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One billed service occurrence on an invoice.
///
/// `price_at_time` is a snapshot of the catalog price at the moment the line
/// was added and is never recomputed from the catalog afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
    pub price_at_time: Decimal,
}
