// libs/billing-cell/src/models.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub appointment_id: Uuid,
    pub created_by: Option<Uuid>,
    /// Overrides the discount inherited from the patient's account.
    pub discount_percent: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLineRequest {
    pub service_id: Uuid,
    pub quantity: i32,
    /// Explicit price snapshot. When absent (or zero) the service's current
    /// catalog price is snapshotted instead.
    pub price_at_time: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub discount_percent: Option<i32>,
    pub is_paid: Option<bool>,
    /// Always rejected: `final_amount` is derived, never written by callers.
    pub final_amount: Option<Decimal>,
}

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("invoice {0} not found")]
    InvoiceNotFound(Uuid),

    #[error("appointment {0} not found")]
    AppointmentNotFound(Uuid),

    #[error("service {0} not found")]
    ServiceNotFound(Uuid),

    #[error("invoice line {0} not found")]
    LineNotFound(Uuid),

    #[error("appointment {0} has no invoice")]
    NoInvoiceForAppointment(Uuid),

    #[error("appointment {0} already has an invoice")]
    DuplicateInvoice(Uuid),

    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    #[error("discount must be between 0 and 100 percent, got {0}")]
    InvalidDiscount(i32),

    #[error("final amount is derived from the total and discount and cannot be set directly")]
    FinalAmountReadOnly,
}
