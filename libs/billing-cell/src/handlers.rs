// libs/billing-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::ClinicStore;

use crate::models::{
    AddLineRequest, BillingError, CreateInvoiceRequest, UpdateInvoiceRequest, UpdateLineRequest,
};
use crate::services::invoice::InvoiceService;

#[axum::debug_handler]
pub async fn create_invoice(
    State(store): State<Arc<ClinicStore>>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InvoiceService::new(store);
    let invoice = service
        .create_invoice(request)
        .await
        .map_err(map_billing_error)?;

    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

#[axum::debug_handler]
pub async fn add_line(
    State(store): State<Arc<ClinicStore>>,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<AddLineRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InvoiceService::new(store);
    let invoice = service
        .add_line(invoice_id, request)
        .await
        .map_err(map_billing_error)?;

    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

#[axum::debug_handler]
pub async fn update_line(
    State(store): State<Arc<ClinicStore>>,
    Path(line_id): Path<Uuid>,
    Json(request): Json<UpdateLineRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InvoiceService::new(store);
    let invoice = service
        .update_line_quantity(line_id, request)
        .await
        .map_err(map_billing_error)?;

    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

#[axum::debug_handler]
pub async fn remove_line(
    State(store): State<Arc<ClinicStore>>,
    Path(line_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InvoiceService::new(store);
    let invoice = service
        .remove_line(line_id)
        .await
        .map_err(map_billing_error)?;

    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

#[axum::debug_handler]
pub async fn update_invoice(
    State(store): State<Arc<ClinicStore>>,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InvoiceService::new(store);
    let invoice = service
        .update_invoice(invoice_id, request)
        .await
        .map_err(map_billing_error)?;

    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

#[axum::debug_handler]
pub async fn mark_paid(
    State(store): State<Arc<ClinicStore>>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InvoiceService::new(store);
    let invoice = service
        .mark_paid(invoice_id)
        .await
        .map_err(map_billing_error)?;

    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

#[axum::debug_handler]
pub async fn recalculate_invoice(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InvoiceService::new(store);
    let invoice = service
        .recalculate(appointment_id)
        .await
        .map_err(map_billing_error)?;

    Ok(Json(json!({ "success": true, "invoice": invoice })))
}

fn map_billing_error(err: BillingError) -> AppError {
    match err {
        BillingError::InvoiceNotFound(_)
        | BillingError::AppointmentNotFound(_)
        | BillingError::ServiceNotFound(_)
        | BillingError::LineNotFound(_)
        | BillingError::NoInvoiceForAppointment(_) => AppError::NotFound(err.to_string()),
        BillingError::DuplicateInvoice(_) => AppError::Conflict(err.to_string()),
        BillingError::InvalidQuantity(_)
        | BillingError::InvalidDiscount(_)
        | BillingError::FinalAmountReadOnly => AppError::BadRequest(err.to_string()),
    }
}
