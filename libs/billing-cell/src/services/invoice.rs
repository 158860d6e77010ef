// libs/billing-cell/src/services/invoice.rs
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::billing::{Invoice, InvoiceLine};
use shared_store::ClinicStore;

use crate::models::{
    AddLineRequest, BillingError, CreateInvoiceRequest, UpdateInvoiceRequest, UpdateLineRequest,
};

/// Recomputes the derived invoice amounts from its lines.
///
/// `total_amount` is the exact decimal sum of `price_at_time × quantity`;
/// `final_amount` applies the percent discount and rounds to 2 decimal
/// places half-up (0.5 rounds away from zero), matching conventional
/// invoicing expectations. Idempotent for unchanged lines.
pub fn recompute(invoice: &mut Invoice, lines: &[InvoiceLine]) {
    let total: Decimal = lines
        .iter()
        .map(|line| line.price_at_time * Decimal::from(line.quantity))
        .sum();

    let discount_factor =
        (Decimal::from(100) - Decimal::from(invoice.discount_percent)) / Decimal::from(100);

    invoice.total_amount = total;
    invoice.final_amount =
        (total * discount_factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
}

/// Invoice mutation entry points. Every change to lines or discount runs
/// `recompute`; `final_amount` is never writable from outside.
pub struct InvoiceService {
    store: Arc<ClinicStore>,
}

impl InvoiceService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Creates the (single) invoice of an appointment. The discount defaults
    /// to the patient's account discount at creation time.
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, BillingError> {
        let appointment = self
            .store
            .appointment(request.appointment_id)
            .await
            .ok_or(BillingError::AppointmentNotFound(request.appointment_id))?;

        if self
            .store
            .invoice_for_appointment(request.appointment_id)
            .await
            .is_some()
        {
            return Err(BillingError::DuplicateInvoice(request.appointment_id));
        }

        let inherited_discount = self
            .store
            .patient(appointment.patient_id)
            .await
            .map(|patient| patient.discount_percent)
            .unwrap_or(0);
        let discount_percent = match request.discount_percent {
            Some(percent) => validate_discount(percent)?,
            None => inherited_discount,
        };

        let mut invoice = Invoice {
            id: Uuid::new_v4(),
            appointment_id: request.appointment_id,
            total_amount: Decimal::ZERO,
            discount_percent,
            final_amount: Decimal::ZERO,
            is_paid: false,
            paid_at: None,
            created_by: request.created_by,
            created_at: Utc::now(),
        };
        recompute(&mut invoice, &[]);

        info!(
            "Created invoice {} for appointment {} (discount {}%)",
            invoice.id, request.appointment_id, discount_percent
        );
        self.store.insert_invoice(invoice.clone()).await;
        Ok(invoice)
    }

    /// Adds a billed service line. The price snapshot defaults to the
    /// service's current catalog price when not explicitly supplied.
    pub async fn add_line(
        &self,
        invoice_id: Uuid,
        request: AddLineRequest,
    ) -> Result<Invoice, BillingError> {
        self.store
            .invoice(invoice_id)
            .await
            .ok_or(BillingError::InvoiceNotFound(invoice_id))?;

        if request.quantity < 1 {
            return Err(BillingError::InvalidQuantity(request.quantity));
        }

        let price_at_time = match request.price_at_time {
            Some(price) if !price.is_zero() => price,
            _ => {
                self.store
                    .service(request.service_id)
                    .await
                    .ok_or(BillingError::ServiceNotFound(request.service_id))?
                    .price
            }
        };

        let line = InvoiceLine {
            id: Uuid::new_v4(),
            invoice_id,
            service_id: request.service_id,
            quantity: request.quantity,
            price_at_time,
        };
        debug!(
            "Adding line {} to invoice {}: service {} x{} at {}",
            line.id, invoice_id, request.service_id, request.quantity, price_at_time
        );
        self.store
            .insert_line(line)
            .await
            .map_err(|_| BillingError::InvoiceNotFound(invoice_id))?;

        self.recompute_and_save(invoice_id).await
    }

    pub async fn update_line_quantity(
        &self,
        line_id: Uuid,
        request: UpdateLineRequest,
    ) -> Result<Invoice, BillingError> {
        if request.quantity < 1 {
            return Err(BillingError::InvalidQuantity(request.quantity));
        }

        let mut line = self
            .store
            .line(line_id)
            .await
            .ok_or(BillingError::LineNotFound(line_id))?;
        line.quantity = request.quantity;
        let invoice_id = line.invoice_id;
        self.store
            .update_line(line)
            .await
            .map_err(|_| BillingError::LineNotFound(line_id))?;

        self.recompute_and_save(invoice_id).await
    }

    pub async fn remove_line(&self, line_id: Uuid) -> Result<Invoice, BillingError> {
        let line = self
            .store
            .remove_line(line_id)
            .await
            .map_err(|_| BillingError::LineNotFound(line_id))?;

        self.recompute_and_save(line.invoice_id).await
    }

    /// Applies caller-settable invoice fields. A direct `final_amount` write
    /// is rejected outright, never silently ignored.
    pub async fn update_invoice(
        &self,
        invoice_id: Uuid,
        request: UpdateInvoiceRequest,
    ) -> Result<Invoice, BillingError> {
        if request.final_amount.is_some() {
            return Err(BillingError::FinalAmountReadOnly);
        }

        let mut invoice = self
            .store
            .invoice(invoice_id)
            .await
            .ok_or(BillingError::InvoiceNotFound(invoice_id))?;

        if let Some(percent) = request.discount_percent {
            invoice.discount_percent = validate_discount(percent)?;
        }
        if let Some(is_paid) = request.is_paid {
            invoice.is_paid = is_paid;
            invoice.paid_at = if is_paid { Some(Utc::now()) } else { None };
        }

        let lines = self.store.lines_for_invoice(invoice_id).await;
        recompute(&mut invoice, &lines);
        self.store
            .update_invoice(invoice.clone())
            .await
            .map_err(|_| BillingError::InvoiceNotFound(invoice_id))?;
        Ok(invoice)
    }

    pub async fn set_discount(
        &self,
        invoice_id: Uuid,
        percent: i32,
    ) -> Result<Invoice, BillingError> {
        self.update_invoice(
            invoice_id,
            UpdateInvoiceRequest {
                discount_percent: Some(percent),
                is_paid: None,
                final_amount: None,
            },
        )
        .await
    }

    pub async fn mark_paid(&self, invoice_id: Uuid) -> Result<Invoice, BillingError> {
        self.update_invoice(
            invoice_id,
            UpdateInvoiceRequest {
                discount_percent: None,
                is_paid: Some(true),
                final_amount: None,
            },
        )
        .await
    }

    /// Re-derives an appointment's invoice amounts from its current lines.
    pub async fn recalculate(&self, appointment_id: Uuid) -> Result<Invoice, BillingError> {
        let invoice = self
            .store
            .invoice_for_appointment(appointment_id)
            .await
            .ok_or(BillingError::NoInvoiceForAppointment(appointment_id))?;

        self.recompute_and_save(invoice.id).await
    }

    async fn recompute_and_save(&self, invoice_id: Uuid) -> Result<Invoice, BillingError> {
        let mut invoice = self
            .store
            .invoice(invoice_id)
            .await
            .ok_or(BillingError::InvoiceNotFound(invoice_id))?;
        let lines = self.store.lines_for_invoice(invoice_id).await;

        recompute(&mut invoice, &lines);
        debug!(
            "Invoice {} recomputed: total {} final {} ({}% discount, {} lines)",
            invoice.id,
            invoice.total_amount,
            invoice.final_amount,
            invoice.discount_percent,
            lines.len()
        );

        self.store
            .update_invoice(invoice.clone())
            .await
            .map_err(|_| BillingError::InvoiceNotFound(invoice_id))?;
        Ok(invoice)
    }
}

fn validate_discount(percent: i32) -> Result<i32, BillingError> {
    if !(0..=100).contains(&percent) {
        return Err(BillingError::InvalidDiscount(percent));
    }
    Ok(percent)
}
