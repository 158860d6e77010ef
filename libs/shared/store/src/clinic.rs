// libs/shared/store/src/clinic.rs
use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::billing::{Invoice, InvoiceLine};
use shared_models::clinic::{CatalogService, Doctor, Patient};

#[derive(Error, Debug)]
pub enum StoreError {
    /// Uniqueness backstop on `(doctor_id, start_time)` among scheduled rows.
    /// Carries the row that already holds the slot.
    #[error("time slot already taken: doctor {} at {}", existing.doctor_id, existing.start_time)]
    SlotTaken { existing: Appointment },

    #[error("record not found")]
    NotFound,
}

#[derive(Default)]
struct State {
    patients: HashMap<Uuid, Patient>,
    doctors: HashMap<Uuid, Doctor>,
    services: HashMap<Uuid, CatalogService>,
    appointments: HashMap<Uuid, Appointment>,
    invoices: HashMap<Uuid, Invoice>,
    lines: HashMap<Uuid, InvoiceLine>,
}

impl State {
    /// Scheduled row holding exactly this doctor/start slot, if any.
    fn slot_holder(
        &self,
        doctor_id: Uuid,
        start_time: chrono::DateTime<chrono::Utc>,
        exclude: Option<Uuid>,
    ) -> Option<&Appointment> {
        self.appointments.values().find(|appt| {
            appt.doctor_id == doctor_id
                && appt.status == AppointmentStatus::Scheduled
                && appt.start_time == start_time
                && Some(appt.id) != exclude
        })
    }
}

/// In-memory clinic store. Every appointment write happens under a single
/// write guard, so the slot-uniqueness check and the insert are atomic even
/// when two bookings for the same doctor race.
pub struct ClinicStore {
    inner: RwLock<State>,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(State::default()),
        }
    }

    // ==========================================================================
    // DIRECTORY (patients, doctors, service catalog)
    // ==========================================================================

    pub async fn upsert_patient(&self, patient: Patient) {
        self.inner.write().await.patients.insert(patient.id, patient);
    }

    pub async fn patient(&self, id: Uuid) -> Option<Patient> {
        self.inner.read().await.patients.get(&id).cloned()
    }

    pub async fn upsert_doctor(&self, doctor: Doctor) {
        self.inner.write().await.doctors.insert(doctor.id, doctor);
    }

    pub async fn doctor(&self, id: Uuid) -> Option<Doctor> {
        self.inner.read().await.doctors.get(&id).cloned()
    }

    pub async fn upsert_service(&self, service: CatalogService) {
        self.inner.write().await.services.insert(service.id, service);
    }

    pub async fn service(&self, id: Uuid) -> Option<CatalogService> {
        self.inner.read().await.services.get(&id).cloned()
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if appointment.status == AppointmentStatus::Scheduled {
            if let Some(existing) =
                state.slot_holder(appointment.doctor_id, appointment.start_time, None)
            {
                return Err(StoreError::SlotTaken {
                    existing: existing.clone(),
                });
            }
        }
        debug!("Inserting appointment {}", appointment.id);
        state.appointments.insert(appointment.id, appointment);
        Ok(())
    }

    pub async fn update_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if !state.appointments.contains_key(&appointment.id) {
            return Err(StoreError::NotFound);
        }
        if appointment.status == AppointmentStatus::Scheduled {
            if let Some(existing) = state.slot_holder(
                appointment.doctor_id,
                appointment.start_time,
                Some(appointment.id),
            ) {
                return Err(StoreError::SlotTaken {
                    existing: existing.clone(),
                });
            }
        }
        state.appointments.insert(appointment.id, appointment);
        Ok(())
    }

    pub async fn appointment(&self, id: Uuid) -> Option<Appointment> {
        self.inner.read().await.appointments.get(&id).cloned()
    }

    /// All `scheduled` appointments for a doctor, ordered by start time
    /// ascending. The ordering makes conflict reporting deterministic.
    pub async fn scheduled_for_doctor(&self, doctor_id: Uuid) -> Vec<Appointment> {
        let state = self.inner.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appt| {
                appt.doctor_id == doctor_id && appt.status == AppointmentStatus::Scheduled
            })
            .cloned()
            .collect();
        appointments.sort_by_key(|appt| appt.start_time);
        appointments
    }

    /// A doctor's appointments for one calendar day, any status, ordered by
    /// start time ascending.
    pub async fn doctor_schedule(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment> {
        let state = self.inner.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appt| appt.doctor_id == doctor_id && appt.start_time.date_naive() == date)
            .cloned()
            .collect();
        appointments.sort_by_key(|appt| appt.start_time);
        appointments
    }

    /// Removes an appointment together with its billing context (invoice and
    /// lines), mirroring the cascade ownership of the billing records.
    pub async fn remove_appointment(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        state.appointments.remove(&id).ok_or(StoreError::NotFound)?;
        if let Some(invoice_id) = state
            .invoices
            .values()
            .find(|inv| inv.appointment_id == id)
            .map(|inv| inv.id)
        {
            state.invoices.remove(&invoice_id);
            state.lines.retain(|_, line| line.invoice_id != invoice_id);
        }
        Ok(())
    }

    // ==========================================================================
    // INVOICES
    // ==========================================================================

    pub async fn insert_invoice(&self, invoice: Invoice) {
        self.inner.write().await.invoices.insert(invoice.id, invoice);
    }

    pub async fn update_invoice(&self, invoice: Invoice) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if !state.invoices.contains_key(&invoice.id) {
            return Err(StoreError::NotFound);
        }
        state.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    pub async fn invoice(&self, id: Uuid) -> Option<Invoice> {
        self.inner.read().await.invoices.get(&id).cloned()
    }

    pub async fn invoice_for_appointment(&self, appointment_id: Uuid) -> Option<Invoice> {
        self.inner
            .read()
            .await
            .invoices
            .values()
            .find(|inv| inv.appointment_id == appointment_id)
            .cloned()
    }

    pub async fn insert_line(&self, line: InvoiceLine) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if !state.invoices.contains_key(&line.invoice_id) {
            return Err(StoreError::NotFound);
        }
        state.lines.insert(line.id, line);
        Ok(())
    }

    pub async fn line(&self, id: Uuid) -> Option<InvoiceLine> {
        self.inner.read().await.lines.get(&id).cloned()
    }

    pub async fn update_line(&self, line: InvoiceLine) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if !state.lines.contains_key(&line.id) {
            return Err(StoreError::NotFound);
        }
        state.lines.insert(line.id, line);
        Ok(())
    }

    pub async fn remove_line(&self, id: Uuid) -> Result<InvoiceLine, StoreError> {
        self.inner
            .write()
            .await
            .lines
            .remove(&id)
            .ok_or(StoreError::NotFound)
    }

    /// Lines of an invoice in insertion-independent stable order (by id), so
    /// recomputation is reproducible.
    pub async fn lines_for_invoice(&self, invoice_id: Uuid) -> Vec<InvoiceLine> {
        let state = self.inner.read().await;
        let mut lines: Vec<InvoiceLine> = state
            .lines
            .values()
            .filter(|line| line.invoice_id == invoice_id)
            .cloned()
            .collect();
        lines.sort_by_key(|line| line.id);
        lines
    }
}

impl Default for ClinicStore {
    fn default() -> Self {
        Self::new()
    }
}
