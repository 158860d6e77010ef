// libs/scheduling-cell/src/services/booking.rs
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_store::{ClinicStore, StoreError};

use crate::models::{
    ConflictSummary, CreateAppointmentRequest, RescheduleRequest, SchedulingError,
    UpdateStatusRequest, ValidationIssue, ValidationReport,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::timegrid;

/// The only mutation entry points the external CRUD layer uses. Every write
/// path runs the same pipeline: validate, check conflicts, apply lifecycle
/// defaults, persist — so no caller can bypass a rule.
pub struct AppointmentBookingService {
    store: Arc<ClinicStore>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        let conflict_service = ConflictDetectionService::new(Arc::clone(&store));
        let lifecycle_service = AppointmentLifecycleService::new();
        Self {
            store,
            conflict_service,
            lifecycle_service,
        }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        self.create_appointment_at(request, Utc::now()).await
    }

    /// Booking with an explicit "now", so the past-time rule is testable.
    pub async fn create_appointment_at(
        &self,
        request: CreateAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        if self.store.patient(request.patient_id).await.is_none() {
            return Err(SchedulingError::PatientNotFound(request.patient_id));
        }

        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
            status: request.status.unwrap_or(AppointmentStatus::Scheduled),
            cancel_reason_type: request.cancel_reason_type,
            cancel_reason_text: request.cancel_reason_text,
            reason: request.reason,
            diagnosis: None,
            treatment: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        self.run_pipeline(&mut appointment, None, None, now).await?;

        match self.store.insert_appointment(appointment.clone()).await {
            Ok(()) => {
                info!("Appointment {} booked successfully", appointment.id);
                Ok(appointment)
            }
            Err(err) => Err(translate_store_error(err, appointment.id)),
        }
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
    ) -> Result<Appointment, SchedulingError> {
        self.update_appointment_status_at(appointment_id, request, Utc::now())
            .await
    }

    pub async fn update_appointment_status_at(
        &self,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        debug!(
            "Updating appointment {} status to {}",
            appointment_id, request.status
        );

        let mut appointment = self
            .store
            .appointment(appointment_id)
            .await
            .ok_or(SchedulingError::AppointmentNotFound(appointment_id))?;

        let transition = (appointment.status, request.status);
        appointment.status = request.status;
        if request.cancel_reason_type.is_some() {
            appointment.cancel_reason_type = request.cancel_reason_type;
        }
        if let Some(text) = request.cancel_reason_text {
            appointment.cancel_reason_text = Some(text);
        }
        appointment.updated_at = now;

        self.run_pipeline(&mut appointment, Some(appointment_id), Some(transition), now)
            .await?;

        match self.store.update_appointment(appointment.clone()).await {
            Ok(()) => Ok(appointment),
            Err(err) => Err(translate_store_error(err, appointment_id)),
        }
    }

    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleRequest,
    ) -> Result<Appointment, SchedulingError> {
        self.reschedule_appointment_at(appointment_id, request, Utc::now())
            .await
    }

    pub async fn reschedule_appointment_at(
        &self,
        appointment_id: Uuid,
        request: RescheduleRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        debug!(
            "Rescheduling appointment {} to {}",
            appointment_id, request.new_start_time
        );

        let mut appointment = self
            .store
            .appointment(appointment_id)
            .await
            .ok_or(SchedulingError::AppointmentNotFound(appointment_id))?;

        appointment.start_time = request.new_start_time;
        appointment.duration_minutes = request.new_duration_minutes;
        appointment.updated_at = now;

        self.run_pipeline(&mut appointment, Some(appointment_id), None, now)
            .await?;

        match self.store.update_appointment(appointment.clone()).await {
            Ok(()) => Ok(appointment),
            Err(err) => Err(translate_store_error(err, appointment_id)),
        }
    }

    /// A doctor's appointments for one day, ascending by start time.
    pub async fn get_doctor_schedule(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if self.store.doctor(doctor_id).await.is_none() {
            return Err(SchedulingError::DoctorNotFound(doctor_id));
        }
        Ok(self.store.doctor_schedule(doctor_id, date).await)
    }

    /// The shared validation pipeline. Collects every violated rule into one
    /// report instead of failing on the first, then applies cancellation
    /// defaults once the save is known to be valid.
    async fn run_pipeline(
        &self,
        appointment: &mut Appointment,
        exclude_appointment_id: Option<Uuid>,
        transition: Option<(AppointmentStatus, AppointmentStatus)>,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        let mut report = ValidationReport::default();

        if let Some((from, to)) = transition {
            if let Err(issue) = self.lifecycle_service.validate_transition(from, to) {
                report.push(issue);
            }
        }

        let mut time_fields_valid = true;
        if let Err(issue) = timegrid::normalize(appointment.start_time) {
            report.push(issue);
            time_fields_valid = false;
        }
        if let Err(issue) = timegrid::validate_duration(appointment.duration_minutes) {
            report.push(issue);
            time_fields_valid = false;
        }

        match self.store.doctor(appointment.doctor_id).await {
            None => return Err(SchedulingError::DoctorNotFound(appointment.doctor_id)),
            Some(doctor) if !doctor.is_active => report.push(ValidationIssue::DoctorInactive),
            Some(_) => {}
        }

        // Past-time and conflict rules apply only when the row will occupy a
        // slot, i.e. its target status is `scheduled`. Historical imports in
        // other statuses pass through.
        if appointment.status == AppointmentStatus::Scheduled {
            if appointment.start_time < now {
                report.push(ValidationIssue::PastBooking);
            }
            if time_fields_valid {
                if let Some(existing) = self
                    .conflict_service
                    .find_conflict(
                        appointment.doctor_id,
                        appointment.start_time,
                        appointment.end_time(),
                        exclude_appointment_id,
                    )
                    .await
                {
                    report.push(ValidationIssue::TimeSlotTaken {
                        conflict: ConflictSummary::from(&existing),
                    });
                }
            }
        }

        if appointment.status == AppointmentStatus::Cancelled
            && appointment.cancel_reason_type.is_none()
            && appointment
                .cancel_reason_text
                .as_deref()
                .map_or(true, |text| text.trim().is_empty())
        {
            report.push(ValidationIssue::MissingCancelReason);
        }

        report.into_result()?;

        self.lifecycle_service.apply_cancellation_defaults(appointment);
        Ok(())
    }
}

/// Storage constraint violations that slip past the application-level check
/// (the check-then-act race backstop) surface as the same `TimeSlotTaken`
/// validation error rather than leaking a raw storage error.
fn translate_store_error(err: StoreError, appointment_id: Uuid) -> SchedulingError {
    match err {
        StoreError::SlotTaken { existing } => {
            warn!(
                "Slot uniqueness backstop rejected appointment {}: slot held by {}",
                appointment_id, existing.id
            );
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::TimeSlotTaken {
                conflict: ConflictSummary::from(&existing),
            });
            SchedulingError::Rejected(report)
        }
        StoreError::NotFound => SchedulingError::AppointmentNotFound(appointment_id),
    }
}
